//! In-place normalization of a Swagger document.
//!
//! After a flatten run no inline object shape remains inside a body
//! parameter, a response, or a named definition: each one lives in the
//! definitions table under a synthesized (or title-supplied) name, and the
//! original site holds a reference. Structurally identical shapes collapse
//! to one definition, and definitions that were bare aliases of other
//! definitions are collapsed to direct content.

mod alias;
mod dedup;
mod normalizer;

pub use normalizer::{FlattenOptions, flatten, flatten_with_options};
