use indexmap::IndexMap;
use log::debug;

use crate::parse::schema::SchemaNode;

/// Single-owner view over the definitions table for the duration of a
/// flatten run.
///
/// Doubles as the name-availability oracle and the structural-dedup index:
/// `resolve_name` picks the name a lifted definition would get,
/// `insert_generated` reserves it at the moment of insertion, and
/// `find_equivalent` matches a candidate shape against definitions generated
/// earlier in the same run.
pub(super) struct DefinitionIndex<'a> {
    definitions: &'a mut IndexMap<String, SchemaNode>,
    generated: Vec<String>,
}

impl<'a> DefinitionIndex<'a> {
    pub(super) fn new(definitions: &'a mut IndexMap<String, SchemaNode>) -> Self {
        DefinitionIndex {
            definitions,
            generated: Vec::new(),
        }
    }

    pub(super) fn definitions_mut(&mut self) -> &mut IndexMap<String, SchemaNode> {
        self.definitions
    }

    /// The name a lifted definition would get: the title if present, else
    /// the hint, stripped of characters outside `[A-Za-z0-9_. ]` and probed
    /// for the smallest free numeric suffix.
    pub(super) fn resolve_name(&self, title: Option<&str>, hint: &str) -> String {
        self.probe(&sanitize(title.unwrap_or(hint)))
    }

    /// Insert a generated definition under the first free probe of
    /// `candidate`, reserving the name at the moment of insertion.
    pub(super) fn insert_generated(&mut self, candidate: &str, definition: SchemaNode) -> String {
        let name = self.probe(candidate);
        debug!("generated definition `{name}`");
        self.definitions.insert(name.clone(), definition);
        self.generated.push(name.clone());
        name
    }

    /// Structural-equality lookup against definitions generated this run.
    pub(super) fn find_equivalent(&self, definition: &SchemaNode) -> Option<&str> {
        self.generated
            .iter()
            .find(|name| self.definitions.get(name.as_str()) == Some(definition))
            .map(String::as_str)
    }

    fn probe(&self, candidate: &str) -> String {
        if !self.definitions.contains_key(candidate) {
            return candidate.to_string();
        }
        let mut count = 1usize;
        loop {
            let name = format!("{candidate}_{count}");
            if !self.definitions.contains_key(&name) {
                return name;
            }
            count += 1;
        }
    }
}

fn sanitize(candidate: &str) -> String {
    candidate
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ' '))
        .collect()
}
