use serde::{Deserialize, Serialize};

use super::schema::SchemaNode;

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    #[serde(rename = "formData")]
    FormData,
    Body,
}

/// An API parameter. Body parameters carry a schema; the other locations
/// carry an inline primitive type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Parameter {
    /// A body parameter with the given schema; the shape every flatten
    /// rule for request bodies starts from.
    pub fn body(name: impl Into<String>, schema: SchemaNode) -> Self {
        Parameter {
            name: name.into(),
            location: ParameterLocation::Body,
            description: None,
            required: false,
            schema: Some(schema),
            param_type: None,
            format: None,
        }
    }
}
