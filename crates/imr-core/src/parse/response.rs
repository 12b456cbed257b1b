use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::schema::SchemaNode;

/// A response definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, serde_json::Value>,
}

impl Response {
    pub fn with_schema(schema: SchemaNode) -> Self {
        Response {
            schema: Some(schema),
            ..Response::default()
        }
    }
}
