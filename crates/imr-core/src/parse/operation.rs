use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::parameter::Parameter;
use super::response::Response;

/// The standard HTTP verbs a path item can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

impl HttpMethod {
    /// Case-insensitive lookup, used when validating override selectors.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "put" => Some(HttpMethod::Put),
            "post" => Some(HttpMethod::Post),
            "delete" => Some(HttpMethod::Delete),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            "patch" => Some(HttpMethod::Patch),
            _ => None,
        }
    }
}

/// An API operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Response>,
}

/// A path item, containing operations keyed by HTTP method.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    /// The operations present on this path, in method order.
    pub fn operations_mut(&mut self) -> Vec<(HttpMethod, &mut Operation)> {
        let mut operations = Vec::new();
        macro_rules! push_op {
            ($field:ident, $method:expr) => {
                if let Some(ref mut op) = self.$field {
                    operations.push(($method, op));
                }
            };
        }
        push_op!(get, HttpMethod::Get);
        push_op!(put, HttpMethod::Put);
        push_op!(post, HttpMethod::Post);
        push_op!(delete, HttpMethod::Delete);
        push_op!(options, HttpMethod::Options);
        push_op!(head, HttpMethod::Head);
        push_op!(patch, HttpMethod::Patch);
        operations
    }

    pub fn operation_mut(&mut self, method: HttpMethod) -> Option<&mut Operation> {
        match method {
            HttpMethod::Get => self.get.as_mut(),
            HttpMethod::Put => self.put.as_mut(),
            HttpMethod::Post => self.post.as_mut(),
            HttpMethod::Delete => self.delete.as_mut(),
            HttpMethod::Options => self.options.as_mut(),
            HttpMethod::Head => self.head.as_mut(),
            HttpMethod::Patch => self.patch.as_mut(),
        }
    }
}
