//! Operator-supplied title overrides.
//!
//! A YAML file maps a desired title to a selector locating one schema node
//! in the document: a path, an HTTP method, a body-parameter name or a
//! response status, and optionally a list of property-name keywords to
//! descend through nested object/array/map properties. Titles are applied
//! before normalization, so the named node gets the operator's title as its
//! definition name instead of a synthesized one.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::warn;
use serde::Deserialize;

use crate::error::OverrideError;
use crate::parse::operation::{HttpMethod, Operation};
use crate::parse::parameter::ParameterLocation;
use crate::parse::schema::SchemaNode;
use crate::parse::spec::SwaggerSpec;

/// One selector: where in the document a title should land.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TitleSelector {
    pub path: Option<String>,

    #[serde(rename = "httpMethod")]
    pub http_method: Option<String>,

    #[serde(rename = "parameterName")]
    pub parameter_name: Option<String>,

    pub status: Option<String>,

    pub keywords: Vec<String>,
}

impl TitleSelector {
    /// A usable selector names a path, a recognized HTTP method, and at
    /// least one of `parameterName` / `status`.
    fn validate(&self) -> Option<(&str, HttpMethod)> {
        let path = self.path.as_deref()?;
        let method = HttpMethod::parse(self.http_method.as_deref()?)?;
        if self.parameter_name.is_none() && self.status.is_none() {
            return None;
        }
        Some((path, method))
    }
}

/// Title overrides keyed by the desired title.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct TitleOverrides {
    pub entries: IndexMap<String, TitleSelector>,
}

/// Load a title override table from a YAML file.
///
/// A missing or unparsable file is fatal; individual invalid selectors are
/// skipped at apply time instead.
pub fn load_overrides(path: &Path) -> Result<TitleOverrides, OverrideError> {
    if !path.exists() {
        return Err(OverrideError::NotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path).map_err(|source| OverrideError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let overrides = serde_yaml_ng::from_str(&content).map_err(|source| OverrideError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    Ok(overrides)
}

impl TitleOverrides {
    /// Retitle the node each valid entry selects. Entries with incomplete
    /// selectors, or selectors that match nothing, have no effect.
    pub fn apply(&self, spec: &mut SwaggerSpec) {
        for (title, selector) in &self.entries {
            let Some((path, method)) = selector.validate() else {
                warn!("skipping title override `{title}`: incomplete selector");
                continue;
            };
            let Some(operation) = spec
                .paths
                .get_mut(path)
                .and_then(|item| item.operation_mut(method))
            else {
                continue;
            };
            if let Some(node) = select_node(operation, selector) {
                node.set_title(title);
            }
        }
    }
}

fn select_node<'a>(
    operation: &'a mut Operation,
    selector: &TitleSelector,
) -> Option<&'a mut SchemaNode> {
    if let Some(parameter_name) = selector.parameter_name.as_deref() {
        let parameter = operation.parameters.iter_mut().find(|p| {
            p.location == ParameterLocation::Body && p.name == parameter_name && p.schema.is_some()
        })?;
        let schema = parameter.schema.as_mut()?;
        return match schema {
            SchemaNode::Array(array) => {
                let items = array.items.as_deref_mut()?;
                if matches!(items, SchemaNode::Object(_)) {
                    descend(items, &selector.keywords)
                } else {
                    None
                }
            }
            SchemaNode::Object(_) => descend(schema, &selector.keywords),
            _ => None,
        };
    }
    if let Some(status) = selector.status.as_deref() {
        let response = operation.responses.get_mut(status)?;
        return descend(response.schema.as_mut()?, &selector.keywords);
    }
    None
}

/// Walk property-name keywords down through object properties, array items
/// and map values. With no keywords left, an object is the target itself;
/// arrays and maps hand the keywords to their element schema.
fn descend<'a>(node: &'a mut SchemaNode, keywords: &[String]) -> Option<&'a mut SchemaNode> {
    match node {
        SchemaNode::Object(_) if keywords.is_empty() => Some(node),
        SchemaNode::Object(object) => {
            let (first, rest) = keywords.split_first()?;
            descend(object.properties.as_mut()?.get_mut(first)?, rest)
        }
        SchemaNode::Array(array) => descend_inner(array.items.as_deref_mut()?, keywords),
        SchemaNode::Map(map) => descend_inner(map.values.as_mut(), keywords),
        _ => None,
    }
}

fn descend_inner<'a>(inner: &'a mut SchemaNode, keywords: &[String]) -> Option<&'a mut SchemaNode> {
    if keywords.is_empty() {
        return Some(inner);
    }
    match inner {
        SchemaNode::Object(object) => {
            let (first, rest) = keywords.split_first()?;
            descend(object.properties.as_mut()?.get_mut(first)?, rest)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::parse::operation::PathItem;
    use crate::parse::parameter::Parameter;
    use crate::parse::schema::{ObjectNode, ScalarNode};

    fn selector_yaml() -> &'static str {
        "CustomerAddress:\n  path: /hello\n  httpMethod: get\n  parameterName: body\n  keywords:\n    - address\n"
    }

    fn hello_spec() -> SwaggerSpec {
        let address = ObjectNode {
            properties: Some(
                [(
                    "street".to_string(),
                    SchemaNode::Scalar(ScalarNode::string()),
                )]
                .into_iter()
                .collect(),
            ),
            ..ObjectNode::default()
        };
        let body = ObjectNode {
            properties: Some(
                [("address".to_string(), SchemaNode::Object(address))]
                    .into_iter()
                    .collect(),
            ),
            ..ObjectNode::default()
        };
        let mut spec = SwaggerSpec::default();
        spec.paths.insert(
            "/hello".to_string(),
            PathItem {
                get: Some(Operation {
                    parameters: vec![Parameter::body("body", SchemaNode::Object(body))],
                    ..Operation::default()
                }),
                ..PathItem::default()
            },
        );
        spec
    }

    fn body_object(spec: &SwaggerSpec) -> &ObjectNode {
        match spec.paths["/hello"].get.as_ref().unwrap().parameters[0]
            .schema
            .as_ref()
            .unwrap()
        {
            SchemaNode::Object(object) => object,
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn load_fails_on_missing_file() {
        let err = load_overrides(Path::new("/nonexistent/titles.yaml")).unwrap_err();
        assert!(matches!(err, OverrideError::NotFound(_)));
    }

    #[test]
    fn load_fails_on_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"- just\n- a\n- list\n").unwrap();
        let err = load_overrides(file.path()).unwrap_err();
        assert!(matches!(err, OverrideError::Parse { .. }));
    }

    #[test]
    fn load_reads_selectors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(selector_yaml().as_bytes()).unwrap();
        let overrides = load_overrides(file.path()).unwrap();
        let selector = &overrides.entries["CustomerAddress"];
        assert_eq!(selector.path.as_deref(), Some("/hello"));
        assert_eq!(selector.http_method.as_deref(), Some("get"));
        assert_eq!(selector.keywords, vec!["address".to_string()]);
    }

    #[test]
    fn applies_title_through_keywords() {
        let overrides: TitleOverrides = serde_yaml_ng::from_str(selector_yaml()).unwrap();
        let mut spec = hello_spec();
        overrides.apply(&mut spec);

        let body = body_object(&spec);
        match body.properties.as_ref().unwrap().get("address") {
            Some(SchemaNode::Object(address)) => {
                assert_eq!(address.title.as_deref(), Some("CustomerAddress"));
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn applies_title_to_body_itself_without_keywords() {
        let overrides: TitleOverrides = serde_yaml_ng::from_str(
            "HelloBody:\n  path: /hello\n  httpMethod: GET\n  parameterName: body\n",
        )
        .unwrap();
        let mut spec = hello_spec();
        overrides.apply(&mut spec);

        assert_eq!(body_object(&spec).title.as_deref(), Some("HelloBody"));
    }

    #[test]
    fn skips_selector_without_parameter_or_status() {
        let overrides: TitleOverrides =
            serde_yaml_ng::from_str("Orphan:\n  path: /hello\n  httpMethod: get\n").unwrap();
        let mut spec = hello_spec();
        let before = spec.clone();
        overrides.apply(&mut spec);
        assert_eq!(spec, before);
    }

    #[test]
    fn skips_selector_with_unknown_method() {
        let overrides: TitleOverrides = serde_yaml_ng::from_str(
            "Bad:\n  path: /hello\n  httpMethod: fetch\n  parameterName: body\n",
        )
        .unwrap();
        let mut spec = hello_spec();
        let before = spec.clone();
        overrides.apply(&mut spec);
        assert_eq!(spec, before);
    }

    #[test]
    fn applies_title_to_response_schema() {
        use crate::parse::response::Response;

        let shape = ObjectNode {
            properties: Some(IndexMap::new()),
            ..ObjectNode::default()
        };
        let mut spec = SwaggerSpec::default();
        spec.paths.insert(
            "/status".to_string(),
            PathItem {
                get: Some(Operation {
                    responses: [(
                        "200".to_string(),
                        Response::with_schema(SchemaNode::Object(shape)),
                    )]
                    .into_iter()
                    .collect(),
                    ..Operation::default()
                }),
                ..PathItem::default()
            },
        );

        let overrides: TitleOverrides = serde_yaml_ng::from_str(
            "StatusReply:\n  path: /status\n  httpMethod: get\n  status: \"200\"\n",
        )
        .unwrap();
        overrides.apply(&mut spec);

        let response = &spec.paths["/status"].get.as_ref().unwrap().responses["200"];
        match response.schema.as_ref().unwrap() {
            SchemaNode::Object(object) => {
                assert_eq!(object.title.as_deref(), Some("StatusReply"));
            }
            other => panic!("expected object, got {other:?}"),
        }
    }
}
