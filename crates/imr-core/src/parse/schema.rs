use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Vendor key marking a reference generated from an inline response schema.
pub const FROM_RESPONSE_KEY: &str = "x-from-response";

/// XML metadata attached to a schema node (Swagger `xml` object).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XmlObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapped: Option<bool>,
}

/// One node of a schema tree.
///
/// A closed variant set, matched exhaustively at every traversal site so a
/// new variant is a compile-time decision everywhere it matters. The wire
/// form is the usual Swagger 2.0 schema object; classification happens in
/// the `RawSchema` conversion below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSchema", into = "RawSchema")]
pub enum SchemaNode {
    Object(ObjectNode),
    Array(ArrayNode),
    Map(MapNode),
    Reference(RefNode),
    Scalar(ScalarNode),
    Composed(ComposedNode),
}

/// An object shape: a property map plus descriptive metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectNode {
    pub title: Option<String>,
    pub description: Option<String>,
    pub example: Option<serde_json::Value>,
    pub xml: Option<XmlObject>,
    /// `None` means the object has not been given a shape yet; `Some` with
    /// an empty map is a deliberately empty shape.
    pub properties: Option<IndexMap<String, SchemaNode>>,
    pub required: bool,
}

/// An array shape with a single items schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayNode {
    pub title: Option<String>,
    pub description: Option<String>,
    pub items: Option<Box<SchemaNode>>,
    pub required: bool,
}

/// A map shape: free-form keys, a single additional-properties schema.
#[derive(Debug, Clone, PartialEq)]
pub struct MapNode {
    pub title: Option<String>,
    pub description: Option<String>,
    pub values: Box<SchemaNode>,
    pub required: bool,
}

/// A named, non-owning link into the definitions table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RefNode {
    /// Simple definition name; serialized as `#/definitions/{target}`.
    pub target: String,
    pub required: bool,
    /// Vendor marker distinguishing response-derived references.
    pub from_response: bool,
}

impl RefNode {
    pub fn new(target: impl Into<String>) -> Self {
        RefNode {
            target: target.into(),
            required: false,
            from_response: false,
        }
    }
}

/// A primitive shape. Opaque to the normalizer; its fields ride along.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScalarNode {
    pub scalar_type: String,
    pub format: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub example: Option<serde_json::Value>,
    pub default_value: Option<serde_json::Value>,
    pub enum_values: Vec<serde_json::Value>,
    pub required: bool,
}

impl ScalarNode {
    pub fn string() -> Self {
        ScalarNode {
            scalar_type: "string".to_string(),
            ..ScalarNode::default()
        }
    }
}

/// An inheriting shape: `allOf` members, one of which may be an inline
/// object carrying the shape's own properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComposedNode {
    pub title: Option<String>,
    pub description: Option<String>,
    pub all_of: Vec<SchemaNode>,
    pub required: bool,
}

impl ComposedNode {
    /// The inline object member carrying the composed shape's own
    /// properties. Interfaces come first in `allOf`, so the last inline
    /// member is the child.
    pub fn child_mut(&mut self) -> Option<&mut ObjectNode> {
        self.all_of.iter_mut().rev().find_map(|node| match node {
            SchemaNode::Object(object) => Some(object),
            _ => None,
        })
    }
}

impl SchemaNode {
    /// Set the title where the variant carries one; references have none.
    pub fn set_title(&mut self, title: &str) {
        match self {
            SchemaNode::Object(object) => object.title = Some(title.to_string()),
            SchemaNode::Array(array) => array.title = Some(title.to_string()),
            SchemaNode::Map(map) => map.title = Some(title.to_string()),
            SchemaNode::Scalar(scalar) => scalar.title = Some(title.to_string()),
            SchemaNode::Composed(composed) => composed.title = Some(title.to_string()),
            SchemaNode::Reference(_) => {}
        }
    }

    pub fn is_required(&self) -> bool {
        match self {
            SchemaNode::Object(object) => object.required,
            SchemaNode::Array(array) => array.required,
            SchemaNode::Map(map) => map.required,
            SchemaNode::Reference(reference) => reference.required,
            SchemaNode::Scalar(scalar) => scalar.required,
            SchemaNode::Composed(composed) => composed.required,
        }
    }
}

/// Wire-format mirror of `SchemaNode`. Deserialization collects the raw
/// fields and classifies them into a variant; serialization is the inverse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RawSchema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    reference: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    schema_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<serde_json::Value>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    default_value: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    xml: Option<XmlObject>,

    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<IndexMap<String, SchemaNode>>,

    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    additional_properties: Option<Box<SchemaNode>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Box<SchemaNode>>,

    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    all_of: Vec<SchemaNode>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    enum_values: Vec<serde_json::Value>,

    #[serde(
        rename = "x-from-response",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    from_response: bool,
}

impl From<RawSchema> for SchemaNode {
    fn from(raw: RawSchema) -> Self {
        if let Some(reference) = raw.reference {
            return SchemaNode::Reference(RefNode {
                target: simple_ref(&reference),
                required: raw.required,
                from_response: raw.from_response,
            });
        }
        if !raw.all_of.is_empty() {
            return SchemaNode::Composed(ComposedNode {
                title: raw.title,
                description: raw.description,
                all_of: raw.all_of,
                required: raw.required,
            });
        }
        match raw.schema_type.as_deref() {
            Some("array") => SchemaNode::Array(ArrayNode {
                title: raw.title,
                description: raw.description,
                items: raw.items,
                required: raw.required,
            }),
            Some("object") | None => {
                if raw.properties.is_none() {
                    if let Some(values) = raw.additional_properties {
                        return SchemaNode::Map(MapNode {
                            title: raw.title,
                            description: raw.description,
                            values,
                            required: raw.required,
                        });
                    }
                }
                SchemaNode::Object(ObjectNode {
                    title: raw.title,
                    description: raw.description,
                    example: raw.example,
                    xml: raw.xml,
                    properties: raw.properties,
                    required: raw.required,
                })
            }
            Some(other) => SchemaNode::Scalar(ScalarNode {
                scalar_type: other.to_string(),
                format: raw.format,
                title: raw.title,
                description: raw.description,
                example: raw.example,
                default_value: raw.default_value,
                enum_values: raw.enum_values,
                required: raw.required,
            }),
        }
    }
}

impl From<SchemaNode> for RawSchema {
    fn from(node: SchemaNode) -> Self {
        match node {
            SchemaNode::Reference(reference) => RawSchema {
                reference: Some(format!("#/definitions/{}", reference.target)),
                required: reference.required,
                from_response: reference.from_response,
                ..RawSchema::default()
            },
            SchemaNode::Composed(composed) => RawSchema {
                title: composed.title,
                description: composed.description,
                all_of: composed.all_of,
                required: composed.required,
                ..RawSchema::default()
            },
            SchemaNode::Array(array) => RawSchema {
                schema_type: Some("array".to_string()),
                title: array.title,
                description: array.description,
                items: array.items,
                required: array.required,
                ..RawSchema::default()
            },
            SchemaNode::Map(map) => RawSchema {
                schema_type: Some("object".to_string()),
                title: map.title,
                description: map.description,
                additional_properties: Some(map.values),
                required: map.required,
                ..RawSchema::default()
            },
            SchemaNode::Object(object) => RawSchema {
                schema_type: object.properties.is_some().then(|| "object".to_string()),
                title: object.title,
                description: object.description,
                example: object.example,
                xml: object.xml,
                properties: object.properties,
                required: object.required,
                ..RawSchema::default()
            },
            SchemaNode::Scalar(scalar) => RawSchema {
                schema_type: Some(scalar.scalar_type),
                format: scalar.format,
                title: scalar.title,
                description: scalar.description,
                example: scalar.example,
                default_value: scalar.default_value,
                enum_values: scalar.enum_values,
                required: scalar.required,
                ..RawSchema::default()
            },
        }
    }
}

/// Extract the simple name from a `$ref` like `#/definitions/Foo`.
fn simple_ref(ref_path: &str) -> String {
    ref_path.rsplit('/').next().unwrap_or(ref_path).to_string()
}
