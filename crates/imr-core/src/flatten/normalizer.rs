use indexmap::IndexMap;

use crate::error::FlattenError;
use crate::overrides::TitleOverrides;
use crate::parse::parameter::{Parameter, ParameterLocation};
use crate::parse::response::Response;
use crate::parse::schema::{ObjectNode, RefNode, SchemaNode};
use crate::parse::spec::SwaggerSpec;

use super::alias::collapse_aliases;
use super::dedup::DefinitionIndex;

/// Options controlling a flatten run.
#[derive(Debug, Clone, Default)]
pub struct FlattenOptions {
    /// Operator-supplied titles applied to selected schema nodes before
    /// the walk starts.
    pub title_overrides: Option<TitleOverrides>,
}

/// Normalize the document in place: every inline object shape nested inside
/// a body parameter, a response, or a named definition is lifted into the
/// definitions table and replaced with a reference, and alias chains in the
/// table are collapsed down to their real content.
pub fn flatten(spec: &mut SwaggerSpec) -> Result<(), FlattenError> {
    flatten_with_options(spec, &FlattenOptions::default())
}

/// Flatten with explicit options.
pub fn flatten_with_options(
    spec: &mut SwaggerSpec,
    options: &FlattenOptions,
) -> Result<(), FlattenError> {
    if let Some(overrides) = &options.title_overrides {
        overrides.apply(spec);
    }

    let SwaggerSpec {
        paths, definitions, ..
    } = spec;
    let mut index = DefinitionIndex::new(definitions);

    // Pass 1: operations, body parameters before responses.
    for (path_name, item) in paths.iter_mut() {
        for (_, operation) in item.operations_mut() {
            for parameter in &mut operation.parameters {
                flatten_body_parameter(&mut index, parameter, path_name);
            }
            for (status, response) in operation.responses.iter_mut() {
                flatten_response(&mut index, response, status, path_name);
            }
        }
    }

    // Pass 2: collapse definitions that are bare aliases.
    collapse_aliases(index.definitions_mut())?;

    // Pass 3: shapes nested inside named definitions.
    flatten_definitions(&mut index);

    Ok(())
}

fn flatten_body_parameter(
    index: &mut DefinitionIndex,
    parameter: &mut Parameter,
    path_name: &str,
) {
    if parameter.location != ParameterLocation::Body {
        return;
    }
    let Some(schema) = parameter.schema.as_mut() else {
        return;
    };
    match schema {
        SchemaNode::Object(object) if object.properties.is_some() => {
            if let Some(properties) = object.properties.as_mut() {
                flatten_properties(index, properties, path_name);
            }
            // The whole body object moves into the definitions table,
            // title included; only the property-site required flag stays
            // behind.
            let mut definition = object.clone();
            definition.required = false;
            let definition = SchemaNode::Object(definition);
            let name = match index.find_equivalent(&definition) {
                Some(existing) => existing.to_string(),
                None => {
                    let candidate = index.resolve_name(object.title.as_deref(), &parameter.name);
                    index.insert_generated(&candidate, definition)
                }
            };
            *schema = SchemaNode::Reference(RefNode::new(name));
        }
        SchemaNode::Array(array) => {
            let mut replacement = None;
            if let Some(SchemaNode::Object(object)) = array.items.as_deref_mut() {
                if object.properties.is_some() {
                    if let Some(properties) = object.properties.as_mut() {
                        flatten_properties(index, properties, path_name);
                    }
                    replacement = Some(lift_object_property(index, object, &parameter.name, false));
                }
            }
            if let Some(reference) = replacement {
                array.items = Some(Box::new(SchemaNode::Reference(reference)));
            }
        }
        _ => {}
    }
}

fn flatten_response(
    index: &mut DefinitionIndex,
    response: &mut Response,
    status: &str,
    path_name: &str,
) {
    let Some(schema) = response.schema.as_mut() else {
        return;
    };
    let hint = format!("inline_response_{status}");
    match schema {
        SchemaNode::Object(object) if object.properties.is_some() => {
            let reference = lift_object_property(index, object, &hint, true);
            *schema = SchemaNode::Reference(reference);
        }
        SchemaNode::Array(array) => {
            let mut replacement = None;
            if let Some(SchemaNode::Object(object)) = array.items.as_deref_mut() {
                if object.properties.is_some() {
                    if let Some(properties) = object.properties.as_mut() {
                        flatten_properties(index, properties, path_name);
                    }
                    replacement = Some(lift_object_property(index, object, &hint, true));
                }
            }
            if let Some(reference) = replacement {
                array.items = Some(Box::new(SchemaNode::Reference(reference)));
            }
        }
        SchemaNode::Map(map) => {
            let mut replacement = None;
            if let SchemaNode::Object(object) = map.values.as_mut() {
                if object.properties.is_some() {
                    if let Some(properties) = object.properties.as_mut() {
                        flatten_properties(index, properties, path_name);
                    }
                    replacement = Some(lift_object_property(index, object, &hint, false));
                }
            }
            if let Some(reference) = replacement {
                *map.values = SchemaNode::Reference(reference);
            }
        }
        _ => {}
    }
}

/// Flatten every entry of the definitions table over a key snapshot, so
/// definitions lifted along the way are not themselves revisited.
fn flatten_definitions(index: &mut DefinitionIndex) {
    let names: Vec<String> = index.definitions_mut().keys().cloned().collect();
    for name in names {
        let Some(mut definition) = index.definitions_mut().get(&name).cloned() else {
            continue;
        };
        match &mut definition {
            SchemaNode::Object(object) => {
                if let Some(properties) = object.properties.as_mut() {
                    flatten_properties(index, properties, &name);
                }
            }
            SchemaNode::Array(array) => {
                let mut replacement = None;
                if let Some(SchemaNode::Object(object)) = array.items.as_deref_mut() {
                    if object.properties.is_some() {
                        replacement = Some(lift_object_property(
                            index,
                            object,
                            &format!("{name}_inner"),
                            false,
                        ));
                    }
                }
                if let Some(reference) = replacement {
                    array.items = Some(Box::new(SchemaNode::Reference(reference)));
                }
            }
            SchemaNode::Composed(composed) => {
                // Only the inline child's nested properties are lifted; the
                // composed container itself stays.
                if let Some(object) = composed.child_mut() {
                    if let Some(properties) = object.properties.as_mut() {
                        flatten_properties(index, properties, &name);
                    }
                }
            }
            _ => {}
        }
        index.definitions_mut().insert(name, definition);
    }
}

/// Flatten one property map. Inline object properties are lifted and
/// replaced by references; object-shaped array items and map values are
/// lifted in place. Direct property replacements are staged during the scan
/// and applied afterwards, so the map is never rewritten mid-iteration.
fn flatten_properties(
    index: &mut DefinitionIndex,
    properties: &mut IndexMap<String, SchemaNode>,
    path: &str,
) {
    let mut staged: Vec<(String, RefNode)> = Vec::new();

    for (key, node) in properties.iter_mut() {
        match node {
            SchemaNode::Object(object) if object.properties.is_some() => {
                let reference =
                    lift_object_property(index, object, &format!("{path}_{key}"), false);
                staged.push((key.clone(), reference));
            }
            SchemaNode::Array(array) => {
                let mut replacement = None;
                if let Some(SchemaNode::Object(object)) = array.items.as_deref_mut() {
                    if object.properties.is_some() {
                        if let Some(nested) = object.properties.as_mut() {
                            flatten_properties(index, nested, path);
                        }
                        replacement = Some(lift_object_property(
                            index,
                            object,
                            &format!("{path}_{key}"),
                            false,
                        ));
                    }
                }
                if let Some(reference) = replacement {
                    array.items = Some(Box::new(SchemaNode::Reference(reference)));
                }
            }
            SchemaNode::Map(map) => {
                let mut replacement = None;
                if let SchemaNode::Object(object) = map.values.as_mut() {
                    if object.properties.is_some() {
                        if let Some(nested) = object.properties.as_mut() {
                            flatten_properties(index, nested, path);
                        }
                        replacement = Some(lift_object_property(
                            index,
                            object,
                            &format!("{path}_{key}"),
                            false,
                        ));
                    }
                }
                if let Some(reference) = replacement {
                    *map.values = SchemaNode::Reference(reference);
                }
            }
            _ => {}
        }
    }

    for (key, reference) in staged {
        properties.insert(key, SchemaNode::Reference(reference));
    }
}

/// Lift an inline object into a named definition, returning the reference
/// that replaces it.
///
/// The stored definition keeps the object's descriptive metadata but not
/// its title (consumed by naming) or its required flag (which belongs to
/// the property site); the returned reference carries that flag instead.
/// Nested properties are flattened under the resolved name before the
/// dedup check, so structurally identical shapes compare equal.
fn lift_object_property(
    index: &mut DefinitionIndex,
    object: &ObjectNode,
    hint: &str,
    from_response: bool,
) -> RefNode {
    let resolved = index.resolve_name(object.title.as_deref(), hint);

    let mut definition = ObjectNode {
        title: None,
        description: object.description.clone(),
        example: object.example.clone(),
        xml: object.xml.clone(),
        properties: object.properties.clone(),
        required: false,
    };
    if let Some(properties) = definition.properties.as_mut() {
        flatten_properties(index, properties, &resolved);
    }

    let definition = SchemaNode::Object(definition);
    let name = match index.find_equivalent(&definition) {
        Some(existing) => existing.to_string(),
        None => index.insert_generated(&resolved, definition),
    };

    RefNode {
        target: name,
        required: object.required,
        from_response,
    }
}
