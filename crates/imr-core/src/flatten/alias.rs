use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::FlattenError;
use crate::parse::schema::SchemaNode;

/// Collapse definitions that are nothing but a reference to another
/// definition, so every alias name ends up holding real content directly.
///
/// Chain members (including the terminal real definition) are removed from
/// the table; each alias entry is then replaced with a copy of the terminal
/// content, unless the alias was itself a member of another chain, in which
/// case it is gone for good. An alias whose chain dead-ends on a missing
/// name is removed outright. A name recurring within one chain walk is a
/// cycle and fails the whole pass.
pub(super) fn collapse_aliases(
    definitions: &mut IndexMap<String, SchemaNode>,
) -> Result<(), FlattenError> {
    let mut replacements: IndexMap<String, SchemaNode> = IndexMap::new();
    let mut removable: HashSet<String> = HashSet::new();

    for (name, definition) in definitions.iter() {
        let SchemaNode::Reference(start) = definition else {
            continue;
        };
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(name.as_str());

        let mut target = start.target.as_str();
        loop {
            if !visited.insert(target) {
                return Err(FlattenError::CyclicAlias(target.to_string()));
            }
            removable.insert(target.to_string());
            match definitions.get(target) {
                Some(SchemaNode::Reference(next)) => target = next.target.as_str(),
                Some(real) => {
                    replacements.insert(name.clone(), real.clone());
                    break;
                }
                None => {
                    removable.insert(name.clone());
                    break;
                }
            }
        }
    }

    for name in &removable {
        definitions.shift_remove(name);
    }
    for (name, definition) in replacements {
        if removable.contains(&name) {
            continue;
        }
        definitions.insert(name, definition);
    }
    Ok(())
}
