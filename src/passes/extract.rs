//! Extraction & Deduplication Pass
//!
//! Promotes nested creatable schemas to the top-level registry. A registry
//! entry is added once per name; every in-tree occurrence is demoted to a
//! plain reference.

use std::ops::ControlFlow;
use tracing::debug;

use crate::error::Result;
use crate::ir::spec::{collect_roots, find_in_registry};
use crate::ir::{Order, SchemaArena, SchemaId, Spec};

/// Runs extraction over the registry and every operation schema root
pub fn extract_schemas(spec: &mut Spec) -> Result<()> {
    let Spec {
        arena,
        schemas,
        paths,
    } = spec;

    // Entries appended while iterating are visited too.
    let mut index = 0;
    while index < schemas.len() {
        let root = schemas[index];
        extract_tree(arena, schemas, root, false)?;
        index += 1;
    }

    let mut roots = Vec::new();
    collect_roots(paths, &mut roots);
    for root in roots {
        extract_tree(arena, schemas, root, true)?;
    }
    Ok(())
}

/// Extracts every creatable named node under `root`, bottom-up.
/// `include_root` also extracts `root` itself.
pub fn extract_tree(
    arena: &mut SchemaArena,
    registry: &mut Vec<SchemaId>,
    root: SchemaId,
    include_root: bool,
) -> Result<()> {
    arena.visit(root, Order::BottomUp, |arena, path| {
        if path.is_root() && !include_root {
            return Ok(ControlFlow::Continue(()));
        }
        let id = path.node();
        let node = &arena[id];
        if !node.create || node.name.is_empty() {
            return Ok(ControlFlow::Continue(()));
        }

        if find_in_registry(arena, registry, &node.name).is_none() {
            debug!(name = %node.name, depth = path.len(), "extracting schema");
            let copy = arena.clone_subtree(id);
            registry.push(copy);
        }
        arena[id].create = false;
        Ok(ControlFlow::Continue(()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::raw::RawSpec;
    use crate::resolve::ingest;
    use serde_json::json;

    fn spec_from(value: serde_json::Value) -> Spec {
        let raw: RawSpec = serde_json::from_value(value).unwrap();
        ingest(&raw, &ResolverConfig::default()).unwrap()
    }

    fn registry_names(spec: &Spec) -> Vec<String> {
        spec.schemas.iter().map(|id| spec.schema(*id).name.clone()).collect()
    }

    fn creatable_count(spec: &Spec) -> usize {
        (0..spec.arena.len())
            .filter(|i| spec.arena[SchemaId(*i as u32)].create)
            .count()
    }

    #[test]
    fn test_nested_creatable_is_extracted() {
        let mut spec = spec_from(json!({
            "schemas": {
                "Owner": {
                    "type": "object",
                    "properties": {
                        "address": {
                            "type": "object",
                            "x-repose": {"type": "Address", "create": true},
                            "properties": {"street": {"type": "string"}}
                        }
                    }
                }
            }
        }));
        extract_schemas(&mut spec).unwrap();
        assert_eq!(registry_names(&spec), vec!["Owner", "Address"]);

        let address = spec.find_schema("Address").unwrap();
        assert!(spec.schema(address).create);
        assert!(matches!(spec.schema(address).variant, crate::ir::Variant::Struct { .. }));

        let in_tree = spec
            .arena
            .walk(spec.schemas[0], Order::TopDown)
            .map(|p| p.node())
            .find(|id| spec.schema(*id).name == "Address")
            .unwrap();
        assert_ne!(in_tree, address);
        assert!(!spec.schema(in_tree).create);
    }

    #[test]
    fn test_same_name_via_two_parameters_is_deduplicated() {
        let shared = json!({
            "type": "object",
            "x-repose": {"type": "Filter", "create": true},
            "properties": {"q": {"type": "string"}}
        });
        let mut spec = spec_from(json!({
            "paths": {
                "/a": {"get": {"parameters": [{"name": "f", "in": "query", "schema": shared.clone()}]}},
                "/b": {"get": {"parameters": [{"name": "f", "in": "query", "schema": shared}]}}
            }
        }));
        extract_schemas(&mut spec).unwrap();
        assert_eq!(registry_names(&spec), vec!["Filter"]);
        for path in &spec.paths {
            let schema = path.operations[0].parameters[0].schema.unwrap();
            assert_eq!(spec.schema(schema).name, "Filter");
            assert!(!spec.schema(schema).create);
        }
    }

    #[test]
    fn test_registry_roots_are_not_self_extracted() {
        let mut spec = spec_from(json!({"schemas": {"Pet": {"type": "object"}}}));
        extract_schemas(&mut spec).unwrap();
        assert_eq!(registry_names(&spec), vec!["Pet"]);
        assert!(spec.schema(spec.schemas[0]).create);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let mut spec = spec_from(json!({
            "schemas": {
                "Owner": {
                    "type": "object",
                    "properties": {
                        "pet": {"type": "object", "x-repose": {"type": "Pet", "create": true}}
                    }
                }
            },
            "paths": {
                "/owners": {"get": {"responses": {"200": {"content": {"application/json": {"schema": {
                    "type": "object", "x-repose": {"type": "OwnerList", "create": true}
                }}}}}}}
            }
        }));
        extract_schemas(&mut spec).unwrap();
        let names = registry_names(&spec);
        let creatable = creatable_count(&spec);
        assert_eq!(names, vec!["Owner", "Pet", "OwnerList"]);

        extract_schemas(&mut spec).unwrap();
        assert_eq!(registry_names(&spec), names);
        assert_eq!(creatable_count(&spec), creatable);
    }

    #[test]
    fn test_callback_roots_are_extracted_and_deduplicated() {
        let event = json!({
            "type": "object",
            "x-repose": {"type": "Event", "create": true},
            "properties": {"kind": {"type": "string"}}
        });
        let mut spec = spec_from(json!({
            "paths": {"/subscribe": {"post": {
                "responses": {"200": {"content": {"application/json": {"schema": event.clone()}}}},
                "callbacks": {"on_event": {"{$request.body#/url}": {"post": {
                    "requestBody": {"content": {"application/json": {"schema": event}}}
                }}}}
            }}}
        }));
        extract_schemas(&mut spec).unwrap();
        assert_eq!(registry_names(&spec), vec!["Event"]);

        let op = &spec.paths[0].operations[0];
        let callback_op = &op.callbacks["OnEvent"][0].operations[0];
        let uses = [
            op.responses[0].schema.unwrap(),
            callback_op.parameters[0].schema.unwrap(),
        ];
        for id in uses {
            assert_eq!(spec.schema(id).name, "Event");
            assert!(!spec.schema(id).create);
        }
        assert!(spec.schema(spec.schemas[0]).create);
    }
}
