//! Inline-schema simplification
//!
//! Anonymous structs lose their extension slot and become maps; anonymous
//! any-of/one-of compositions become `Any`.

use std::ops::ControlFlow;

use crate::error::Result;
use crate::ir::{Order, Primitive, SchemaNode, Spec, Variant};

pub fn simplify_inline_schemas(spec: &mut Spec) -> Result<()> {
    let mut roots = spec.schemas.clone();
    roots.extend(spec.operation_schema_roots());

    for root in roots {
        spec.arena.visit(root, Order::BottomUp, |arena, path| {
            let id = path.node();
            if !arena[id].is_anonymous() {
                return Ok(ControlFlow::Continue(()));
            }
            let replacement = match &arena[id].variant {
                Variant::Struct {
                    extension: Some(slot),
                    ..
                } => {
                    let value = slot.schema;
                    let key = arena.alloc(SchemaNode::primitive(Primitive::String));
                    Some(Variant::Map { key, value })
                }
                Variant::AnyOf { .. } | Variant::OneOf { .. } => Some(Variant::Any),
                Variant::Struct { extension: None, .. }
                | Variant::Reference { .. }
                | Variant::Primitive { .. }
                | Variant::Any
                | Variant::Array { .. }
                | Variant::Map { .. }
                | Variant::AllOf { .. } => None,
            };
            if let Some(variant) = replacement {
                arena[id].variant = variant;
            }
            Ok(ControlFlow::Continue(()))
        })?;
    }
    Ok(())
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

    #[test]
    fn test_anonymous_struct_with_extension_becomes_map() {
        let mut spec = spec_from(json!({
            "schemas": {"Bag": {"type": "object", "properties": {
                "labels": {
                    "type": "object",
                    "properties": {"main": {"type": "string"}},
                    "additionalProperties": {"type": "string"}
                }
            }}}
        }));
        simplify_inline_schemas(&mut spec).unwrap();

        let Variant::Struct { fields, .. } = &spec.schema(spec.schemas[0]).variant else {
            panic!("Expected Struct");
        };
        let labels = spec.schema(fields["Labels"]);
        let Variant::Map { key, value } = labels.variant else {
            panic!("Expected Map, got {:?}", labels.variant);
        };
        assert_eq!(spec.schema(key).variant, Variant::Primitive { primitive: Primitive::String });
        assert_eq!(spec.schema(value).variant, Variant::Primitive { primitive: Primitive::String });
    }

    #[test]
    fn test_named_struct_keeps_extension() {
        let mut spec = spec_from(json!({
            "schemas": {"Bag": {
                "type": "object",
                "properties": {"main": {"type": "string"}},
                "additionalProperties": true
            }}
        }));
        simplify_inline_schemas(&mut spec).unwrap();
        assert!(matches!(
            spec.schema(spec.schemas[0]).variant,
            Variant::Struct { extension: Some(_), .. }
        ));
    }

    #[test]
    fn test_anonymous_alternatives_become_any() {
        let mut spec = spec_from(json!({
            "paths": {"/x": {"get": {"parameters": [{"name": "v", "in": "query", "schema": {
                "anyOf": [{"type": "string"}, {"type": "integer"}]
            }}]}}},
            "schemas": {"Named": {"oneOf": [{"type": "string"}, {"type": "integer"}]}}
        }));
        simplify_inline_schemas(&mut spec).unwrap();
        let param = spec.paths[0].operations[0].parameters[0].schema.unwrap();
        assert_eq!(spec.schema(param).variant, Variant::Any);
        assert!(matches!(spec.schema(spec.schemas[0]).variant, Variant::OneOf { .. }));
    }
}
