//! JSON view of a finished Spec
//!
//! Registry entries are rendered as nested node objects with children inline;
//! named non-creatable nodes render as references by name. Empty fields are
//! omitted.

use serde_json::{json, Map, Value};

use crate::ir::{Operation, Parameter, PathItem, Response, SchemaArena, SchemaId, Spec, Variant};

pub fn to_value(spec: &Spec) -> Value {
    json!({
        "schemas": spec.schemas.iter().map(|id| node_value(&spec.arena, *id)).collect::<Vec<_>>(),
        "paths": spec.paths.iter().map(|p| path_value(&spec.arena, p)).collect::<Vec<_>>(),
    })
}

pub fn to_string_pretty(spec: &Spec) -> crate::Result<String> {
    Ok(serde_json::to_string_pretty(&to_value(spec))?)
}

fn put_str(map: &mut Map<String, Value>, key: &str, value: &str) {
    if !value.is_empty() {
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
}

fn put_lines(map: &mut Map<String, Value>, key: &str, lines: &[String]) {
    if !lines.is_empty() {
        map.insert(key.to_string(), json!(lines));
    }
}

pub fn node_value(arena: &SchemaArena, id: SchemaId) -> Value {
    let node = &arena[id];
    let mut map = Map::new();
    put_str(&mut map, "name", &node.name);
    if node.original_name != node.name {
        put_str(&mut map, "originalName", &node.original_name);
    }
    put_str(&mut map, "fieldName", &node.field_name);
    put_str(&mut map, "description", &node.description);
    put_lines(&mut map, "comments", &node.comments);
    if node.nullable {
        map.insert("nullable".to_string(), Value::Bool(true));
    }
    if node.create {
        map.insert("create".to_string(), Value::Bool(true));
    }
    if !node.tags.is_empty() {
        map.insert("tags".to_string(), json!(node.tags));
    }
    if !node.enum_values.is_empty() {
        map.insert("enum".to_string(), Value::Array(node.enum_values.clone()));
    }
    map.insert("kind".to_string(), Value::String(node.variant.kind().to_string()));

    match &node.variant {
        Variant::Reference { .. } | Variant::Any => {}
        Variant::Primitive { primitive } => {
            map.insert("primitive".to_string(), Value::String(primitive.to_string()));
        }
        Variant::Array { items } => {
            map.insert("items".to_string(), child_value(arena, *items));
        }
        Variant::Map { key, value } => {
            map.insert("key".to_string(), child_value(arena, *key));
            map.insert("value".to_string(), child_value(arena, *value));
        }
        Variant::Struct { fields, extension } => {
            let fields: Map<String, Value> = fields
                .iter()
                .map(|(k, v)| (k.clone(), child_value(arena, *v)))
                .collect();
            map.insert("fields".to_string(), Value::Object(fields));
            if let Some(slot) = extension {
                map.insert(
                    "extension".to_string(),
                    json!({"fieldName": slot.field_name, "schema": child_value(arena, slot.schema)}),
                );
            }
        }
        Variant::AllOf { members } | Variant::AnyOf { members } | Variant::OneOf { members } => {
            let members: Vec<Value> = members.iter().map(|m| child_value(arena, *m)).collect();
            map.insert("members".to_string(), Value::Array(members));
        }
    }
    Value::Object(map)
}

/// Nested position: named non-creatable nodes collapse to a reference
fn child_value(arena: &SchemaArena, id: SchemaId) -> Value {
    let node = &arena[id];
    if node.name.is_empty() || node.create {
        return node_value(arena, id);
    }
    let mut map = Map::new();
    map.insert("ref".to_string(), Value::String(node.name.clone()));
    put_str(&mut map, "fieldName", &node.field_name);
    if node.nullable {
        map.insert("nullable".to_string(), Value::Bool(true));
    }
    if !node.tags.is_empty() {
        map.insert("tags".to_string(), json!(node.tags));
    }
    Value::Object(map)
}

fn path_value(arena: &SchemaArena, path: &PathItem) -> Value {
    let mut map = Map::new();
    put_str(&mut map, "path", &path.path);
    put_str(&mut map, "name", &path.name);
    put_str(&mut map, "description", &path.description);
    put_lines(&mut map, "comments", &path.comments);
    let operations: Vec<Value> = path.operations.iter().map(|op| operation_value(arena, op)).collect();
    map.insert("operations".to_string(), Value::Array(operations));
    Value::Object(map)
}

fn operation_value(arena: &SchemaArena, op: &Operation) -> Value {
    let mut map = Map::new();
    put_str(&mut map, "name", &op.name);
    put_str(&mut map, "id", &op.id);
    map.insert("method".to_string(), Value::String(op.method.as_str().to_string()));
    put_str(&mut map, "description", &op.description);
    put_lines(&mut map, "comments", &op.comments);
    let parameters: Vec<Value> = op.parameters.iter().map(|p| parameter_value(arena, p)).collect();
    map.insert("parameters".to_string(), Value::Array(parameters));
    let responses: Vec<Value> = op.responses.iter().map(|r| response_value(arena, r)).collect();
    map.insert("responses".to_string(), Value::Array(responses));
    if !op.callbacks.is_empty() {
        let callbacks: Map<String, Value> = op
            .callbacks
            .iter()
            .map(|(event, paths)| {
                let paths: Vec<Value> = paths.iter().map(|p| path_value(arena, p)).collect();
                (event.clone(), Value::Array(paths))
            })
            .collect();
        map.insert("callbacks".to_string(), Value::Object(callbacks));
    }
    Value::Object(map)
}

fn parameter_value(arena: &SchemaArena, param: &Parameter) -> Value {
    let mut map = Map::new();
    put_str(&mut map, "name", &param.name);
    put_str(&mut map, "description", &param.description);
    map.insert("in".to_string(), Value::String(param.location.as_str().to_string()));
    if let Some(content_type) = &param.content_type {
        put_str(&mut map, "contentType", content_type);
    }
    map.insert("required".to_string(), Value::Bool(param.required));
    map.insert(
        "style".to_string(),
        Value::String(param.serialization.style.as_str().to_string()),
    );
    map.insert("explode".to_string(), Value::Bool(param.serialization.explode));
    if let Some(schema) = param.schema {
        map.insert("schema".to_string(), child_value(arena, schema));
    }
    Value::Object(map)
}

fn response_value(arena: &SchemaArena, response: &Response) -> Value {
    let mut map = Map::new();
    put_str(&mut map, "name", &response.name);
    put_str(&mut map, "description", &response.description);
    map.insert("code".to_string(), Value::String(response.code.clone()));
    if let Some(content_type) = &response.content_type {
        put_str(&mut map, "contentType", content_type);
    }
    if let Some(schema) = response.schema {
        map.insert("schema".to_string(), child_value(arena, schema));
    }
    Value::Object(map)
}
