//! Naming passes: paths, operations, responses
//!
//! Must run in that order. Each pass fails with a sequencing violation when
//! it meets an entity the previous pass should have named.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use super::extract::extract_tree;
use crate::config::NameCase;
use crate::error::{IrError, Result};
use crate::ir::{Operation, PathItem, SchemaArena, SchemaId, Spec};
use crate::names::{lower_first, to_pascal_case, upper_first};

fn runtime_expression() -> &'static Regex {
    static RUNTIME_EXPRESSION: OnceLock<Regex> = OnceLock::new();
    RUNTIME_EXPRESSION.get_or_init(|| {
        Regex::new(r"\{\$[^}]+\}").unwrap_or_else(|e| panic!("invalid runtime expression regex: {e}"))
    })
}

// =============================================================================
// Paths
// =============================================================================

/// Name for a route template: `/pets/{id}/profile` -> `PetsWithIdProfile`
pub fn path_name(route: &str) -> String {
    let name: String = route
        .split('/')
        .map(|segment| {
            if segment.contains('{') {
                format!("With{}", to_pascal_case(segment.trim_matches(|c| c == '{' || c == '}')))
            } else {
                to_pascal_case(segment)
            }
        })
        .collect();
    if name.is_empty() {
        "RootPath".to_string()
    } else {
        name
    }
}

/// Name for a callback route, prefixed by its event name.
/// Runtime expressions and the query string are ignored.
pub fn callback_path_name(event: &str, route: &str) -> String {
    let stripped = runtime_expression().replace_all(route, "");
    let without_query = stripped.split('?').next().unwrap_or_default();
    upper_first(&format!("{event}{}", path_name(without_query)))
}

/// Names every unnamed path and callback path
pub fn name_paths(spec: &mut Spec) -> Result<()> {
    name_path_list(&mut spec.paths, None);
    Ok(())
}

fn name_path_list(paths: &mut [PathItem], event: Option<&str>) {
    for path in paths {
        for op in &mut path.operations {
            for (callback_event, callback_paths) in &mut op.callbacks {
                name_path_list(callback_paths, Some(callback_event.as_str()));
            }
        }
        if path.name.is_empty() {
            path.name = match event {
                Some(event) => callback_path_name(event, &path.path),
                None => path_name(&path.path),
            };
            debug!(route = %path.path, name = %path.name, "named path");
        }
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Names every unnamed operation after its method and path
pub fn name_operations(spec: &mut Spec, case: NameCase) -> Result<()> {
    name_operation_list(&mut spec.paths, case)
}

fn name_operation_list(paths: &mut [PathItem], case: NameCase) -> Result<()> {
    for path in paths {
        if path.name.is_empty() {
            return Err(IrError::sequencing(
                format!("path {}", path.path),
                "path has no name before operation naming",
            ));
        }
        for op in &mut path.operations {
            if op.name.is_empty() {
                let raw = format!("{}{}", op.method.as_str(), upper_first(&path.name));
                op.name = match case {
                    NameCase::Pascal => upper_first(&raw),
                    NameCase::Camel => lower_first(&raw),
                };
            }
            for callback_paths in op.callbacks.values_mut() {
                name_operation_list(callback_paths, case)?;
            }
        }
    }
    Ok(())
}

// =============================================================================
// Responses
// =============================================================================

/// Names every response; explicit names are re-cased.
///
/// An anonymous creatable response schema takes the response's name and is
/// extracted to the registry. When several such schemas share one response
/// name (one status code, several content types), each name is suffixed with
/// its content type so distinct schemas never alias.
pub fn name_responses(spec: &mut Spec) -> Result<()> {
    let Spec {
        arena,
        schemas,
        paths,
    } = spec;
    name_response_list(arena, schemas, paths)
}

fn name_response_list(arena: &mut SchemaArena, registry: &mut Vec<SchemaId>, paths: &mut [PathItem]) -> Result<()> {
    for path in paths {
        for op in &mut path.operations {
            if op.name.is_empty() {
                return Err(IrError::sequencing(
                    format!("{} {}", op.method, path.path),
                    "operation has no name before response naming",
                ));
            }
            name_operation_responses(arena, registry, op)?;
            for callback_paths in op.callbacks.values_mut() {
                name_response_list(arena, registry, callback_paths)?;
            }
        }
    }
    Ok(())
}

fn name_operation_responses(arena: &mut SchemaArena, registry: &mut Vec<SchemaId>, op: &mut Operation) -> Result<()> {
    for response in &mut op.responses {
        response.name = if response.name.is_empty() {
            format!("{}Response{}", op.name, to_pascal_case(&response.code))
        } else {
            to_pascal_case(&response.name)
        };
    }

    let promotable: Vec<(usize, SchemaId)> = op
        .responses
        .iter()
        .enumerate()
        .filter_map(|(i, response)| response.schema.map(|schema| (i, schema)))
        .filter(|(_, schema)| arena[*schema].create && arena[*schema].name.is_empty())
        .collect();

    for (index, schema) in &promotable {
        let response = &op.responses[*index];
        let shared = promotable
            .iter()
            .filter(|(other, _)| op.responses[*other].name == response.name)
            .count()
            > 1;
        let name = match (&response.content_type, shared) {
            (Some(content_type), true) => format!("{}{}", response.name, content_type_suffix(content_type)),
            _ => response.name.clone(),
        };
        debug!(%name, "promoting anonymous response schema");
        arena[*schema].name = name;
        extract_tree(arena, registry, *schema, true)?;
    }
    Ok(())
}

/// `application/vnd.api+json` -> `ApplicationVndApiJson`
fn content_type_suffix(content_type: &str) -> String {
    let base = content_type.split(';').next().unwrap_or_default();
    to_pascal_case(&base.replace(['/', '+'], "_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::ir::Variant;
    use crate::raw::RawSpec;
    use crate::resolve::ingest;
    use serde_json::json;

    fn spec_from(value: serde_json::Value) -> Spec {
        let raw: RawSpec = serde_json::from_value(value).unwrap();
        ingest(&raw, &ResolverConfig::default()).unwrap()
    }

    #[test]
    fn test_path_name() {
        assert_eq!(path_name("/pets/{id}/profile"), "PetsWithIdProfile");
        assert_eq!(path_name("/pet-types/{type_id}"), "PetTypesWithTypeId");
        assert_eq!(path_name("/"), "RootPath");
        assert_eq!(path_name(""), "RootPath");
    }

    #[test]
    fn test_callback_path_name() {
        assert_eq!(callback_path_name("OnData", "{$request.body#/callbackUrl}/data?since=1"), "OnDataData");
        assert_eq!(callback_path_name("OnData", "{$request.body#/callbackUrl}"), "OnDataRootPath");
        assert_eq!(callback_path_name("onEvent", "/hooks/{id}"), "OnEventHooksWithId");
    }

    #[test]
    fn test_operation_names_follow_case() {
        let raw = json!({"paths": {"/pets/{id}/profile": {"get": {}}}});

        let mut spec = spec_from(raw.clone());
        name_paths(&mut spec).unwrap();
        name_operations(&mut spec, NameCase::Pascal).unwrap();
        assert_eq!(spec.paths[0].operations[0].name, "GetPetsWithIdProfile");

        let mut spec = spec_from(raw);
        name_paths(&mut spec).unwrap();
        name_operations(&mut spec, NameCase::Camel).unwrap();
        assert_eq!(spec.paths[0].operations[0].name, "getPetsWithIdProfile");
    }

    #[test]
    fn test_explicit_names_are_kept() {
        let mut spec = spec_from(json!({
            "paths": {"/pets": {"x-repose": {"name": "Listing"}, "get": {"operationId": "listPets"}}}
        }));
        name_paths(&mut spec).unwrap();
        name_operations(&mut spec, NameCase::Pascal).unwrap();
        assert_eq!(spec.paths[0].name, "Listing");
        assert_eq!(spec.paths[0].operations[0].name, "ListPets");
    }

    #[test]
    fn test_unnamed_path_is_a_sequencing_violation() {
        let mut spec = spec_from(json!({"paths": {"/pets": {"get": {}}}}));
        let err = name_operations(&mut spec, NameCase::Pascal).unwrap_err();
        assert!(matches!(err, IrError::SequencingViolation { .. }));
    }

    #[test]
    fn test_unnamed_operation_is_a_sequencing_violation() {
        let mut spec = spec_from(json!({"paths": {"/pets": {"get": {"responses": {"200": {}}}}}}));
        let err = name_responses(&mut spec).unwrap_err();
        assert!(matches!(err, IrError::SequencingViolation { .. }));
    }

    #[test]
    fn test_response_names() {
        let mut spec = spec_from(json!({
            "paths": {"/pets": {"get": {"responses": {
                "200": {},
                "5xx": {},
                "default": {"x-repose": {"name": "pet_error"}}
            }}}}
        }));
        name_paths(&mut spec).unwrap();
        name_operations(&mut spec, NameCase::Pascal).unwrap();
        name_responses(&mut spec).unwrap();
        let names: Vec<&str> = spec.paths[0].operations[0]
            .responses
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["GetPetsResponse200", "GetPetsResponse5Xx", "PetError"]);
    }

    #[test]
    fn test_callback_paths_and_operations_are_named() {
        let mut spec = spec_from(json!({
            "paths": {"/subscribe": {"post": {"callbacks": {"on_data": {
                "{$request.body#/url}/data": {"post": {"responses": {"200": {}}}}
            }}}}}
        }));
        name_paths(&mut spec).unwrap();
        name_operations(&mut spec, NameCase::Pascal).unwrap();
        name_responses(&mut spec).unwrap();
        let callback = &spec.paths[0].operations[0].callbacks["OnData"][0];
        assert_eq!(callback.name, "OnDataData");
        assert_eq!(callback.operations[0].name, "PostOnDataData");
        assert_eq!(callback.operations[0].responses[0].name, "PostOnDataDataResponse200");
    }

    #[test]
    fn test_anonymous_creatable_response_schema_is_promoted() {
        let mut spec = spec_from(json!({
            "paths": {"/items/{id}": {"get": {"responses": {"200": {"content": {"application/json": {"schema": {
                "type": "object",
                "x-repose": {"create": true},
                "properties": {"id": {"type": "integer"}}
            }}}}}}}}
        }));
        name_paths(&mut spec).unwrap();
        name_operations(&mut spec, NameCase::Pascal).unwrap();
        name_responses(&mut spec).unwrap();

        let response = &spec.paths[0].operations[0].responses[0];
        assert_eq!(response.name, "GetItemsWithIdResponse200");
        let schema = spec.schema(response.schema.unwrap());
        assert_eq!(schema.name, "GetItemsWithIdResponse200");
        assert!(!schema.create);
        assert_eq!(spec.schemas.len(), 1);
        assert!(spec.schema(spec.schemas[0]).create);
    }

    #[test]
    fn test_content_type_suffix() {
        assert_eq!(content_type_suffix("application/json"), "ApplicationJson");
        assert_eq!(content_type_suffix("application/vnd.api+json; charset=utf-8"), "ApplicationVndApiJson");
    }

    #[test]
    fn test_response_schemas_per_content_type_stay_distinct() {
        let mut spec = spec_from(json!({
            "paths": {"/items": {"get": {"responses": {"200": {"content": {
                "application/json": {"schema": {
                    "type": "object", "x-repose": {"create": true},
                    "properties": {"a": {"type": "string"}}
                }},
                "application/xml": {"schema": {
                    "type": "object", "x-repose": {"create": true},
                    "properties": {"b": {"type": "integer"}}
                }}
            }}}}}}
        }));
        name_paths(&mut spec).unwrap();
        name_operations(&mut spec, NameCase::Pascal).unwrap();
        name_responses(&mut spec).unwrap();

        let mut names: Vec<&str> = spec.schemas.iter().map(|id| spec.schema(*id).name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["GetItemsResponse200ApplicationJson", "GetItemsResponse200ApplicationXml"]);

        for response in &spec.paths[0].operations[0].responses {
            assert_eq!(response.name, "GetItemsResponse200");
            let schema = spec.schema(response.schema.unwrap());
            let entry = spec.find_schema(&schema.name).unwrap();
            let Variant::Struct { fields, .. } = &spec.schema(entry).variant else {
                panic!("Expected Struct");
            };
            let expected = if response.content_type.as_deref() == Some("application/json") { "A" } else { "B" };
            assert_eq!(fields.keys().map(String::as_str).collect::<Vec<_>>(), vec![expected]);
        }
    }
}
