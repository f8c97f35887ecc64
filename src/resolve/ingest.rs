//! Root iteration: builds a [`Spec`] from a [`RawSpec`]
//!
//! Resolves every declared schema, then every path, operation, parameter,
//! request body, response and callback. Names are only copied from explicit
//! sources here; synthesized names come later from the naming passes.

use std::collections::BTreeMap;

use crate::config::ResolverConfig;
use crate::error::{IrError, Result};
use crate::ir::{
    Method, Operation, Parameter, ParameterLocation, PathItem, Response, Serialization, Spec,
};
use crate::names::to_pascal_case;
use crate::overrides::{self, NameOverride};
use crate::raw::{RawOperation, RawParameter, RawPathItem, RawSpec};

use super::Resolver;

/// Resolves every root of `raw` into a fresh [`Spec`]
pub fn ingest(raw: &RawSpec, config: &ResolverConfig) -> Result<Spec> {
    let mut spec = Spec::default();
    let mut resolver = Resolver::new(&mut spec.arena, config);

    for (key, schema) in &raw.schemas {
        if schema.body.is_none() {
            continue;
        }
        let id = resolver.resolve_root(key, schema)?;
        spec.schemas.push(id);
    }

    let mut paths = Vec::with_capacity(raw.paths.len());
    for (route, item) in &raw.paths {
        paths.push(ingest_path(&mut resolver, config, route, item)?);
    }
    spec.paths = paths;
    Ok(spec)
}

fn ingest_path(
    resolver: &mut Resolver<'_>,
    config: &ResolverConfig,
    route: &str,
    item: &RawPathItem,
) -> Result<PathItem> {
    let name = overrides::lookup::<NameOverride>(&item.extensions, &config.extension_name, route)
        .and_then(|o| o.name().map(str::to_string))
        .unwrap_or_default();

    let mut operations = Vec::new();
    for (method, raw_op) in item.operations() {
        let mut op = ingest_operation(resolver, config, route, method, raw_op)?;
        for shared in &item.parameters {
            op.parameters.extend(ingest_parameter(resolver, shared)?);
        }
        operations.push(op);
    }

    Ok(PathItem {
        path: route.to_string(),
        name,
        description: item.description.clone().unwrap_or_default(),
        comments: Vec::new(),
        operations,
    })
}

fn ingest_operation(
    resolver: &mut Resolver<'_>,
    config: &ResolverConfig,
    route: &str,
    method: Method,
    raw: &RawOperation,
) -> Result<Operation> {
    let id = raw.operation_id.clone().unwrap_or_default();

    let mut parameters = Vec::new();
    for param in &raw.parameters {
        parameters.extend(ingest_parameter(resolver, param)?);
    }

    if let Some(body) = &raw.request_body {
        for (content_type, media) in &body.content {
            let schema = match &media.schema {
                Some(schema) => Some(resolver.resolve(Some(schema), &[])?),
                None => None,
            };
            parameters.push(Parameter {
                name: "body".to_string(),
                description: body.description.clone().unwrap_or_default(),
                location: ParameterLocation::Body,
                content_type: Some(content_type.clone()),
                schema,
                serialization: Serialization::for_location(ParameterLocation::Body),
                required: body.required,
            });
        }
    }

    let mut responses = Vec::new();
    for (code, raw_response) in &raw.responses {
        let context = format!("{method} {route} {code}");
        let name = overrides::lookup::<NameOverride>(&raw_response.extensions, &config.extension_name, &context)
            .and_then(|o| o.name().map(str::to_string))
            .unwrap_or_default();
        let description = raw_response.description.clone().unwrap_or_default();

        if raw_response.content.is_empty() {
            responses.push(Response {
                name,
                description,
                code: code.clone(),
                content_type: None,
                schema: None,
            });
            continue;
        }
        for (content_type, media) in &raw_response.content {
            let schema = match &media.schema {
                Some(schema) => Some(resolver.resolve(Some(schema), &[])?),
                None => None,
            };
            responses.push(Response {
                name: name.clone(),
                description: description.clone(),
                code: code.clone(),
                content_type: Some(content_type.clone()),
                schema,
            });
        }
    }

    let mut callbacks = BTreeMap::new();
    for (event, routes) in &raw.callbacks {
        let mut callback_paths = Vec::with_capacity(routes.len());
        for (callback_route, item) in routes {
            callback_paths.push(ingest_path(resolver, config, callback_route, item)?);
        }
        callbacks.insert(to_pascal_case(event), callback_paths);
    }

    Ok(Operation {
        name: to_pascal_case(&id),
        id,
        method,
        description: raw.description.clone().unwrap_or_default(),
        comments: Vec::new(),
        parameters,
        responses,
        callbacks,
    })
}

/// One parameter per representation: the plain schema, then each content type
fn ingest_parameter(resolver: &mut Resolver<'_>, raw: &RawParameter) -> Result<Vec<Parameter>> {
    let invalid = |reason: String| IrError::InvalidParameter {
        name: raw.name.clone(),
        reason,
    };

    let location: ParameterLocation = raw.location.parse().map_err(invalid)?;
    let mut serialization = Serialization::for_location(location);
    if let Some(style) = &raw.style {
        serialization.style = style.parse().map_err(invalid)?;
        serialization.explode = serialization.style == crate::ir::SerializationStyle::Form;
    }
    if let Some(explode) = raw.explode {
        serialization.explode = explode;
    }

    let template = Parameter {
        name: raw.name.clone(),
        description: raw.description.clone().unwrap_or_default(),
        location,
        content_type: None,
        schema: None,
        serialization,
        required: raw.required || location == ParameterLocation::Path,
    };

    let mut parameters = Vec::new();
    if let Some(schema) = &raw.schema {
        parameters.push(Parameter {
            schema: Some(resolver.resolve(Some(schema), &[])?),
            ..template.clone()
        });
    }
    for (content_type, media) in &raw.content {
        let Some(schema) = &media.schema else {
            continue;
        };
        parameters.push(Parameter {
            content_type: Some(content_type.clone()),
            schema: Some(resolver.resolve(Some(schema), &[])?),
            ..template.clone()
        });
    }
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{SerializationStyle, Variant};
    use serde_json::json;

    fn ingest_json(value: serde_json::Value) -> Result<Spec> {
        let raw: RawSpec = serde_json::from_value(value).unwrap();
        ingest(&raw, &ResolverConfig::default())
    }

    #[test]
    fn test_schemas_are_named_after_keys() {
        let spec = ingest_json(json!({
            "schemas": {
                "Pet": {"type": "object", "properties": {"id": {"type": "integer"}}},
                "Alias": {"$ref": "#/components/schemas/Pet"}
            }
        }))
        .unwrap();
        assert_eq!(spec.schemas.len(), 1);
        let pet = spec.schema(spec.schemas[0]);
        assert_eq!(pet.name, "Pet");
        assert!(pet.create);
    }

    #[test]
    fn test_operation_shape() {
        let spec = ingest_json(json!({
            "paths": {
                "/pets/{id}": {
                    "parameters": [{"name": "id", "in": "path", "schema": {"type": "string"}}],
                    "get": {
                        "operationId": "show_pet",
                        "parameters": [{"name": "fields", "in": "query", "schema": {"type": "string"}}],
                        "responses": {
                            "200": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}},
                            "404": {"description": "not found"}
                        }
                    },
                    "put": {
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {"schema": {"$ref": "#/components/schemas/Pet"}},
                                "application/xml": {"schema": {"$ref": "#/components/schemas/Pet"}}
                            }
                        }
                    }
                }
            }
        }))
        .unwrap();

        let path = &spec.paths[0];
        assert_eq!(path.path, "/pets/{id}");
        assert_eq!(path.operations.len(), 2);

        let get = &path.operations[0];
        assert_eq!(get.method, Method::Get);
        assert_eq!(get.name, "ShowPet");
        assert_eq!(get.id, "show_pet");
        let names: Vec<&str> = get.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["fields", "id"]);
        assert!(get.parameters[1].required);
        assert_eq!(get.responses.len(), 2);
        assert_eq!(get.responses[1].code, "404");
        assert!(get.responses[1].schema.is_none());

        let put = &path.operations[1];
        let bodies: Vec<_> = put
            .parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Body)
            .collect();
        assert_eq!(bodies.len(), 2);
        assert!(bodies.iter().all(|p| p.required && p.name == "body"));
        assert_eq!(bodies[0].content_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn test_parameter_serialization() {
        let spec = ingest_json(json!({
            "paths": {
                "/search": {
                    "get": {
                        "parameters": [
                            {"name": "filter", "in": "query", "style": "deepObject", "schema": {"type": "object"}},
                            {"name": "ids", "in": "query", "explode": false, "schema": {"type": "array", "items": {"type": "string"}}}
                        ]
                    }
                }
            }
        }))
        .unwrap();
        let params = &spec.paths[0].operations[0].parameters;
        assert_eq!(params[0].serialization.style, SerializationStyle::DeepObject);
        assert!(!params[0].serialization.explode);
        assert_eq!(params[1].serialization.style, SerializationStyle::Form);
        assert!(!params[1].serialization.explode);
    }

    #[test]
    fn test_invalid_location_is_rejected() {
        let err = ingest_json(json!({
            "paths": {"/x": {"get": {"parameters": [{"name": "q", "in": "body", "schema": {"type": "string"}}]}}}
        }))
        .unwrap_err();
        assert!(matches!(err, IrError::InvalidParameter { .. }));
    }

    #[test]
    fn test_callbacks_and_overrides() {
        let spec = ingest_json(json!({
            "paths": {
                "/subscribe": {
                    "x-repose": {"name": "Subscription"},
                    "post": {
                        "responses": {
                            "201": {"x-repose": {"name": " Subscribed "}, "description": "ok"}
                        },
                        "callbacks": {
                            "on_data": {
                                "{$request.body#/callbackUrl}/data": {
                                    "post": {"requestBody": {"content": {"application/json": {"schema": {"type": "object"}}}}}
                                }
                            }
                        }
                    }
                }
            }
        }))
        .unwrap();
        let path = &spec.paths[0];
        assert_eq!(path.name, "Subscription");
        let op = &path.operations[0];
        assert_eq!(op.responses[0].name, "Subscribed");
        let callback = &op.callbacks["OnData"][0];
        assert_eq!(callback.path, "{$request.body#/callbackUrl}/data");
        let body = callback.operations[0].parameters[0].schema.unwrap();
        assert!(matches!(spec.schema(body).variant, Variant::Struct { .. }));
    }
}
