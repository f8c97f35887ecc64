//! Operation summary comments

use crate::config::CommentConfig;
use crate::ir::{Operation, PathItem, SchemaArena, Spec};

pub fn add_path_comments(spec: &mut Spec, config: &CommentConfig) {
    if !config.path_comments {
        return;
    }
    let Spec { arena, paths, .. } = spec;
    comment_paths(arena, paths, config.description_comments);
}

fn comment_paths(arena: &SchemaArena, paths: &mut [PathItem], descriptions: bool) {
    for path in paths {
        for op in &mut path.operations {
            let lines = operation_comments(arena, &path.path, op, descriptions);
            op.comments.extend(lines);
            for callback_paths in op.callbacks.values_mut() {
                comment_paths(arena, callback_paths, descriptions);
            }
        }
    }
}

/// Ends a description with exactly one period
fn sentence(text: &str) -> String {
    format!("{}.", text.trim_end().trim_end_matches('.'))
}

fn operation_comments(arena: &SchemaArena, route: &str, op: &Operation, descriptions: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "{} is the \"{}\" operation for path \"{}\".",
        op.name, op.method, route
    )];

    if descriptions && !op.description.is_empty() {
        lines.push(String::new());
        lines.push(format!("Description: {}", sentence(&op.description)));
        lines.push(String::new());
    }

    if !op.parameters.is_empty() {
        lines.push("Parameters:".to_string());
        for param in &op.parameters {
            let content_type = param
                .content_type
                .as_deref()
                .map(|ct| format!(" with content-type {ct}"))
                .unwrap_or_default();
            lines.push(format!("    \"{}\" in {}{}.", param.name, param.location.as_str(), content_type));
            if descriptions && !param.description.is_empty() {
                lines.push(format!("    Description: {}", sentence(&param.description)));
            }
        }
    }

    if !op.responses.is_empty() {
        lines.push("Responses:".to_string());
        for response in &op.responses {
            let content_type = response
                .content_type
                .as_deref()
                .map(|ct| format!(": with content-type {ct}"))
                .unwrap_or_default();
            let name = response
                .schema
                .map(|id| arena[id].name.as_str())
                .filter(|name| !name.is_empty())
                .unwrap_or(&response.name);
            lines.push(format!("    \"{}\" ({}){}.", name, response.code, content_type));
            if descriptions && !response.description.is_empty() {
                lines.push(format!("    Description: {}", sentence(&response.description)));
            }
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Method, Parameter, ParameterLocation, Response, Serialization};
    use std::collections::BTreeMap;

    fn sample() -> Spec {
        let op = Operation {
            name: "GetPets".to_string(),
            id: String::new(),
            method: Method::Get,
            description: "Lists pets.\n".to_string(),
            comments: Vec::new(),
            parameters: vec![Parameter {
                name: "limit".to_string(),
                description: "Page size".to_string(),
                location: ParameterLocation::Query,
                content_type: None,
                schema: None,
                serialization: Serialization::for_location(ParameterLocation::Query),
                required: false,
            }],
            responses: vec![Response {
                name: "GetPetsResponse200".to_string(),
                description: String::new(),
                code: "200".to_string(),
                content_type: Some("application/json".to_string()),
                schema: None,
            }],
            callbacks: BTreeMap::new(),
        };
        let mut spec = Spec::default();
        spec.paths.push(PathItem {
            path: "/pets".to_string(),
            name: "Pets".to_string(),
            operations: vec![op],
            ..PathItem::default()
        });
        spec
    }

    #[test]
    fn test_comments_with_descriptions() {
        let mut spec = sample();
        add_path_comments(&mut spec, &CommentConfig::default());
        assert_eq!(
            spec.paths[0].operations[0].comments,
            vec![
                "GetPets is the \"GET\" operation for path \"/pets\".",
                "",
                "Description: Lists pets.",
                "",
                "Parameters:",
                "    \"limit\" in query.",
                "    Description: Page size.",
                "Responses:",
                "    \"GetPetsResponse200\" (200): with content-type application/json.",
            ]
        );
    }

    #[test]
    fn test_descriptions_can_be_disabled() {
        let mut spec = sample();
        let config = CommentConfig {
            path_comments: true,
            description_comments: false,
        };
        add_path_comments(&mut spec, &config);
        let comments = &spec.paths[0].operations[0].comments;
        assert!(comments.iter().all(|line| !line.contains("Description")));
    }

    #[test]
    fn test_comments_can_be_disabled() {
        let mut spec = sample();
        let config = CommentConfig {
            path_comments: false,
            description_comments: true,
        };
        add_path_comments(&mut spec, &config);
        assert!(spec.paths[0].operations[0].comments.is_empty());
    }
}
