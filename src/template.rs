//! Tag templates
//!
//! A deliberately small template language: literal text plus
//! `{{ .FieldName }}`, `{{ .Type }}` and `{{ .Description }}`.
//! Anything else inside `{{ }}` is rejected.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{IrError, Result};
use crate::ir::{SchemaNode, Tags};

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*(.*?)\s*\}\}").unwrap_or_else(|e| panic!("invalid placeholder regex: {e}"))
    })
}

/// Substitution variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Var {
    FieldName,
    Type,
    Description,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Var(Var),
}

/// A parsed template string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pieces: Vec<Piece>,
}

/// Values substituted into a template
#[derive(Debug, Clone, Copy)]
pub struct Bindings<'a> {
    pub field_name: &'a str,
    pub type_name: &'a str,
    pub description: &'a str,
}

impl<'a> Bindings<'a> {
    pub fn of(node: &'a SchemaNode) -> Self {
        Self {
            field_name: node.template_field_name(),
            type_name: &node.name,
            description: &node.description,
        }
    }
}

impl Template {
    pub fn parse(source: &str) -> Result<Self> {
        let mut pieces = Vec::new();
        let mut last = 0;
        for caps in placeholder().captures_iter(source) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                pieces.push(Piece::Text(source[last..whole.start()].to_string()));
            }
            let var = match inner.as_str() {
                ".FieldName" => Var::FieldName,
                ".Type" => Var::Type,
                ".Description" => Var::Description,
                other => {
                    return Err(IrError::InvalidTemplate {
                        template: source.to_string(),
                        reason: format!("unknown variable {other:?}"),
                    })
                }
            };
            pieces.push(Piece::Var(var));
            last = whole.end();
        }
        if last < source.len() {
            pieces.push(Piece::Text(source[last..].to_string()));
        }
        if pieces.iter().any(|p| matches!(p, Piece::Text(t) if t.contains("{{") || t.contains("}}"))) {
            return Err(IrError::InvalidTemplate {
                template: source.to_string(),
                reason: "unbalanced braces".to_string(),
            });
        }
        Ok(Self { pieces })
    }

    pub fn render(&self, bindings: &Bindings<'_>) -> String {
        self.pieces
            .iter()
            .map(|piece| match piece {
                Piece::Text(text) => text.as_str(),
                Piece::Var(Var::FieldName) => bindings.field_name,
                Piece::Var(Var::Type) => bindings.type_name,
                Piece::Var(Var::Description) => bindings.description,
            })
            .collect()
    }
}

/// A tag map whose values are parsed templates
#[derive(Debug, Clone, Default)]
pub struct TagTemplates {
    entries: Vec<(String, Vec<Template>)>,
}

impl TagTemplates {
    pub fn compile(tags: &Tags) -> Result<Self> {
        let entries = tags
            .iter()
            .map(|(key, values)| {
                let templates = values.iter().map(|v| Template::parse(v)).collect::<Result<Vec<_>>>()?;
                Ok((key.clone(), templates))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the configured templates merged with the node's override
    /// templates. Override keys win over configured ones. Previously rendered
    /// tags are never read, so rendering again yields the same result.
    pub fn render_for(&self, node: &SchemaNode) -> Result<Tags> {
        let bindings = Bindings::of(node);
        let mut rendered = Tags::new();
        for (key, templates) in &self.entries {
            if node.override_tags.contains_key(key) {
                continue;
            }
            rendered.insert(key.clone(), templates.iter().map(|t| t.render(&bindings)).collect());
        }
        for (key, values) in &node.override_tags {
            let values = values
                .iter()
                .map(|v| Template::parse(v).map(|t| t.render(&bindings)))
                .collect::<Result<Vec<_>>>()?;
            rendered.insert(key.clone(), values);
        }
        Ok(rendered)
    }
}
