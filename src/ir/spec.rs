//! Spec aggregate: schema registry plus paths, operations, parameters and responses

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::arena::SchemaArena;
use super::node::{SchemaId, SchemaNode};

/// Root aggregate of one resolution run
#[derive(Debug, Clone, Default)]
pub struct Spec {
    /// Owner of every schema node of this spec
    pub arena: SchemaArena,
    /// Top-level registry, in insertion order
    pub schemas: Vec<SchemaId>,
    pub paths: Vec<PathItem>,
}

/// A route template and its operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathItem {
    /// Route template, e.g. `/pets/{id}`
    pub path: String,
    pub name: String,
    pub description: String,
    pub comments: Vec<String>,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    /// Operation id as declared in the source
    pub id: String,
    pub method: Method,
    pub description: String,
    pub comments: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub responses: Vec<Response>,
    /// Event name -> callback paths
    pub callbacks: BTreeMap<String, Vec<PathItem>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub description: String,
    pub location: ParameterLocation,
    /// Set for body parameters and multi-representation parameters
    pub content_type: Option<String>,
    pub schema: Option<SchemaId>,
    pub serialization: Serialization,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub name: String,
    pub description: String,
    /// Status code, a wildcard class like `5xx`, or `default`
    pub code: String,
    pub content_type: Option<String>,
    pub schema: Option<SchemaId>,
}

// =============================================================================
// Tags
// =============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Path,
    Header,
    Cookie,
    Body,
}

impl ParameterLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Path => "path",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Body => "body",
        }
    }

    /// Style used when the source declares none
    pub fn default_style(self) -> SerializationStyle {
        match self {
            Self::Query | Self::Cookie => SerializationStyle::Form,
            Self::Path | Self::Header | Self::Body => SerializationStyle::Simple,
        }
    }
}

impl FromStr for ParameterLocation {
    type Err = String;

    /// Parses a declared location; `body` is synthesized, never declared
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(Self::Query),
            "path" => Ok(Self::Path),
            "header" => Ok(Self::Header),
            "cookie" => Ok(Self::Cookie),
            other => Err(format!("unknown parameter location {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SerializationStyle {
    Simple,
    Label,
    Matrix,
    Form,
    SpaceDelimited,
    PipeDelimited,
    DeepObject,
}

impl SerializationStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Label => "label",
            Self::Matrix => "matrix",
            Self::Form => "form",
            Self::SpaceDelimited => "spaceDelimited",
            Self::PipeDelimited => "pipeDelimited",
            Self::DeepObject => "deepObject",
        }
    }
}

impl FromStr for SerializationStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Self::Simple),
            "label" => Ok(Self::Label),
            "matrix" => Ok(Self::Matrix),
            "form" => Ok(Self::Form),
            "spaceDelimited" => Ok(Self::SpaceDelimited),
            "pipeDelimited" => Ok(Self::PipeDelimited),
            "deepObject" => Ok(Self::DeepObject),
            other => Err(format!("unknown serialization style {other:?}")),
        }
    }
}

/// How a parameter value is laid out on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Serialization {
    pub style: SerializationStyle,
    pub explode: bool,
}

impl Serialization {
    pub fn for_location(location: ParameterLocation) -> Self {
        let style = location.default_style();
        Self {
            style,
            explode: style == SerializationStyle::Form,
        }
    }
}

// =============================================================================
// Lookups
// =============================================================================

impl Spec {
    pub fn schema(&self, id: SchemaId) -> &SchemaNode {
        &self.arena[id]
    }

    /// Registry entry with the given name
    pub fn find_schema(&self, name: &str) -> Option<SchemaId> {
        find_in_registry(&self.arena, &self.schemas, name)
    }

    /// Every parameter and response schema root, callbacks included
    pub fn operation_schema_roots(&self) -> Vec<SchemaId> {
        let mut roots = Vec::new();
        collect_roots(&self.paths, &mut roots);
        roots
    }

    /// Every operation in path order, callbacks after their owner
    pub fn operations(&self) -> Vec<&Operation> {
        let mut ops = Vec::new();
        collect_operations(&self.paths, &mut ops);
        ops
    }
}

pub(crate) fn find_in_registry(arena: &SchemaArena, registry: &[SchemaId], name: &str) -> Option<SchemaId> {
    registry.iter().copied().find(|id| arena[*id].name == name)
}

pub(crate) fn collect_roots(paths: &[PathItem], roots: &mut Vec<SchemaId>) {
    for path in paths {
        for op in &path.operations {
            roots.extend(op.parameters.iter().filter_map(|p| p.schema));
            roots.extend(op.responses.iter().filter_map(|r| r.schema));
            for callback_paths in op.callbacks.values() {
                collect_roots(callback_paths, roots);
            }
        }
    }
}

fn collect_operations<'a>(paths: &'a [PathItem], ops: &mut Vec<&'a Operation>) {
    for path in paths {
        for op in &path.operations {
            ops.push(op);
            for callback_paths in op.callbacks.values() {
                collect_operations(callback_paths, ops);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_parse() {
        assert_eq!("cookie".parse::<ParameterLocation>(), Ok(ParameterLocation::Cookie));
        assert!("body".parse::<ParameterLocation>().is_err());
        assert!("matrix".parse::<ParameterLocation>().is_err());
    }

    #[test]
    fn test_default_serialization() {
        let query = Serialization::for_location(ParameterLocation::Query);
        assert_eq!(query.style, SerializationStyle::Form);
        assert!(query.explode);

        let path = Serialization::for_location(ParameterLocation::Path);
        assert_eq!(path.style, SerializationStyle::Simple);
        assert!(!path.explode);
    }

    #[test]
    fn test_style_parse() {
        assert_eq!("deepObject".parse::<SerializationStyle>(), Ok(SerializationStyle::DeepObject));
        assert!("deep-object".parse::<SerializationStyle>().is_err());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Patch.to_string(), "PATCH");
        assert_eq!(Method::Patch.as_str(), "patch");
    }
}
