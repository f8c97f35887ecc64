//! Raw Input Contract
//!
//! What a format decoder hands the engine: raw schema references and raw
//! path/operation records. The shapes deserialize from an OpenAPI-flavoured
//! JSON document so decoders (and tests) can produce them with serde.
//!
//! A raw schema reference is one of:
//! - name-only: `{"$ref": "#/components/schemas/Pet"}`
//! - inline body: `{"type": "object", ...}`
//! - named inline body: `{"$ref": "...", "type": "object", ...}`, for decoders
//!   that inline resolved references

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::ir::Method;

/// Metadata bag: every key of a raw record the engine does not interpret
pub type Extensions = BTreeMap<String, Value>;

// =============================================================================
// Schemas
// =============================================================================

/// A raw reference to a schema: a pointer, a body, or both
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSchemaRef {
    /// Reference pointer; its last `/` segment is the type name
    pub reference: Option<String>,
    pub body: Option<Box<RawSchema>>,
}

impl RawSchemaRef {
    /// Name-only reference
    pub fn named(pointer: impl Into<String>) -> Self {
        Self {
            reference: Some(pointer.into()),
            body: None,
        }
    }

    pub fn inline(body: RawSchema) -> Self {
        Self {
            reference: None,
            body: Some(Box::new(body)),
        }
    }

    /// Named reference with its body already inlined
    pub fn named_inline(pointer: impl Into<String>, body: RawSchema) -> Self {
        Self {
            reference: Some(pointer.into()),
            body: Some(Box::new(body)),
        }
    }

    /// Type name carried by the reference pointer
    pub fn name(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .map(|pointer| pointer.rsplit('/').next().unwrap_or(pointer))
            .filter(|name| !name.is_empty())
    }
}

impl<'de> Deserialize<'de> for RawSchemaRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = serde_json::Map::deserialize(deserializer)?;
        let reference = match map.remove("$ref") {
            None => None,
            Some(Value::String(pointer)) => Some(pointer),
            Some(other) => {
                return Err(de::Error::custom(format!("$ref must be a string, got {other}")))
            }
        };
        let body = if map.is_empty() && reference.is_some() {
            None
        } else {
            let body: RawSchema =
                serde_json::from_value(Value::Object(map)).map_err(de::Error::custom)?;
            Some(Box::new(body))
        };
        Ok(Self { reference, body })
    }
}

/// An inline schema body
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSchema {
    /// Shape tag: object, array, string, number, integer, boolean
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(rename = "enum", default)]
    pub enum_values: Vec<Value>,
    #[serde(default)]
    pub properties: BTreeMap<String, RawSchemaRef>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub items: Option<RawSchemaRef>,
    #[serde(default)]
    pub additional_properties: Option<RawAdditional>,
    #[serde(default)]
    pub all_of: Vec<RawSchemaRef>,
    #[serde(default)]
    pub any_of: Vec<RawSchemaRef>,
    #[serde(default)]
    pub one_of: Vec<RawSchemaRef>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl RawSchema {
    pub fn of_kind(kind: &str) -> Self {
        Self {
            kind: Some(kind.to_string()),
            ..Self::default()
        }
    }
}

/// `additionalProperties`: a flag or a schema
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAdditional {
    Allowed(bool),
    Schema(Box<RawSchemaRef>),
}

// =============================================================================
// Paths
// =============================================================================

/// Everything the decoder found in one document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSpec {
    /// Declared top-level schemas
    #[serde(default)]
    pub schemas: BTreeMap<String, RawSchemaRef>,
    /// Route template -> path item
    #[serde(default)]
    pub paths: BTreeMap<String, RawPathItem>,
}

impl RawSpec {
    pub fn from_json(content: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPathItem {
    #[serde(default)]
    pub description: Option<String>,
    /// Parameters shared by every operation of the path
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    #[serde(default)]
    pub get: Option<RawOperation>,
    #[serde(default)]
    pub put: Option<RawOperation>,
    #[serde(default)]
    pub post: Option<RawOperation>,
    #[serde(default)]
    pub delete: Option<RawOperation>,
    #[serde(default)]
    pub options: Option<RawOperation>,
    #[serde(default)]
    pub head: Option<RawOperation>,
    #[serde(default)]
    pub patch: Option<RawOperation>,
    #[serde(default)]
    pub trace: Option<RawOperation>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl RawPathItem {
    pub fn operation(&self, method: Method) -> Option<&RawOperation> {
        match method {
            Method::Get => self.get.as_ref(),
            Method::Put => self.put.as_ref(),
            Method::Post => self.post.as_ref(),
            Method::Delete => self.delete.as_ref(),
            Method::Options => self.options.as_ref(),
            Method::Head => self.head.as_ref(),
            Method::Patch => self.patch.as_ref(),
            Method::Trace => self.trace.as_ref(),
        }
    }

    /// Declared operations in method order
    pub fn operations(&self) -> impl Iterator<Item = (Method, &RawOperation)> {
        Method::ALL
            .into_iter()
            .filter_map(move |method| self.operation(method).map(|op| (method, op)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperation {
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    #[serde(default)]
    pub request_body: Option<RawRequestBody>,
    /// Status code -> response
    #[serde(default)]
    pub responses: BTreeMap<String, RawResponse>,
    /// Event name -> route -> path item
    #[serde(default)]
    pub callbacks: BTreeMap<String, BTreeMap<String, RawPathItem>>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawParameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub explode: Option<bool>,
    #[serde(default)]
    pub schema: Option<RawSchemaRef>,
    /// Content type -> media type
    #[serde(default)]
    pub content: BTreeMap<String, RawMediaType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRequestBody {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: BTreeMap<String, RawMediaType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: BTreeMap<String, RawMediaType>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMediaType {
    #[serde(default)]
    pub schema: Option<RawSchemaRef>,
}
