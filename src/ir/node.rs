//! Schema Node Model
//!
//! One tagged node type covers every structural shape a schema can take:
//! - Scalars (`Primitive`) and unconstrained values (`Any`)
//! - Collections (`Array`, `Map`) and records (`Struct`)
//! - Compositions (`AllOf`, `AnyOf`, `OneOf`)
//! - Terminal name-only references (`Reference`)
//!
//! Children are stored as [`SchemaId`] indices into a [`super::SchemaArena`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metadata directives: key -> ordered values
pub type Tags = BTreeMap<String, Vec<String>>;

// =============================================================================
// Schema Id
// =============================================================================

/// Dense index of a node inside its arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchemaId(pub(crate) u32);

impl SchemaId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Primitive
// =============================================================================

/// Scalar type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    /// Integer without a width hint
    Int,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    /// Element of a byte sequence (`Array(Byte)`)
    Byte,
    Timestamp,
}

impl Primitive {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Variant
// =============================================================================

/// Open-ended extension slot of a struct (additional properties)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionSlot {
    /// Reserved field name the slot is emitted under
    pub field_name: String,
    /// Schema of every additional value
    pub schema: SchemaId,
}

/// Structural shape of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Variant {
    /// Terminal reference to a type declared elsewhere, by name.
    /// `target` is set when the reference closes a cycle onto an ancestor.
    Reference { target: Option<SchemaId> },
    Primitive { primitive: Primitive },
    Any,
    Array { items: SchemaId },
    Map { key: SchemaId, value: SchemaId },
    Struct {
        fields: BTreeMap<String, SchemaId>,
        extension: Option<ExtensionSlot>,
    },
    AllOf { members: Vec<SchemaId> },
    AnyOf { members: Vec<SchemaId> },
    OneOf { members: Vec<SchemaId> },
}

impl Variant {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Reference { .. } => "reference",
            Self::Primitive { .. } => "primitive",
            Self::Any => "any",
            Self::Array { .. } => "array",
            Self::Map { .. } => "map",
            Self::Struct { .. } => "struct",
            Self::AllOf { .. } => "allOf",
            Self::AnyOf { .. } => "anyOf",
            Self::OneOf { .. } => "oneOf",
        }
    }

    /// Children in walk order: extension slot first, then main children.
    /// Reference targets are not children.
    pub fn children(&self) -> Vec<SchemaId> {
        match self {
            Self::Reference { .. } | Self::Primitive { .. } | Self::Any => Vec::new(),
            Self::Array { items } => vec![*items],
            Self::Map { key, value } => vec![*key, *value],
            Self::Struct { fields, extension } => extension
                .iter()
                .map(|slot| slot.schema)
                .chain(fields.values().copied())
                .collect(),
            Self::AllOf { members } | Self::AnyOf { members } | Self::OneOf { members } => {
                members.clone()
            }
        }
    }
}

// =============================================================================
// Schema Node
// =============================================================================

/// A resolved schema: one type definition or type use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Type identifier, empty if anonymous
    pub name: String,
    /// Name as it appeared in the source
    pub original_name: String,
    /// Property this node sits in, if any
    pub field_name: String,
    pub description: String,
    pub comments: Vec<String>,
    pub nullable: bool,
    /// Emit as a standalone type rather than inline
    pub create: bool,
    /// Rendered tags
    pub tags: Tags,
    /// Tag templates from the node's override, rendered into `tags`
    #[serde(default)]
    pub override_tags: Tags,
    /// Literal values of an enumeration
    pub enum_values: Vec<serde_json::Value>,
    pub variant: Variant,
}

impl SchemaNode {
    pub fn new(variant: Variant) -> Self {
        Self {
            name: String::new(),
            original_name: String::new(),
            field_name: String::new(),
            description: String::new(),
            comments: Vec::new(),
            nullable: false,
            create: false,
            tags: Tags::new(),
            override_tags: Tags::new(),
            enum_values: Vec::new(),
            variant,
        }
    }

    pub fn primitive(primitive: Primitive) -> Self {
        Self::new(Variant::Primitive { primitive })
    }

    /// Name-only reference to a type declared elsewhere
    pub fn reference(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut node = Self::new(Variant::Reference { target: None });
        node.original_name = name.clone();
        node.name = name;
        node
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.variant, Variant::Reference { .. })
    }

    /// Whether the variant already has an empty/absent representation
    pub fn can_be_absent(&self) -> bool {
        match self.variant {
            Variant::Map { .. }
            | Variant::Array { .. }
            | Variant::AnyOf { .. }
            | Variant::OneOf { .. }
            | Variant::Any => true,
            Variant::Reference { .. }
            | Variant::Primitive { .. }
            | Variant::Struct { .. }
            | Variant::AllOf { .. } => false,
        }
    }

    /// Whether emitters need a separate nullable wrapper for this node
    pub fn needs_nullable_wrapper(&self) -> bool {
        self.nullable && !self.can_be_absent()
    }

    pub fn children(&self) -> Vec<SchemaId> {
        self.variant.children()
    }

    /// Name used as the field name in tag templates
    pub fn template_field_name(&self) -> &str {
        if self.field_name.is_empty() {
            &self.original_name
        } else {
            &self.field_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_be_absent() {
        let any = SchemaNode::new(Variant::Any);
        let prim = SchemaNode::primitive(Primitive::String);
        let array = SchemaNode::new(Variant::Array { items: SchemaId(0) });
        let strukt = SchemaNode::new(Variant::Struct {
            fields: BTreeMap::new(),
            extension: None,
        });
        assert!(any.can_be_absent());
        assert!(array.can_be_absent());
        assert!(!prim.can_be_absent());
        assert!(!strukt.can_be_absent());
    }

    #[test]
    fn test_nullable_wrapper() {
        let mut prim = SchemaNode::primitive(Primitive::Int64);
        prim.nullable = true;
        assert!(prim.needs_nullable_wrapper());

        let mut one_of = SchemaNode::new(Variant::OneOf { members: vec![] });
        one_of.nullable = true;
        assert!(!one_of.needs_nullable_wrapper());
    }

    #[test]
    fn test_struct_children_put_extension_first() {
        let mut fields = BTreeMap::new();
        fields.insert("Id".to_string(), SchemaId(1));
        fields.insert("Name".to_string(), SchemaId(2));
        let variant = Variant::Struct {
            fields,
            extension: Some(ExtensionSlot {
                field_name: "AdditionalProperties".to_string(),
                schema: SchemaId(3),
            }),
        };
        assert_eq!(variant.children(), vec![SchemaId(3), SchemaId(1), SchemaId(2)]);
    }

    #[test]
    fn test_reference_has_no_children() {
        let node = SchemaNode::new(Variant::Reference {
            target: Some(SchemaId(0)),
        });
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_template_field_name_falls_back() {
        let mut node = SchemaNode::reference("Pet");
        assert_eq!(node.template_field_name(), "Pet");
        node.field_name = "pet".to_string();
        assert_eq!(node.template_field_name(), "pet");
    }
}
