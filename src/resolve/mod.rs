//! Raw-to-IR Resolver
//!
//! Turns a [`RawSchemaRef`] into arena nodes:
//! - name-only references become terminal [`Variant::Reference`] nodes
//! - overrides rename a node or forbid its generation
//! - a name already present in the ancestor chain closes a cycle: the node
//!   becomes a reference carrying the ancestor's index instead of expanding
//! - everything else dispatches on the shape tag

pub mod ingest;

use std::collections::BTreeMap;
use tracing::warn;

use crate::config::ResolverConfig;
use crate::error::{chain_context, IrError, Result};
use crate::ir::{ExtensionSlot, Primitive, SchemaArena, SchemaId, SchemaNode, Variant};
use crate::names::to_pascal_case;
use crate::overrides::{self, SchemaOverride};
use crate::raw::{RawAdditional, RawSchema, RawSchemaRef};

pub use ingest::ingest;

/// Resolves raw schema references into one arena
pub struct Resolver<'a> {
    arena: &'a mut SchemaArena,
    config: &'a ResolverConfig,
    /// Nodes currently being built, outermost first
    chain: Vec<SchemaId>,
}

impl<'a> Resolver<'a> {
    pub fn new(arena: &'a mut SchemaArena, config: &'a ResolverConfig) -> Self {
        Self {
            arena,
            config,
            chain: Vec::new(),
        }
    }

    /// Resolves `raw` below the given chain of in-progress ancestors
    pub fn resolve(&mut self, raw: Option<&RawSchemaRef>, ancestors: &[SchemaId]) -> Result<SchemaId> {
        let saved = std::mem::replace(&mut self.chain, ancestors.to_vec());
        let resolved = self.resolve_ref(raw, None);
        self.chain = saved;
        resolved
    }

    /// Resolves a top-level registry entry declared under `key`.
    ///
    /// An entry without a name of its own is named after its key and is
    /// creatable unless its override forbids it.
    pub fn resolve_root(&mut self, key: &str, raw: &RawSchemaRef) -> Result<SchemaId> {
        self.chain.clear();
        let Some(body) = raw.body.as_deref() else {
            return self.resolve_ref(Some(raw), Some(key));
        };

        let ov = self
            .override_for(body, &self.context(raw.name().unwrap_or(key)))
            .unwrap_or_default();
        let has_own_name = raw.name().is_some() || ov.replacement_name().is_some();
        let create = ov.create;
        let id = self.resolve_body(raw, body, ov, Some(key))?;
        if !has_own_name {
            self.arena[id].create = create != Some(false);
        }
        Ok(id)
    }

    fn context(&self, name: &str) -> String {
        chain_context(
            self.chain
                .iter()
                .map(|id| self.arena[*id].name.as_str())
                .chain(std::iter::once(name)),
        )
    }

    fn override_for(&self, body: &RawSchema, context: &str) -> Option<SchemaOverride> {
        overrides::lookup(&body.extensions, &self.config.extension_name, context)
    }

    fn resolve_ref(&mut self, raw: Option<&RawSchemaRef>, fallback_name: Option<&str>) -> Result<SchemaId> {
        let raw = raw.ok_or_else(|| IrError::missing("schema", self.context("")))?;

        let Some(body) = raw.body.as_deref() else {
            return match raw.name() {
                Some(name) => Ok(self.arena.alloc(SchemaNode::reference(name))),
                None => Err(IrError::missing("schema body", self.context(""))),
            };
        };

        let ov = self
            .override_for(body, &self.context(raw.name().unwrap_or_default()))
            .unwrap_or_default();
        self.resolve_body(raw, body, ov, fallback_name)
    }

    /// Builds the node for an inline body whose override is already decoded
    fn resolve_body(
        &mut self,
        raw: &RawSchemaRef,
        body: &RawSchema,
        ov: SchemaOverride,
        fallback_name: Option<&str>,
    ) -> Result<SchemaId> {
        let mut node = SchemaNode::new(Variant::Any);
        if let Some(name) = raw.name() {
            node.name = name.to_string();
            node.original_name = name.to_string();
        }
        node.description = body.description.clone().unwrap_or_default();

        if let Some(replacement) = ov.replacement_name() {
            node.name = replacement.to_string();
        }
        match ov.create {
            Some(true) => node.create = true,
            Some(false) if !node.name.is_empty() => {
                node.variant = if ov.can_be_nil {
                    Variant::Any
                } else {
                    Variant::Reference { target: None }
                };
                node.override_tags = ov.tags.clone();
                node.tags = ov.tags;
                node.nullable = body.nullable;
                return Ok(self.arena.alloc(node));
            }
            _ => {}
        }

        if node.name.is_empty() {
            if let Some(key) = fallback_name {
                node.name = key.to_string();
                node.original_name = key.to_string();
            }
        }

        if let Some(ancestor) = self.cycle_ancestor(&node.name) {
            return Ok(self.reference_to(ancestor));
        }

        node.override_tags = ov.tags.clone();
        node.tags = ov.tags;
        node.nullable = body.nullable;
        node.enum_values = body.enum_values.clone();

        let id = self.arena.alloc(node);
        self.chain.push(id);
        let variant = self.dispatch(id, body);
        self.chain.pop();
        self.arena[id].variant = variant?;
        Ok(id)
    }

    fn cycle_ancestor(&self, name: &str) -> Option<SchemaId> {
        if name.is_empty() {
            return None;
        }
        self.chain.iter().copied().find(|id| self.arena[*id].name == name)
    }

    /// Terminal node standing in for an in-progress ancestor
    fn reference_to(&mut self, ancestor: SchemaId) -> SchemaId {
        let source = &self.arena[ancestor];
        let mut node = SchemaNode::new(Variant::Reference {
            target: Some(ancestor),
        });
        node.name = source.name.clone();
        node.original_name = source.original_name.clone();
        node.description = source.description.clone();
        node.nullable = source.nullable;
        node.tags = source.tags.clone();
        node.override_tags = source.override_tags.clone();
        self.arena.alloc(node)
    }

    fn dispatch(&mut self, id: SchemaId, body: &RawSchema) -> Result<Variant> {
        if !body.all_of.is_empty() {
            return Ok(Variant::AllOf {
                members: self.resolve_all(&body.all_of)?,
            });
        }
        if !body.any_of.is_empty() {
            return Ok(Variant::AnyOf {
                members: self.resolve_all(&body.any_of)?,
            });
        }
        if !body.one_of.is_empty() {
            return Ok(Variant::OneOf {
                members: self.resolve_all(&body.one_of)?,
            });
        }

        let kind = body.kind.as_deref().map(str::trim).unwrap_or_default();
        let format = body.format.as_deref().unwrap_or_default();
        let variant = match kind {
            "" => Variant::Any,
            "object" => self.resolve_object(body)?,
            "array" => {
                let name = self.arena[id].name.clone();
                let items = body
                    .items
                    .as_ref()
                    .ok_or_else(|| IrError::missing("items", self.context(&name)))?;
                Variant::Array {
                    items: self.resolve_ref(Some(items), None)?,
                }
            }
            "string" => match format {
                "date" | "date-time" => primitive(Primitive::Timestamp),
                "byte" | "binary" => Variant::Array {
                    items: self.arena.alloc(SchemaNode::primitive(Primitive::Byte)),
                },
                _ => primitive(Primitive::String),
            },
            "number" => match format {
                "float" => primitive(Primitive::Float32),
                _ => primitive(Primitive::Float64),
            },
            "integer" => match format {
                "int32" => primitive(Primitive::Int32),
                "int64" => primitive(Primitive::Int64),
                _ => primitive(Primitive::Int),
            },
            "boolean" => primitive(Primitive::Bool),
            other => {
                // The node itself is on the chain, so the context ends at it.
                return Err(IrError::UnrecognizedShape {
                    shape: other.to_string(),
                    context: chain_context(self.chain.iter().map(|id| self.arena[*id].name.as_str())),
                });
            }
        };
        Ok(variant)
    }

    fn resolve_all(&mut self, members: &[RawSchemaRef]) -> Result<Vec<SchemaId>> {
        members.iter().map(|m| self.resolve_ref(Some(m), None)).collect()
    }

    fn resolve_object(&mut self, body: &RawSchema) -> Result<Variant> {
        let mut fields = BTreeMap::new();
        for (property, raw) in &body.properties {
            let child = self.resolve_ref(Some(raw), None)?;
            let node = &mut self.arena[child];
            node.field_name = property.clone();
            // Optional properties are modelled as nullable.
            if !body.required.contains(property) && !node.can_be_absent() {
                node.nullable = true;
            }

            let mut key = to_pascal_case(property);
            if key.is_empty() || fields.contains_key(&key) {
                warn!(%property, %key, "property key collides after casing, keeping raw name");
                key = property.clone();
            }
            fields.insert(key, child);
        }

        let extension = match &body.additional_properties {
            Some(RawAdditional::Allowed(true)) => Some(self.arena.alloc(SchemaNode::new(Variant::Any))),
            Some(RawAdditional::Schema(raw)) => Some(self.resolve_ref(Some(raw), None)?),
            Some(RawAdditional::Allowed(false)) | None => None,
        };

        Ok(match extension {
            Some(value) if fields.is_empty() => Variant::Map {
                key: self.arena.alloc(SchemaNode::primitive(Primitive::String)),
                value,
            },
            Some(schema) => Variant::Struct {
                fields,
                extension: Some(ExtensionSlot {
                    field_name: self.config.additional_properties_name.clone(),
                    schema,
                }),
            },
            None => Variant::Struct {
                fields,
                extension: None,
            },
        })
    }
}

fn primitive(primitive: Primitive) -> Variant {
    Variant::Primitive { primitive }
}
