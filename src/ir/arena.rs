//! Append-only node arena

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::node::{ExtensionSlot, SchemaId, SchemaNode, Variant};

/// Owns every [`SchemaNode`] of one run; nodes are addressed by [`SchemaId`].
///
/// Nodes are never removed. A node replaced by a rewrite stays allocated but
/// becomes unreachable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaArena {
    nodes: Vec<SchemaNode>,
}

impl SchemaArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: SchemaNode) -> SchemaId {
        let id = SchemaId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: SchemaId) -> Option<&SchemaNode> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: SchemaId) -> Option<&mut SchemaNode> {
        self.nodes.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Copies the subtree rooted at `root` into fresh nodes.
    ///
    /// Cycle references pointing inside the copied subtree are remapped to the
    /// copy; references pointing outside keep their target.
    pub fn clone_subtree(&mut self, root: SchemaId) -> SchemaId {
        let mut remap = HashMap::new();
        let copy = self.copy_node(root, &mut remap);
        self.retarget(copy, &remap);
        copy
    }

    fn copy_node(&mut self, id: SchemaId, remap: &mut HashMap<SchemaId, SchemaId>) -> SchemaId {
        let original = self[id].clone();
        let variant = match &original.variant {
            Variant::Reference { target } => Variant::Reference { target: *target },
            Variant::Primitive { primitive } => Variant::Primitive {
                primitive: *primitive,
            },
            Variant::Any => Variant::Any,
            Variant::Array { items } => Variant::Array {
                items: self.copy_node(*items, remap),
            },
            Variant::Map { key, value } => Variant::Map {
                key: self.copy_node(*key, remap),
                value: self.copy_node(*value, remap),
            },
            Variant::Struct { fields, extension } => Variant::Struct {
                extension: extension.as_ref().map(|slot| ExtensionSlot {
                    field_name: slot.field_name.clone(),
                    schema: self.copy_node(slot.schema, remap),
                }),
                fields: fields
                    .iter()
                    .map(|(key, child)| (key.clone(), self.copy_node(*child, remap)))
                    .collect(),
            },
            Variant::AllOf { members } => Variant::AllOf {
                members: self.copy_all(members, remap),
            },
            Variant::AnyOf { members } => Variant::AnyOf {
                members: self.copy_all(members, remap),
            },
            Variant::OneOf { members } => Variant::OneOf {
                members: self.copy_all(members, remap),
            },
        };
        let copy = self.alloc(SchemaNode { variant, ..original });
        remap.insert(id, copy);
        copy
    }

    fn copy_all(&mut self, ids: &[SchemaId], remap: &mut HashMap<SchemaId, SchemaId>) -> Vec<SchemaId> {
        ids.iter().map(|id| self.copy_node(*id, remap)).collect()
    }

    fn retarget(&mut self, root: SchemaId, remap: &HashMap<SchemaId, SchemaId>) {
        let ids: Vec<SchemaId> = self.walk(root, super::Order::TopDown).map(|p| p.node()).collect();
        for id in ids {
            if let Variant::Reference { target: Some(target) } = &mut self[id].variant {
                if let Some(copied) = remap.get(target) {
                    *target = *copied;
                }
            }
        }
    }
}

impl Index<SchemaId> for SchemaArena {
    type Output = SchemaNode;

    fn index(&self, id: SchemaId) -> &SchemaNode {
        &self.nodes[id.index()]
    }
}

impl IndexMut<SchemaId> for SchemaArena {
    fn index_mut(&mut self, id: SchemaId) -> &mut SchemaNode {
        &mut self.nodes[id.index()]
    }
}
