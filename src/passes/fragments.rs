//! Compound-Fragment Extraction Pass
//!
//! Every member of a creatable all-of composition becomes an independently
//! named registry entry. Unnamed members are named `<Parent>Fragment<i>`, or
//! `UnnamedFragment<n>` when the parent itself is anonymous.

use std::ops::ControlFlow;
use tracing::{debug, warn};

use super::RunContext;
use crate::error::Result;
use crate::ir::spec::{collect_roots, find_in_registry};
use crate::ir::{Order, SchemaArena, SchemaId, Spec, Variant};

/// Runs fragment extraction over the registry and every operation schema root
pub fn extract_fragments(spec: &mut Spec, ctx: &mut RunContext) -> Result<()> {
    let Spec {
        arena,
        schemas,
        paths,
    } = spec;

    let mut index = 0;
    while index < schemas.len() {
        let root = schemas[index];
        fragment_tree(arena, schemas, root, ctx)?;
        index += 1;
    }

    let mut roots = Vec::new();
    collect_roots(paths, &mut roots);
    for root in roots {
        fragment_tree(arena, schemas, root, ctx)?;
    }
    Ok(())
}

fn fragment_tree(
    arena: &mut SchemaArena,
    registry: &mut Vec<SchemaId>,
    root: SchemaId,
    ctx: &mut RunContext,
) -> Result<()> {
    arena.visit(root, Order::BottomUp, |arena, path| {
        let parent = path.node();
        let members = match &arena[parent].variant {
            Variant::AllOf { members } if arena[parent].create => members.clone(),
            _ => return Ok(ControlFlow::Continue(())),
        };
        let parent_name = arena[parent].name.clone();

        for (index, member) in members.into_iter().enumerate() {
            let node = &arena[member];
            if !node.name.is_empty() {
                let known = find_in_registry(arena, registry, &node.name).is_some();
                if known || node.is_reference() {
                    if !known {
                        warn!(name = %node.name, parent = %parent_name, "fragment references an undeclared schema");
                    }
                    arena[member].create = false;
                    continue;
                }
            } else {
                arena[member].name = if parent_name.is_empty() {
                    ctx.next_unnamed_fragment()
                } else {
                    format!("{parent_name}Fragment{index}")
                };
            }

            let name = arena[member].name.clone();
            if find_in_registry(arena, registry, &name).is_some() {
                arena[member].create = false;
                continue;
            }

            debug!(%name, parent = %parent_name, "extracting fragment");
            arena[member].create = true;
            let copy = arena.clone_subtree(member);
            arena[copy].comments.push(if parent_name.is_empty() {
                format!("{name} is a part of an unnamed composition.")
            } else {
                format!("{name} is a part of {parent_name}.")
            });
            registry.push(copy);
            arena[member].create = false;
        }
        Ok(ControlFlow::Continue(()))
    })
}
