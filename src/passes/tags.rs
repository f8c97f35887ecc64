//! Tag templating pass
//!
//! Renders the configured tag templates onto every schema node, bottom-up.
//! Named nodes met under an operation root are looked up in the registry and
//! the registry entry is tagged as well, so the metadata reaches the type that
//! is actually emitted.

use std::ops::ControlFlow;

use crate::error::Result;
use crate::ir::spec::collect_roots;
use crate::ir::{Order, SchemaArena, SchemaId, Spec, Tags};
use crate::template::TagTemplates;

pub fn apply_tags(spec: &mut Spec, tags: &Tags) -> Result<()> {
    let templates = TagTemplates::compile(tags)?;
    let Spec {
        arena,
        schemas,
        paths,
    } = spec;

    for root in schemas.iter().copied() {
        tag_tree(arena, root, &templates, None)?;
    }

    let mut roots = Vec::new();
    collect_roots(paths, &mut roots);
    for root in roots {
        let mut referenced = Vec::new();
        tag_tree(arena, root, &templates, Some(&mut referenced))?;
        for name in referenced {
            let entries: Vec<SchemaId> = schemas
                .iter()
                .copied()
                .filter(|id| arena[*id].name == name)
                .collect();
            for entry in entries {
                tag_tree(arena, entry, &templates, None)?;
            }
        }
    }
    Ok(())
}

fn tag_tree(
    arena: &mut SchemaArena,
    root: SchemaId,
    templates: &TagTemplates,
    mut referenced: Option<&mut Vec<String>>,
) -> Result<()> {
    arena.visit(root, Order::BottomUp, |arena, path| {
        if templates.is_empty() {
            return Ok(ControlFlow::Break(()));
        }
        let id = path.node();
        let rendered = templates.render_for(&arena[id])?;
        if let Some(names) = referenced.as_deref_mut() {
            if !arena[id].name.is_empty() {
                names.push(arena[id].name.clone());
            }
        }
        arena[id].tags = rendered;
        Ok(ControlFlow::Continue(()))
    })
}
