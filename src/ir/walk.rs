//! Walker over a schema tree
//!
//! Yields every node reachable from a root exactly once, each paired with its
//! full ancestor chain. Reference targets are never followed, so the walk is
//! finite even for trees that close cycles.

use std::ops::ControlFlow;

use super::arena::SchemaArena;
use super::node::SchemaId;
use crate::error::Result;

/// Traversal order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Parents before children
    TopDown,
    /// Every node after all of its descendants
    BottomUp,
}

/// Chain from the walk root to the visited node (inclusive)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaPath(Vec<SchemaId>);

impl SchemaPath {
    /// The visited node
    pub fn node(&self) -> SchemaId {
        // Paths are built from a root and only ever extended.
        self.0[self.0.len() - 1]
    }

    pub fn root(&self) -> SchemaId {
        self.0[0]
    }

    /// Direct parent of the visited node
    pub fn parent(&self) -> Option<SchemaId> {
        self.ancestors().last().copied()
    }

    /// Everything above the visited node, root first
    pub fn ancestors(&self) -> &[SchemaId] {
        &self.0[..self.0.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    fn child(&self, id: SchemaId) -> Self {
        let mut chain = Vec::with_capacity(self.0.len() + 1);
        chain.extend_from_slice(&self.0);
        chain.push(id);
        Self(chain)
    }
}

/// Lazy walk iterator returned by [`SchemaArena::walk`]
pub struct Walk<'a> {
    inner: WalkInner<'a>,
}

enum WalkInner<'a> {
    TopDown {
        arena: &'a SchemaArena,
        stack: Vec<SchemaPath>,
    },
    BottomUp(std::iter::Rev<std::vec::IntoIter<SchemaPath>>),
}

impl Iterator for Walk<'_> {
    type Item = SchemaPath;

    fn next(&mut self) -> Option<SchemaPath> {
        match &mut self.inner {
            WalkInner::TopDown { arena, stack } => {
                let path = stack.pop()?;
                let children = arena[path.node()].children();
                stack.extend(children.into_iter().rev().map(|child| path.child(child)));
                Some(path)
            }
            WalkInner::BottomUp(paths) => paths.next(),
        }
    }
}

impl SchemaArena {
    /// Walks the tree under `root` in the given order
    pub fn walk(&self, root: SchemaId, order: Order) -> Walk<'_> {
        let top_down = WalkInner::TopDown {
            arena: self,
            stack: vec![SchemaPath(vec![root])],
        };
        let inner = match order {
            Order::TopDown => top_down,
            Order::BottomUp => {
                let paths: Vec<SchemaPath> = Walk { inner: top_down }.collect();
                WalkInner::BottomUp(paths.into_iter().rev())
            }
        };
        Walk { inner }
    }

    /// Walks `root` and hands each path to `visit` with mutable access to the
    /// arena. Paths are collected before the first callback, so rewrites never
    /// change which nodes are visited. Returning `ControlFlow::Break` stops
    /// the walk without error.
    pub fn visit<F>(&mut self, root: SchemaId, order: Order, mut visit: F) -> Result<()>
    where
        F: FnMut(&mut SchemaArena, &SchemaPath) -> Result<ControlFlow<()>>,
    {
        let paths: Vec<SchemaPath> = self.walk(root, order).collect();
        for path in &paths {
            if visit(self, path)?.is_break() {
                break;
            }
        }
        Ok(())
    }
}
