//! Deterministic ordering
//!
//! Sorts paths, operations, parameters, responses and callback paths by name.
//! The registry keeps its insertion order. Sorting is stable, so entries that
//! share a name keep their relative order.

use crate::ir::{PathItem, Spec};

pub fn order_resources(spec: &mut Spec) {
    sort_paths(&mut spec.paths);
}

fn sort_paths(paths: &mut [PathItem]) {
    paths.sort_by(|a, b| a.name.cmp(&b.name));
    for path in paths {
        path.operations.sort_by(|a, b| a.name.cmp(&b.name));
        for op in &mut path.operations {
            op.parameters.sort_by(|a, b| a.name.cmp(&b.name));
            op.responses.sort_by(|a, b| a.name.cmp(&b.name));
            for callback_paths in op.callbacks.values_mut() {
                sort_paths(callback_paths);
            }
        }
    }
}
