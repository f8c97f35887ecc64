//! Reference Graph Analysis
//!
//! Builds a graph of name references between finished registry entries and
//! computes strongly connected components, so emitters know which types are
//! recursive and need indirection.

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::ir::{SchemaArena, SchemaId, Spec, Variant};

// =============================================================================
// Field Path Segment
// =============================================================================

/// One step from a registry entry towards a referencing node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldPathSegment {
    /// A named struct field
    Field(String),
    /// The extension slot of a struct
    Extension,
    MapKey,
    MapValue,
    ArrayItems,
    AllOf(usize),
    AnyOf(usize),
    OneOf(usize),
}

impl fmt::Display for FieldPathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, ".{}", name),
            Self::Extension => write!(f, ".*"),
            Self::MapKey => write!(f, "[key]"),
            Self::MapValue => write!(f, "[*]"),
            Self::ArrayItems => write!(f, "[]"),
            Self::AllOf(i) => write!(f, "<allOf:{}>", i),
            Self::AnyOf(i) => write!(f, "<anyOf:{}>", i),
            Self::OneOf(i) => write!(f, "<oneOf:{}>", i),
        }
    }
}

pub type FieldPath = Vec<FieldPathSegment>;

pub fn format_field_path(path: &FieldPath) -> String {
    if path.is_empty() {
        return String::from("<root>");
    }
    path.iter().map(|s| s.to_string()).collect::<String>()
}

/// A reference from one registry entry to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEdge {
    pub from: String,
    pub to: String,
    pub field_path: FieldPath,
}

// =============================================================================
// Reference Graph
// =============================================================================

pub struct ReferenceGraph {
    graph: DiGraph<String, FieldPath>,
    index: HashMap<String, NodeIndex>,
}

impl ReferenceGraph {
    pub fn build(spec: &Spec) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for id in &spec.schemas {
            let name = spec.schema(*id).name.clone();
            index.entry(name.clone()).or_insert_with(|| graph.add_node(name));
        }

        for root in &spec.schemas {
            let from = index[&spec.schema(*root).name];
            let mut found = Vec::new();
            let mut path = Vec::new();
            for (segment, child) in child_segments(&spec.arena, *root) {
                path.push(segment);
                collect_references(&spec.arena, child, &mut path, &mut found);
                path.pop();
            }
            for (name, field_path) in found {
                if let Some(to) = index.get(&name) {
                    graph.add_edge(from, *to, field_path);
                }
            }
        }

        Self { graph, index }
    }

    pub fn schema_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn edges(&self) -> Vec<ReferenceEdge> {
        self.graph
            .edge_references()
            .map(|edge| ReferenceEdge {
                from: self.graph[edge.source()].clone(),
                to: self.graph[edge.target()].clone(),
                field_path: edge.weight().clone(),
            })
            .collect()
    }

    /// Groups of mutually recursive schemas, including self-recursive ones.
    /// Members and groups are sorted by name.
    pub fn recursive_groups(&self) -> Vec<Vec<String>> {
        let mut groups: Vec<Vec<String>> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut members: Vec<String> = scc.iter().map(|ix| self.graph[*ix].clone()).collect();
                members.sort();
                members
            })
            .collect();
        groups.sort();
        groups
    }

    pub fn is_recursive(&self, name: &str) -> bool {
        self.recursive_groups().iter().any(|group| group.iter().any(|m| m == name))
    }

    /// Export as a Graphviz DOT graph
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph schemas {\n    rankdir=LR;\n");
        let mut names: Vec<&String> = self.index.keys().collect();
        names.sort();
        for name in names {
            out.push_str(&format!("    \"{}\";\n", name));
        }
        let mut edges = self.edges();
        edges.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));
        for edge in edges {
            out.push_str(&format!(
                "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
                edge.from,
                edge.to,
                format_field_path(&edge.field_path)
            ));
        }
        out.push_str("}\n");
        out
    }
}

fn child_segments(arena: &SchemaArena, id: SchemaId) -> Vec<(FieldPathSegment, SchemaId)> {
    match &arena[id].variant {
        Variant::Reference { .. } | Variant::Primitive { .. } | Variant::Any => Vec::new(),
        Variant::Array { items } => vec![(FieldPathSegment::ArrayItems, *items)],
        Variant::Map { key, value } => vec![
            (FieldPathSegment::MapKey, *key),
            (FieldPathSegment::MapValue, *value),
        ],
        Variant::Struct { fields, extension } => extension
            .iter()
            .map(|slot| (FieldPathSegment::Extension, slot.schema))
            .chain(fields.iter().map(|(k, v)| (FieldPathSegment::Field(k.clone()), *v)))
            .collect(),
        Variant::AllOf { members } => indexed(members, FieldPathSegment::AllOf),
        Variant::AnyOf { members } => indexed(members, FieldPathSegment::AnyOf),
        Variant::OneOf { members } => indexed(members, FieldPathSegment::OneOf),
    }
}

fn indexed(members: &[SchemaId], segment: fn(usize) -> FieldPathSegment) -> Vec<(FieldPathSegment, SchemaId)> {
    members.iter().enumerate().map(|(i, id)| (segment(i), *id)).collect()
}

/// Records the first named node on every branch; named nodes are references
/// to their registry entry and are not descended into.
fn collect_references(
    arena: &SchemaArena,
    id: SchemaId,
    path: &mut FieldPath,
    found: &mut Vec<(String, FieldPath)>,
) {
    let node = &arena[id];
    if !node.name.is_empty() {
        found.push((node.name.clone(), path.clone()));
        return;
    }
    for (segment, child) in child_segments(arena, id) {
        path.push(segment);
        collect_references(arena, child, path, found);
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::Engine;
    use crate::raw::RawSpec;
    use serde_json::json;

    fn run(value: serde_json::Value) -> Spec {
        let raw: RawSpec = serde_json::from_value(value).unwrap();
        Engine::default().run(&raw).unwrap()
    }

    #[test]
    fn test_self_reference_is_recursive() {
        let spec = run(json!({
            "schemas": {
                "Node": {"type": "object", "properties": {
                    "children": {"type": "array", "items": {"$ref": "#/components/schemas/Node"}}
                }},
                "Leaf": {"type": "string"}
            }
        }));
        let graph = ReferenceGraph::build(&spec);
        assert_eq!(graph.schema_count(), 2);
        assert_eq!(graph.recursive_groups(), vec![vec!["Node".to_string()]]);
        assert!(!graph.is_recursive("Leaf"));

        let edges = graph.edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(format_field_path(&edges[0].field_path), ".Children[]");
    }

    #[test]
    fn test_mutual_recursion_forms_one_group() {
        let spec = run(json!({
            "schemas": {
                "A": {"type": "object", "properties": {"b": {"$ref": "#/components/schemas/B"}}},
                "B": {"type": "object", "properties": {"a": {"$ref": "#/components/schemas/A"}}},
                "C": {"type": "object", "properties": {"a": {"$ref": "#/components/schemas/A"}}}
            }
        }));
        let graph = ReferenceGraph::build(&spec);
        assert_eq!(graph.recursive_groups(), vec![vec!["A".to_string(), "B".to_string()]]);
        assert!(!graph.is_recursive("C"));
    }

    #[test]
    fn test_dot_export() {
        let spec = run(json!({
            "schemas": {
                "A": {"type": "object", "properties": {"b": {"$ref": "#/components/schemas/B"}}},
                "B": {"type": "string"}
            }
        }));
        let dot = ReferenceGraph::build(&spec).to_dot();
        assert!(dot.starts_with("digraph schemas {"));
        assert!(dot.contains("\"A\" -> \"B\" [label=\".B\"];"));
    }
}
