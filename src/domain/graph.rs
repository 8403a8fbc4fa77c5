//! The domain graph: entity kinds as nodes, navigable relations as edges.
//!
//! Built once from [`EDGES`](super::edges::EDGES) and never mutated;
//! planners keep their own visited sets.

use std::collections::HashMap;
use std::sync::LazyLock;

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use super::edges::{Edge, EDGES};
use super::entity::InternalEntityType;

static SCHEMA: LazyLock<DomainSchema> = LazyLock::new(|| DomainSchema::from_edges(EDGES));

/// Immutable directed graph of the test-management domain.
#[derive(Debug)]
pub struct DomainSchema {
    graph: DiGraph<InternalEntityType, Edge>,
    node_indices: HashMap<InternalEntityType, NodeIndex>,
}

impl DomainSchema {
    /// The process-wide schema.
    pub fn global() -> &'static DomainSchema {
        &SCHEMA
    }

    /// Build a schema from an edge table. Every entity kind becomes a node,
    /// connected or not.
    pub fn from_edges(edges: &[Edge]) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for entity in InternalEntityType::ALL {
            node_indices.insert(entity, graph.add_node(entity));
        }

        for edge in edges {
            let src = node_indices[&edge.src];
            let dest = node_indices[&edge.dest];
            graph.add_edge(src, dest, *edge);
        }

        Self {
            graph,
            node_indices,
        }
    }

    /// Outgoing edges of an entity, ordered by destination.
    ///
    /// petgraph yields adjacency in reverse insertion order; sorting keeps
    /// plans (and the SQL built from them) stable.
    pub fn outgoing(&self, entity: InternalEntityType) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .graph
            .edges_directed(self.node_indices[&entity], Direction::Outgoing)
            .map(|edge_ref| *edge_ref.weight())
            .collect();
        edges.sort_by_key(|e| e.dest);
        edges
    }

    /// The edge navigating from `src` to `dest`, if declared.
    pub fn edge(&self, src: InternalEntityType, dest: InternalEntityType) -> Option<Edge> {
        let src_idx = self.node_indices[&src];
        let dest_idx = self.node_indices[&dest];
        self.graph
            .edges_connecting(src_idx, dest_idx)
            .next()
            .map(|edge_ref| *edge_ref.weight())
    }

    /// Whether `to` can be reached from `from` by following edges.
    pub fn is_reachable(&self, from: InternalEntityType, to: InternalEntityType) -> bool {
        has_path_connecting(
            &self.graph,
            self.node_indices[&from],
            self.node_indices[&to],
            None,
        )
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_references().map(|edge_ref| edge_ref.weight())
    }
}
