//! Attach point sizing from arc connectivity.
//!
//! Every node needs enough perimeter points for its incident arcs. The count
//! is the node's in-degree plus out-degree, rounded up to a multiple of four
//! and capped at twelve; see [`AttachPointCapacity::from_degree`].

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, warn};
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};

use petri_layout_core::{attach::AttachPointCapacity, identifier::Id};

use crate::records::{EdgeRecord, NodeRecord};

/// Builds the arc graph of a net. Arcs naming an unknown node are skipped.
fn arc_graph(nodes: &[NodeRecord], edges: &[EdgeRecord]) -> (DiGraph<Id, ()>, Vec<NodeIndex>) {
    let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());
    let mut indices: HashMap<Id, NodeIndex> = HashMap::with_capacity(nodes.len());
    let order: Vec<NodeIndex> = nodes
        .iter()
        .map(|node| {
            let id = Id::new(&node.id);
            *indices.entry(id).or_insert_with(|| graph.add_node(id))
        })
        .collect();

    for edge in edges {
        match (
            indices.get(&Id::new(&edge.source)),
            indices.get(&Id::new(&edge.target)),
        ) {
            (Some(&source), Some(&target)) => {
                graph.add_edge(source, target, ());
            }
            _ => {
                warn!(
                    edge = edge.id.as_str(),
                    source = edge.source.as_str(),
                    target = edge.target.as_str();
                    "Arc references an unknown node, ignoring it for sizing"
                );
            }
        }
    }

    (graph, order)
}

/// In-degree plus out-degree of every node, in input order.
///
/// A self-loop counts twice.
pub fn degrees(nodes: &[NodeRecord], edges: &[EdgeRecord]) -> IndexMap<Id, usize> {
    let (graph, order) = arc_graph(nodes, edges);
    order
        .into_iter()
        .map(|index| {
            let degree = graph.edges_directed(index, Direction::Incoming).count()
                + graph.edges_directed(index, Direction::Outgoing).count();
            (graph[index], degree)
        })
        .collect()
}

/// Attach point capacity each node needs for its arcs, in input order.
pub fn required_attach_points(
    nodes: &[NodeRecord],
    edges: &[EdgeRecord],
) -> IndexMap<Id, AttachPointCapacity> {
    let capacities: IndexMap<Id, AttachPointCapacity> = degrees(nodes, edges)
        .into_iter()
        .map(|(id, degree)| (id, AttachPointCapacity::from_degree(degree)))
        .collect();
    debug!(nodes = capacities.len(); "Computed attach point capacities");
    capacities
}
