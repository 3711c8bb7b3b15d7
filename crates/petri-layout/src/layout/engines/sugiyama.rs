//! Sugiyama layout engine for Petri nets.
//!
//! Based on the Sugiyama algorithm for layered drawing of directed graphs,
//! using the rust-sugiyama implementation. The crate lays out every connected
//! component separately; this engine reads back each component's layers and
//! in-layer order and hands them to [`positioning`] for spacing.
//!
//! rust-sugiyama does not terminate on some dense cyclic inputs, so the arcs
//! of a greedy feedback arc set are reversed before ranking. The arcs handed
//! to the crate always form a DAG.

use std::{
    any::Any,
    cmp::Ordering,
    collections::{HashMap, HashSet},
    panic,
};

use indexmap::IndexMap;
use log::{debug, trace};
use petgraph::{algo, graph::DiGraph, visit::EdgeRef};
use rust_sugiyama::configure::Config;

use petri_layout_core::{geometry::Size, identifier::Id};

use crate::layout::{
    LayoutDirection, LayoutError, PlacementGraph, Positions, Spacing,
    engines::PlacementEngine,
    positioning::{self, RankedNode},
};

/// Coordinates returned for one vertex: `(vertex, (x, y))`.
type VertexCoordinates = (usize, (f64, f64));

/// The Sugiyama layout engine
pub struct Engine {
    /// Direction the ranks flow in
    direction: LayoutDirection,

    /// Gaps between nodes, ranks and the drawing edge
    spacing: Spacing,
}

impl Engine {
    /// Create a new Sugiyama layout engine
    pub fn new(direction: LayoutDirection, spacing: Spacing) -> Self {
        Self { direction, spacing }
    }

    /// Vertex spacing handed to rust-sugiyama, scaled to the average node size.
    fn vertex_spacing(sizes: &IndexMap<Id, Size>) -> f64 {
        let avg_node_size = if sizes.is_empty() {
            100.0
        } else {
            sizes
                .values()
                .map(|s| (s.width() + s.height()) / 2.0)
                .sum::<f32>()
                / sizes.len() as f32
        };
        f64::from((avg_node_size / 50.0).clamp(2.0, 5.0))
    }

    /// Runs rust-sugiyama and returns the ranked nodes of every component.
    fn rank_components(
        &self,
        vertices: &IndexMap<Id, u32>,
        edges: &[(u32, u32)],
        sizes: &IndexMap<Id, Size>,
    ) -> Result<Vec<Vec<RankedNode>>, LayoutError> {
        let vertex_spacing = Self::vertex_spacing(sizes);

        // Try the rust_sugiyama crate with our sequential IDs, catching any panics
        let layouts = panic::catch_unwind(|| {
            let config = Config {
                minimum_length: 1,
                vertex_spacing,
                ..Default::default()
            };
            rust_sugiyama::from_edges(edges, &config)
        })
        .map_err(|err| LayoutError::EnginePanicked(panic_message(err.as_ref())))?;

        if layouts.is_empty() {
            return Err(LayoutError::EmptyResult);
        }

        let ids: Vec<Id> = vertices.keys().copied().collect();
        let components: Vec<Vec<RankedNode>> = layouts
            .iter()
            .map(|(coords, _, _)| rank_component(coords, &ids, edges, vertex_spacing))
            .collect();

        let placed: usize = components.iter().map(Vec::len).sum();
        if placed < ids.len() {
            return Err(LayoutError::Unplaced(ids.len() - placed));
        }

        trace!(components = components.len(), placed; "Ranked net components");
        Ok(components)
    }
}

impl PlacementEngine for Engine {
    fn place(&self, graph: &PlacementGraph) -> Result<Positions, LayoutError> {
        self.spacing.validate()?;

        let sizes: IndexMap<Id, Size> = graph.nodes().map(|n| (n.id(), n.size())).collect();

        // Only nodes with arcs become rust-sugiyama vertices, numbered densely
        let mut vertices: IndexMap<Id, u32> = IndexMap::new();
        let mut edges: Vec<(u32, u32)> = Vec::new();
        for (source, target) in graph.rankable_edges() {
            let edge = (vertex(&mut vertices, source), vertex(&mut vertices, target));
            if !edges.contains(&edge) {
                edges.push(edge);
            }
        }

        let mut positions = Positions::with_capacity(graph.nodes_count());
        let ranked = if edges.is_empty() {
            None
        } else {
            let edges = acyclic_edges(vertices.len(), &edges);
            debug!(
                nodes = vertices.len(),
                edges = edges.len();
                "Applying Sugiyama algorithm"
            );
            let mut components = self.rank_components(&vertices, &edges, &sizes)?;
            positioning::assign_coordinates(
                &mut components,
                &sizes,
                self.direction,
                self.spacing,
                &mut positions,
            )
        };

        positioning::place_isolated(graph, &mut positions, ranked, self.direction, self.spacing);

        Ok(positioning::in_graph_order(graph, positions))
    }
}

/// Returns the dense vertex number of `id`, assigning the next free one.
fn vertex(vertices: &mut IndexMap<Id, u32>, id: Id) -> u32 {
    let next = vertices.len() as u32;
    *vertices.entry(id).or_insert(next)
}

/// Reverses the arcs of a greedy feedback arc set so that `edges` has no
/// cycles, dropping arcs that become duplicates.
fn acyclic_edges(vertex_count: usize, edges: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(vertex_count, edges.len());
    for _ in 0..vertex_count {
        graph.add_node(());
    }
    graph.extend_with_edges(edges.iter().copied());

    let feedback: HashSet<usize> = algo::greedy_feedback_arc_set(&graph)
        .map(|edge| edge.id().index())
        .collect();
    if !feedback.is_empty() {
        trace!(reversed = feedback.len(); "Breaking cycles before ranking");
    }

    let mut acyclic: Vec<(u32, u32)> = Vec::with_capacity(edges.len());
    for (index, &(source, target)) in edges.iter().enumerate() {
        let edge = if feedback.contains(&index) {
            (target, source)
        } else {
            (source, target)
        };
        if !acyclic.contains(&edge) {
            acyclic.push(edge);
        }
    }
    acyclic
}

/// Quantized y so layers survive floating point noise.
fn level_key(y: f64) -> i64 {
    (y * 1000.0).round() as i64
}

/// Turns one component's coordinates into ranked nodes.
///
/// Layers are the distinct y values of the component. `edges` is acyclic, so
/// when its arcs point towards smaller layer indices the layering is flipped
/// so that ranks grow along the arcs.
fn rank_component(
    coords: &[VertexCoordinates],
    ids: &[Id],
    edges: &[(u32, u32)],
    vertex_spacing: f64,
) -> Vec<RankedNode> {
    let mut coords = coords.to_vec();
    coords.sort_by_key(|(vertex, _)| *vertex);

    let mut levels: Vec<i64> = coords.iter().map(|(_, (_, y))| level_key(*y)).collect();
    levels.sort_unstable();
    levels.dedup();
    let Some(last_level) = levels.len().checked_sub(1) else {
        return Vec::new();
    };
    let layer_of = |y: f64| {
        levels
            .binary_search(&level_key(y))
            .unwrap_or_else(|index| index)
    };

    let layers: HashMap<usize, usize> = coords
        .iter()
        .map(|&(vertex, (_, y))| (vertex, layer_of(y)))
        .collect();
    let orientation: i64 = edges
        .iter()
        .filter_map(|&(source, target)| {
            let source = *layers.get(&(source as usize))? as i64;
            let target = *layers.get(&(target as usize))? as i64;
            Some((target - source).signum())
        })
        .sum();

    coords
        .iter()
        .filter_map(|&(vertex, (x, y))| {
            let id = ids.get(vertex)?;
            let layer = layer_of(y);
            let rank = match orientation.cmp(&0) {
                Ordering::Less => last_level - layer,
                _ => layer,
            };
            Some(RankedNode::new(*id, rank, x / vertex_spacing))
        })
        .collect()
}

fn panic_message(err: &(dyn Any + Send)) -> String {
    if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "unknown error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use petri_layout_core::{geometry::Bounds, shape::ShapeKind};

    use super::*;

    fn graph(nodes: &[(&str, ShapeKind)], edges: &[(&str, &str)]) -> PlacementGraph {
        let mut graph = PlacementGraph::new();
        for (name, kind) in nodes {
            graph.add_node(Id::new(name), kind.size());
        }
        for (source, target) in edges {
            graph.add_edge(Id::new(source), Id::new(target));
        }
        graph
    }

    fn bounds(graph: &PlacementGraph, positions: &Positions, name: &str) -> Bounds {
        let id = Id::new(name);
        let size = graph.node(id).expect("node exists").size();
        positions[&id].to_bounds(size)
    }

    fn assert_no_overlaps(graph: &PlacementGraph, positions: &Positions) {
        let all: Vec<Bounds> = graph
            .nodes()
            .map(|node| positions[&node.id()].to_bounds(node.size()))
            .collect();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_chain_flows_left_to_right() {
        let graph = graph(
            &[
                ("sg_p1", ShapeKind::Place),
                ("sg_t1", ShapeKind::Transition),
                ("sg_p2", ShapeKind::Place),
            ],
            &[("sg_p1", "sg_t1"), ("sg_t1", "sg_p2")],
        );
        let spacing = Spacing::for_direction(LayoutDirection::Horizontal);
        let positions = Engine::new(LayoutDirection::Horizontal, spacing)
            .place(&graph)
            .expect("chain is placeable");

        assert_eq!(positions.len(), 3);
        let p1 = bounds(&graph, &positions, "sg_p1");
        let t1 = bounds(&graph, &positions, "sg_t1");
        let p2 = bounds(&graph, &positions, "sg_p2");
        assert!(p1.max_x() <= t1.min_x());
        assert!(t1.max_x() <= p2.min_x());
        assert!(t1.min_x() - p1.max_x() >= spacing.rank_separation());
        assert!(p1.min_x() >= spacing.margin());
        assert!(p1.min_y() >= spacing.margin());
        assert_no_overlaps(&graph, &positions);
    }

    #[test]
    fn test_chain_flows_top_to_bottom() {
        let graph = graph(
            &[
                ("sv_p1", ShapeKind::Place),
                ("sv_t1", ShapeKind::Transition),
                ("sv_p2", ShapeKind::Place),
            ],
            &[("sv_p1", "sv_t1"), ("sv_t1", "sv_p2")],
        );
        let positions = Engine::new(
            LayoutDirection::Vertical,
            Spacing::for_direction(LayoutDirection::Vertical),
        )
        .place(&graph)
        .expect("chain is placeable");

        let p1 = bounds(&graph, &positions, "sv_p1");
        let t1 = bounds(&graph, &positions, "sv_t1");
        let p2 = bounds(&graph, &positions, "sv_p2");
        assert!(p1.max_y() <= t1.min_y());
        assert!(t1.max_y() <= p2.min_y());
    }

    #[test]
    fn test_fork_and_isolated_nodes_do_not_overlap() {
        let graph = graph(
            &[
                ("fk_p", ShapeKind::Place),
                ("fk_t1", ShapeKind::Transition),
                ("fk_t2", ShapeKind::Transition),
                ("fk_t3", ShapeKind::Transition),
                ("fk_lone", ShapeKind::Place),
                ("fk_odd", ShapeKind::Unknown),
            ],
            &[("fk_p", "fk_t1"), ("fk_p", "fk_t2"), ("fk_p", "fk_t3")],
        );
        let positions = Engine::new(
            LayoutDirection::Horizontal,
            Spacing::for_direction(LayoutDirection::Horizontal),
        )
        .place(&graph)
        .expect("fork is placeable");

        assert_eq!(positions.len(), 6);
        assert_no_overlaps(&graph, &positions);

        // Isolated nodes sit in a column below everything ranked
        let lone = bounds(&graph, &positions, "fk_lone");
        let odd = bounds(&graph, &positions, "fk_odd");
        assert_eq!(lone.min_x(), 50.0);
        assert_eq!(odd.min_x(), 50.0);
        assert!(lone.max_y() <= odd.min_y());
        for ranked in ["fk_p", "fk_t1", "fk_t2", "fk_t3"] {
            assert!(bounds(&graph, &positions, ranked).max_y() < lone.min_y());
        }
    }

    #[test]
    fn test_disconnected_components_do_not_overlap() {
        let graph = graph(
            &[
                ("dc_a1", ShapeKind::Place),
                ("dc_a2", ShapeKind::Transition),
                ("dc_b1", ShapeKind::Place),
                ("dc_b2", ShapeKind::Transition),
            ],
            &[("dc_a1", "dc_a2"), ("dc_b1", "dc_b2")],
        );
        let positions = Engine::new(
            LayoutDirection::Horizontal,
            Spacing::for_direction(LayoutDirection::Horizontal),
        )
        .place(&graph)
        .expect("components are placeable");

        assert_eq!(positions.len(), 4);
        assert_no_overlaps(&graph, &positions);
    }

    #[test]
    fn test_self_loop_only_node_is_isolated() {
        let graph = graph(&[("sl_t", ShapeKind::Transition)], &[("sl_t", "sl_t")]);
        let positions = Engine::new(
            LayoutDirection::Horizontal,
            Spacing::for_direction(LayoutDirection::Horizontal),
        )
        .place(&graph)
        .expect("self-loop is placeable");

        assert_eq!(positions[&Id::new("sl_t")].x(), 50.0);
        assert_eq!(positions[&Id::new("sl_t")].y(), 50.0);
    }

    #[test]
    fn test_cycle_is_placeable() {
        let graph = graph(
            &[
                ("cy_p", ShapeKind::Place),
                ("cy_t", ShapeKind::Transition),
            ],
            &[("cy_p", "cy_t"), ("cy_t", "cy_p")],
        );
        let positions = Engine::new(
            LayoutDirection::Horizontal,
            Spacing::for_direction(LayoutDirection::Horizontal),
        )
        .place(&graph)
        .expect("cycle is placeable");

        assert_eq!(positions.len(), 2);
        assert_no_overlaps(&graph, &positions);
    }

    #[test]
    fn test_invalid_spacing_is_rejected() {
        let graph = graph(&[("inv_p", ShapeKind::Place)], &[]);
        let result = Engine::new(
            LayoutDirection::Horizontal,
            Spacing::new(80.0, -1.0, 50.0),
        )
        .place(&graph);

        assert!(matches!(result, Err(LayoutError::InvalidParameters(_))));
    }

    #[test]
    fn test_positions_follow_graph_order() {
        let graph = graph(
            &[
                ("ord_z", ShapeKind::Place),
                ("ord_t", ShapeKind::Transition),
                ("ord_a", ShapeKind::Place),
            ],
            &[("ord_a", "ord_t"), ("ord_t", "ord_z")],
        );
        let positions = Engine::new(
            LayoutDirection::Horizontal,
            Spacing::for_direction(LayoutDirection::Horizontal),
        )
        .place(&graph)
        .expect("chain is placeable");

        let order: Vec<Id> = positions.keys().copied().collect();
        assert_eq!(
            order,
            vec![Id::new("ord_z"), Id::new("ord_t"), Id::new("ord_a")]
        );
    }

    #[test]
    fn test_rank_component_flips_upward_layers() {
        let a = Id::new("flip_a");
        let b = Id::new("flip_b");
        // Source drawn below its target
        let coords = vec![(0, (0.0, 0.0)), (1, (0.0, -2.0))];

        let ranked = rank_component(&coords, &[a, b], &[(0, 1)], 2.0);

        assert_eq!(ranked[0].rank(), 0);
        assert_eq!(ranked[1].rank(), 1);
    }

    /// 18 nodes, 40 arcs, many overlapping cycles.
    const DENSE_CYCLIC_ARCS: [(u32, u32); 40] = [
        (12, 13), (10, 3), (11, 13), (8, 15), (9, 0), (0, 6), (8, 3), (7, 13),
        (1, 8), (4, 14), (16, 2), (3, 10), (3, 1), (4, 13), (7, 8), (17, 1),
        (4, 6), (8, 14), (3, 0), (9, 10), (4, 7), (13, 1), (5, 14), (15, 12),
        (11, 7), (9, 7), (1, 4), (12, 16), (9, 15), (11, 8), (7, 9), (16, 11),
        (7, 16), (14, 15), (5, 11), (10, 15), (6, 5), (10, 5), (4, 5), (10, 16),
    ];

    fn acyclic_graph(edges: &[(u32, u32)]) -> DiGraph<(), ()> {
        DiGraph::from_edges(edges.iter().copied())
    }

    #[test]
    fn test_acyclic_edges_break_every_cycle() {
        assert!(algo::is_cyclic_directed(&acyclic_graph(&DENSE_CYCLIC_ARCS)));

        let edges = acyclic_edges(18, &DENSE_CYCLIC_ARCS);

        assert!(!algo::is_cyclic_directed(&acyclic_graph(&edges)));
        assert!(edges.len() <= DENSE_CYCLIC_ARCS.len());
        for &(source, target) in &DENSE_CYCLIC_ARCS {
            assert!(edges.contains(&(source, target)) || edges.contains(&(target, source)));
        }
    }

    #[test]
    fn test_acyclic_edges_merge_reversed_duplicates() {
        let edges = acyclic_edges(2, &[(0, 1), (1, 0)]);

        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn test_acyclic_edges_keep_dags_untouched() {
        let dag = [(0, 1), (1, 2), (0, 2)];

        assert_eq!(acyclic_edges(3, &dag), dag.to_vec());
    }

    #[test]
    fn test_dense_cyclic_net_is_placeable() {
        let names: Vec<String> = (0..18).map(|i| format!("dense_n{i}")).collect();
        let nodes: Vec<(&str, ShapeKind)> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let kind = if i % 2 == 0 {
                    ShapeKind::Place
                } else {
                    ShapeKind::Transition
                };
                (name.as_str(), kind)
            })
            .collect();
        let arcs: Vec<(&str, &str)> = DENSE_CYCLIC_ARCS
            .iter()
            .map(|&(s, t)| (names[s as usize].as_str(), names[t as usize].as_str()))
            .collect();
        let graph = graph(&nodes, &arcs);

        let positions = Engine::new(
            LayoutDirection::Horizontal,
            Spacing::for_direction(LayoutDirection::Horizontal),
        )
        .place(&graph)
        .expect("dense cyclic net is placeable");

        assert_eq!(positions.len(), 18);
        assert_no_overlaps(&graph, &positions);
    }

    #[test]
    fn test_panic_message() {
        let owned: Box<dyn Any + Send> = Box::new("boom".to_string());
        let borrowed: Box<dyn Any + Send> = Box::new("bang");
        let other: Box<dyn Any + Send> = Box::new(42);

        assert_eq!(panic_message(owned.as_ref()), "boom");
        assert_eq!(panic_message(borrowed.as_ref()), "bang");
        assert_eq!(panic_message(other.as_ref()), "unknown error");
    }
}
