//! Basic layout engine
//!
//! Ranks nodes by breadth-first search from the nodes without incoming arcs,
//! ordering each rank by input order. It has no failure modes, which makes it
//! the last resort when the layered engine cannot place a net.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use log::debug;

use petri_layout_core::{geometry::Size, identifier::Id};

use crate::layout::{
    LayoutDirection, LayoutError, PlacementGraph, Positions, Spacing,
    engines::PlacementEngine,
    positioning::{self, RankedNode},
};

/// The basic layout engine
pub struct Engine {
    direction: LayoutDirection,
    spacing: Spacing,
}

impl Engine {
    /// Create a new basic layout engine
    pub fn new(direction: LayoutDirection, spacing: Spacing) -> Self {
        Self { direction, spacing }
    }

    /// Places every node of `graph`.
    pub fn place_all(&self, graph: &PlacementGraph) -> Positions {
        let ranks = breadth_first_ranks(graph);

        let mut slots: HashMap<usize, usize> = HashMap::new();
        let ranked: Vec<RankedNode> = ranks
            .iter()
            .map(|(&id, &rank)| {
                let slot = slots.entry(rank).or_insert(0);
                let node = RankedNode::new(id, rank, *slot as f64);
                *slot += 1;
                node
            })
            .collect();
        debug!(ranked = ranked.len(); "Basic layout ranked nodes");

        let sizes: IndexMap<Id, Size> = graph.nodes().map(|n| (n.id(), n.size())).collect();
        let mut positions = Positions::with_capacity(graph.nodes_count());
        let mut components = vec![ranked];
        let bounds = positioning::assign_coordinates(
            &mut components,
            &sizes,
            self.direction,
            self.spacing,
            &mut positions,
        );
        positioning::place_isolated(graph, &mut positions, bounds, self.direction, self.spacing);

        positioning::in_graph_order(graph, positions)
    }
}

impl PlacementEngine for Engine {
    fn place(&self, graph: &PlacementGraph) -> Result<Positions, LayoutError> {
        Ok(self.place_all(graph))
    }
}

/// Breadth-first ranks of every node touched by a rankable arc, in input order.
///
/// Nodes without incoming arcs start at rank 0. Cycles without such an entry
/// are broken at their first node in input order.
fn breadth_first_ranks(graph: &PlacementGraph) -> IndexMap<Id, usize> {
    let mut successors: HashMap<Id, Vec<Id>> = HashMap::new();
    let mut has_incoming: HashSet<Id> = HashSet::new();
    let mut connected: HashSet<Id> = HashSet::new();
    for (source, target) in graph.rankable_edges() {
        successors.entry(source).or_default().push(target);
        has_incoming.insert(target);
        connected.insert(source);
        connected.insert(target);
    }

    let candidates: Vec<Id> = graph
        .nodes()
        .map(|node| node.id())
        .filter(|id| connected.contains(id))
        .collect();

    let mut ranks: HashMap<Id, usize> = HashMap::new();
    let mut queue: VecDeque<Id> = VecDeque::new();

    let roots = candidates.iter().filter(|id| !has_incoming.contains(*id));
    for &root in roots {
        ranks.insert(root, 0);
        queue.push_back(root);
    }

    loop {
        while let Some(current) = queue.pop_front() {
            let rank = ranks[&current];
            for next in successors.get(&current).into_iter().flatten() {
                if !ranks.contains_key(next) {
                    ranks.insert(*next, rank + 1);
                    queue.push_back(*next);
                }
            }
        }

        match candidates.iter().find(|id| !ranks.contains_key(*id)) {
            Some(&entry) => {
                ranks.insert(entry, 0);
                queue.push_back(entry);
            }
            None => break,
        }
    }

    candidates
        .into_iter()
        .filter_map(|id| ranks.get(&id).map(|rank| (id, *rank)))
        .collect()
}
