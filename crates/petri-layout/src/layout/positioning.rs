//! Conversion from ranks and slots to plane coordinates.
//!
//! Engines decide *where in the layering* a node goes: its rank along the
//! flow axis and a fractional slot across it. This module turns those into
//! top-left positions that keep every pair of nodes apart:
//!
//! - ranks are one flow pitch apart (largest flow extent plus rank separation);
//! - slots within a rank are at least one cross pitch apart (largest cross
//!   extent plus node separation);
//! - connected components are stacked along the cross axis with a node
//!   separation gap between them;
//! - nodes without arcs go into a separate column or row past the ranked
//!   region.

use std::cmp::Ordering;

use indexmap::IndexMap;

use petri_layout_core::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

use super::{LayoutDirection, PlacementGraph, Positions, Spacing};

/// A node's place in the layering of its connected component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedNode {
    id: Id,
    rank: usize,
    slot: f64,
}

impl RankedNode {
    pub fn new(id: Id, rank: usize, slot: f64) -> Self {
        Self { id, rank, slot }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn slot(&self) -> f64 {
        self.slot
    }
}

/// Shifts slots so the smallest is zero and pushes neighbours within a rank
/// at least one slot apart, keeping their relative order.
///
/// Ties keep the order in which the nodes appear in `nodes`.
pub fn spread_slots(nodes: &mut [RankedNode]) {
    let Some(min_slot) = nodes
        .iter()
        .map(|node| node.slot)
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
    else {
        return;
    };

    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| {
        nodes[a].rank.cmp(&nodes[b].rank).then(
            nodes[a]
                .slot
                .partial_cmp(&nodes[b].slot)
                .unwrap_or(Ordering::Equal),
        )
    });

    let mut previous: Option<(usize, f64)> = None;
    for index in order {
        let node = &mut nodes[index];
        let mut slot = node.slot - min_slot;
        if let Some((rank, previous_slot)) = previous {
            if rank == node.rank {
                slot = slot.max(previous_slot + 1.0);
            }
        }
        node.slot = slot;
        previous = Some((node.rank, slot));
    }
}

/// Largest extent among the sizes of `ids`.
fn max_extent<'a>(ids: impl Iterator<Item = &'a Id>, sizes: &IndexMap<Id, Size>) -> Size {
    ids.filter_map(|id| sizes.get(id))
        .fold(Size::default(), |acc, size| acc.max(*size))
}

/// Writes the positions of ranked nodes into `positions`.
///
/// Each inner slice of `components` is one connected component; its slots are
/// spread with [`spread_slots`] first. Returns the bounding box of every
/// ranked node, or `None` when `components` holds no nodes.
pub fn assign_coordinates(
    components: &mut [Vec<RankedNode>],
    sizes: &IndexMap<Id, Size>,
    direction: LayoutDirection,
    spacing: Spacing,
    positions: &mut Positions,
) -> Option<Bounds> {
    let extent = max_extent(
        components.iter().flatten().map(|node| &node.id),
        sizes,
    );
    let (flow_extent, cross_extent) = direction.flow_and_cross(extent);
    let flow_pitch = flow_extent + spacing.rank_separation();
    let cross_pitch = cross_extent + spacing.node_separation();
    let margin = Point::new(spacing.margin(), spacing.margin());

    let mut bounds: Option<Bounds> = None;
    let mut cross_offset = 0.0;

    for component in components.iter_mut() {
        if component.is_empty() {
            continue;
        }
        spread_slots(component);

        let mut max_slot: f64 = 0.0;
        for node in component.iter() {
            let size = sizes.get(&node.id).copied().unwrap_or_default();
            let flow = node.rank as f32 * flow_pitch + flow_extent / 2.0;
            let cross = cross_offset + node.slot as f32 * cross_pitch + cross_extent / 2.0;
            let center = direction.point(flow, cross).add_point(margin);
            let top_left = center.sub_point(size.half());

            positions.insert(node.id, top_left);
            let node_bounds = top_left.to_bounds(size);
            bounds = Some(match bounds {
                Some(acc) => acc.merge(&node_bounds),
                None => node_bounds,
            });
            max_slot = max_slot.max(node.slot);
        }

        cross_offset += max_slot as f32 * cross_pitch + cross_extent + spacing.node_separation();
    }

    bounds
}

/// Places every node of `graph` still missing from `positions`.
///
/// Horizontally the nodes go into a column at the left margin, starting one
/// node separation below `ranked`; vertically into a row at the top margin,
/// starting one node separation right of `ranked`. Without a ranked region
/// the column or row starts at the margin. Nodes keep their input order.
pub fn place_isolated(
    graph: &PlacementGraph,
    positions: &mut Positions,
    ranked: Option<Bounds>,
    direction: LayoutDirection,
    spacing: Spacing,
) {
    let margin = spacing.margin();
    let gap = spacing.node_separation();

    let mut cursor = match (direction, ranked) {
        (LayoutDirection::Horizontal, Some(bounds)) => bounds.max_y() + gap,
        (LayoutDirection::Vertical, Some(bounds)) => bounds.max_x() + gap,
        (_, None) => margin,
    };

    for node in graph.nodes() {
        if positions.contains_key(&node.id()) {
            continue;
        }
        let (top_left, advance) = match direction {
            LayoutDirection::Horizontal => (Point::new(margin, cursor), node.size().height()),
            LayoutDirection::Vertical => (Point::new(cursor, margin), node.size().width()),
        };
        positions.insert(node.id(), top_left);
        cursor += advance + gap;
    }
}

/// Reorders `positions` to follow the node order of `graph`.
pub fn in_graph_order(graph: &PlacementGraph, positions: Positions) -> Positions {
    graph
        .nodes()
        .filter_map(|node| {
            positions
                .get(&node.id())
                .map(|position| (node.id(), *position))
        })
        .collect()
}
