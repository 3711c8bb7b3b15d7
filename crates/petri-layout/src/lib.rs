//! Petri Layout - Layered layout and arc routing for Petri net diagrams.
//!
//! Given the places, transitions and arcs of a net, this crate computes a
//! position for every node, generates attach points on each node's perimeter
//! and picks one attach point per arc endpoint. Routed nets are returned as
//! serializable records ready for a diagram editor.

pub mod config;
pub mod connectivity;
pub mod handles;
pub mod layout;
pub mod records;
pub mod statistics;

mod error;

pub use petri_layout_core::{attach, color, geometry, identifier, shape};

pub use error::PetriLayoutError;
pub use layout::{LayoutDirection, LayoutError};

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, info, warn};

use petri_layout_core::{attach::AttachPointCapacity, geometry::Point, identifier::Id};

use config::AppConfig;
use handles::{HandleAssignment, HandleResolution, NodeAttachState, ResolutionContext, Resolver};
use layout::PlacementGraph;
use records::{
    AttachPointRecord, EdgeRecord, NetDocument, NodeRecord, PositionedNode, RoutedEdge,
    RoutedNetDocument,
};
use statistics::NetStatistics;

/// How attach point capacities are chosen for a layout pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutMode {
    /// Size every node from its arc degree.
    #[default]
    Fresh,
    /// Keep the capacity recorded on each node by a previous pass.
    Relayout,
}

/// Positioned nodes and routed arcs produced by one layout pass.
#[derive(Debug, Clone)]
pub struct LayoutOutcome {
    direction: LayoutDirection,
    nodes: Vec<PositionedNode>,
    edges: Vec<RoutedEdge>,
    assignments: Vec<HandleAssignment>,
    fallback: Option<LayoutError>,
}

impl LayoutOutcome {
    pub fn direction(&self) -> LayoutDirection {
        self.direction
    }

    /// Positioned nodes, in input order.
    pub fn nodes(&self) -> &[PositionedNode] {
        &self.nodes
    }

    /// Routed arcs, in input order.
    pub fn edges(&self) -> &[RoutedEdge] {
        &self.edges
    }

    /// How each arc's handles were resolved, parallel to [`Self::edges`].
    pub fn assignments(&self) -> &[HandleAssignment] {
        &self.assignments
    }

    /// The layered engine failure that forced a fallback placement, if any.
    pub fn fallback(&self) -> Option<&LayoutError> {
        self.fallback.as_ref()
    }

    pub fn into_parts(self) -> (Vec<PositionedNode>, Vec<RoutedEdge>) {
        (self.nodes, self.edges)
    }
}

/// Lays out Petri nets.
///
/// Both passes are pure functions of their inputs: records are borrowed and
/// a complete new set of nodes and arcs is returned.
///
/// # Examples
///
/// ```
/// use petri_layout::{
///     LayoutDirection, NetLayouter,
///     records::{EdgeRecord, NodeRecord},
/// };
///
/// let nodes = vec![NodeRecord::place("p1"), NodeRecord::transition("t1")];
/// let edges = vec![EdgeRecord::new("a1", "p1", "t1")];
///
/// let outcome = NetLayouter::default()
///     .apply_layout(&nodes, &edges, LayoutDirection::Horizontal)
///     .expect("layout succeeds");
///
/// assert_eq!(outcome.nodes().len(), 2);
/// assert!(outcome.edges()[0].source_handle.starts_with("source-point-"));
/// ```
#[derive(Debug, Default)]
pub struct NetLayouter {
    config: AppConfig,
}

impl NetLayouter {
    /// Create a new layouter with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Lays out a net from scratch, sizing attach points from arc degrees.
    ///
    /// # Errors
    ///
    /// Returns [`PetriLayoutError::Graph`] for duplicate node ids and
    /// [`PetriLayoutError::Config`] for an invalid edge color. Layered engine
    /// failures do not fail the call; see [`LayoutOutcome::fallback`].
    pub fn apply_layout(
        &self,
        nodes: &[NodeRecord],
        edges: &[EdgeRecord],
        direction: LayoutDirection,
    ) -> Result<LayoutOutcome, PetriLayoutError> {
        info!(nodes = nodes.len(), edges = edges.len(), direction:%; "Applying layout");
        check_unique_ids(nodes)?;

        let capacities = connectivity::required_attach_points(nodes, edges);
        self.layout_with_capacities(nodes, edges, direction, &capacities)
    }

    /// Lays out a net again, keeping each node's recorded capacity.
    ///
    /// Capacities come from `attributes.attachPoints`, coerced to a valid
    /// value; nodes without one get four points.
    ///
    /// # Errors
    ///
    /// Same as [`Self::apply_layout`].
    pub fn relayout_nodes(
        &self,
        nodes: &[NodeRecord],
        edges: &[EdgeRecord],
        direction: LayoutDirection,
    ) -> Result<LayoutOutcome, PetriLayoutError> {
        info!(nodes = nodes.len(), edges = edges.len(), direction:%; "Relayout of nodes");
        check_unique_ids(nodes)?;

        let capacities: IndexMap<Id, AttachPointCapacity> = nodes
            .iter()
            .map(|node| {
                let capacity = node
                    .attributes
                    .attach_points
                    .map(AttachPointCapacity::normalized)
                    .unwrap_or_default();
                (Id::new(&node.id), capacity)
            })
            .collect();
        self.layout_with_capacities(nodes, edges, direction, &capacities)
    }

    /// Lays out a whole document and attaches its statistics.
    ///
    /// # Errors
    ///
    /// Same as [`Self::apply_layout`].
    pub fn layout_document(
        &self,
        document: &NetDocument,
        direction: LayoutDirection,
        mode: LayoutMode,
    ) -> Result<RoutedNetDocument, PetriLayoutError> {
        let outcome = match mode {
            LayoutMode::Fresh => self.apply_layout(&document.nodes, &document.edges, direction)?,
            LayoutMode::Relayout => {
                self.relayout_nodes(&document.nodes, &document.edges, direction)?
            }
        };
        if let Some(cause) = outcome.fallback() {
            warn!(cause:%; "Document laid out with fallback placement");
        }

        let (nodes, edges) = outcome.into_parts();
        Ok(RoutedNetDocument {
            network_id: document.network_id.clone(),
            network_name: document.network_name.clone(),
            direction,
            nodes,
            edges,
            statistics: NetStatistics::from_records(&document.nodes, &document.edges),
        })
    }

    fn layout_with_capacities(
        &self,
        nodes: &[NodeRecord],
        edges: &[EdgeRecord],
        direction: LayoutDirection,
        capacities: &IndexMap<Id, AttachPointCapacity>,
    ) -> Result<LayoutOutcome, PetriLayoutError> {
        let edge_color = self
            .config
            .style()
            .edge_color()
            .map_err(PetriLayoutError::Config)?;

        // Points are generated at a placeholder position until nodes are placed
        let mut context = ResolutionContext::new();
        let mut graph = PlacementGraph::new();
        for node in nodes {
            let id = Id::new(&node.id);
            let capacity = capacities.get(&id).copied().unwrap_or_default();
            context.insert(
                id,
                NodeAttachState::new(node.shape_kind, Point::default(), capacity),
            );
            graph.add_node(id, node.shape_kind.size());
        }
        let arcs: Vec<(Id, Id)> = edges
            .iter()
            .map(|edge| (Id::new(&edge.source), Id::new(&edge.target)))
            .collect();
        for &(source, target) in &arcs {
            graph.add_edge(source, target);
        }

        let spacing = self.config.layout().spacing(direction);
        let (positions, fallback) =
            layout::place_with_fallback(&graph, direction, spacing).into_parts();
        debug!(positioned = positions.len(), fallback = fallback.is_some(); "Nodes placed");

        for (id, state) in context.iter_mut() {
            let position = positions.get(id).copied().ok_or_else(|| {
                PetriLayoutError::Graph(format!("Position not found for node {id}"))
            })?;
            state.move_to(position);
        }

        let assignments = Resolver::new().resolve_all(&mut context, &arcs);
        debug!(
            reused = count_resolutions(&assignments, HandleResolution::Reused),
            expanded = count_resolutions(&assignments, HandleResolution::Expanded),
            dangling = count_resolutions(&assignments, HandleResolution::Dangling);
            "Arc handles resolved"
        );

        let positioned = nodes
            .iter()
            .map(|record| {
                let id = Id::new(&record.id);
                let state = context.node(id).ok_or_else(|| {
                    PetriLayoutError::Graph(format!("Attach points not found for node {id}"))
                })?;
                let capacity = state.capacity().get();

                let mut record = record.clone().normalized();
                record.position = Some(state.position().into());
                record.attributes.attach_points = Some(capacity);

                Ok(PositionedNode {
                    record,
                    source_anchor_side: direction.source_anchor_side(),
                    target_anchor_side: direction.target_anchor_side(),
                    attach_point_capacity: capacity,
                    attach_points: state.points().iter().map(AttachPointRecord::from).collect(),
                })
            })
            .collect::<Result<Vec<_>, PetriLayoutError>>()?;

        let routed: Vec<RoutedEdge> = edges
            .iter()
            .zip(&assignments)
            .map(|(edge, assignment)| {
                RoutedEdge::new(
                    edge.clone(),
                    assignment.source_handle(),
                    assignment.target_handle(),
                    edge_color,
                )
            })
            .collect();

        info!(nodes = positioned.len(), edges = routed.len(); "Layout calculated");

        Ok(LayoutOutcome {
            direction,
            nodes: positioned,
            edges: routed,
            assignments,
            fallback,
        })
    }
}

fn check_unique_ids(nodes: &[NodeRecord]) -> Result<(), PetriLayoutError> {
    let mut seen = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !seen.insert(node.id.as_str()) {
            return Err(PetriLayoutError::Graph(format!(
                "Duplicate node id `{}`",
                node.id
            )));
        }
    }
    Ok(())
}

fn count_resolutions(assignments: &[HandleAssignment], resolution: HandleResolution) -> usize {
    assignments
        .iter()
        .filter(|assignment| assignment.resolution() == resolution)
        .count()
}
