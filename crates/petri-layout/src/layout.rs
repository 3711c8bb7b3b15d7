//! Layout engine for positioning places and transitions.
//!
//! This module turns a net's nodes and arcs into top-left positions. The
//! primary engine is a layered (Sugiyama) pass; a deterministic basic engine
//! backs it up when the layered pass fails.
//!
//! # Pipeline Position
//!
//! ```text
//! Node/edge records
//!     ↓ connectivity sizing
//! Attach point capacities
//!     ↓ layout (this module)
//! Positions
//!     ↓ handles
//! Routed arcs
//! ```
//!
//! # Submodules
//!
//! - `engines` - The layered and basic placement engines
//! - [`positioning`] - Rank/slot to coordinate conversion and isolated node placement

mod engines;
pub mod positioning;

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use petri_layout_core::{
    geometry::{Point, Size},
    identifier::Id,
};

use crate::records::AnchorSide;

pub use engines::{PlacementEngine, basic, sugiyama};

/// Top-left anchor of every placed node, in input order.
pub type Positions = IndexMap<Id, Point>;

/// Errors raised by placement engines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("unknown layout direction `{0}`, expected `horizontal` or `vertical`")]
    UnknownDirection(String),

    #[error("invalid layout parameters: {0}")]
    InvalidParameters(String),

    #[error("layered layout engine panicked: {0}")]
    EnginePanicked(String),

    #[error("layered layout engine returned no layout")]
    EmptyResult,

    #[error("layered layout engine left {0} ranked node(s) without a position")]
    Unplaced(usize),
}

/// Flow direction of the ranks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    /// Ranks flow left to right.
    #[default]
    Horizontal,
    /// Ranks flow top to bottom.
    Vertical,
}

impl LayoutDirection {
    /// Side of a node arcs leave from.
    pub fn source_anchor_side(self) -> AnchorSide {
        match self {
            LayoutDirection::Horizontal => AnchorSide::Right,
            LayoutDirection::Vertical => AnchorSide::Bottom,
        }
    }

    /// Side of a node arcs arrive at.
    pub fn target_anchor_side(self) -> AnchorSide {
        match self {
            LayoutDirection::Horizontal => AnchorSide::Left,
            LayoutDirection::Vertical => AnchorSide::Top,
        }
    }

    /// Splits a size into its extent along the flow axis and across it.
    pub(crate) fn flow_and_cross(self, size: Size) -> (f32, f32) {
        match self {
            LayoutDirection::Horizontal => (size.width(), size.height()),
            LayoutDirection::Vertical => (size.height(), size.width()),
        }
    }

    /// Builds a point from a flow-axis and a cross-axis coordinate.
    pub(crate) fn point(self, flow: f32, cross: f32) -> Point {
        match self {
            LayoutDirection::Horizontal => Point::new(flow, cross),
            LayoutDirection::Vertical => Point::new(cross, flow),
        }
    }
}

impl FromStr for LayoutDirection {
    type Err = LayoutError;

    /// Accepts `horizontal`/`LR` and `vertical`/`TB`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "lr" => Ok(LayoutDirection::Horizontal),
            "vertical" | "tb" => Ok(LayoutDirection::Vertical),
            _ => Err(LayoutError::UnknownDirection(s.to_string())),
        }
    }
}

impl fmt::Display for LayoutDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutDirection::Horizontal => f.write_str("horizontal"),
            LayoutDirection::Vertical => f.write_str("vertical"),
        }
    }
}

/// Distances used by the placement engines, in plane units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    node_separation: f32,
    rank_separation: f32,
    margin: f32,
}

impl Spacing {
    pub fn new(node_separation: f32, rank_separation: f32, margin: f32) -> Self {
        Self {
            node_separation,
            rank_separation,
            margin,
        }
    }

    /// Default spacing for a direction: 80/150 horizontally, 60/120
    /// vertically, with a margin of 50.
    pub fn for_direction(direction: LayoutDirection) -> Self {
        match direction {
            LayoutDirection::Horizontal => Self::new(80.0, 150.0, 50.0),
            LayoutDirection::Vertical => Self::new(60.0, 120.0, 50.0),
        }
    }

    /// Gap between neighbouring nodes of the same rank.
    pub fn node_separation(self) -> f32 {
        self.node_separation
    }

    /// Gap between consecutive ranks.
    pub fn rank_separation(self) -> f32 {
        self.rank_separation
    }

    /// Outer margin around the whole drawing.
    pub fn margin(self) -> f32 {
        self.margin
    }

    /// Checks that every distance is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidParameters`] naming the first bad value.
    pub fn validate(self) -> Result<(), LayoutError> {
        for (name, value) in [
            ("node separation", self.node_separation),
            ("rank separation", self.rank_separation),
            ("margin", self.margin),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidParameters(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// A node as seen by the placement engines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementNode {
    id: Id,
    size: Size,
}

impl PlacementNode {
    pub fn new(id: Id, size: Size) -> Self {
        Self { id, size }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

/// Nodes with their sizes plus directed arcs between them.
///
/// Arcs naming unknown nodes and self-loops are kept here and ignored by the
/// engines when ranking.
#[derive(Debug, Clone, Default)]
pub struct PlacementGraph {
    nodes: IndexMap<Id, PlacementNode>,
    edges: Vec<(Id, Id)>,
}

impl PlacementGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: Id, size: Size) {
        self.nodes.insert(id, PlacementNode::new(id, size));
    }

    pub fn add_edge(&mut self, source: Id, target: Id) {
        self.edges.push((source, target));
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &PlacementNode> {
        self.nodes.values()
    }

    pub fn node(&self, id: Id) -> Option<&PlacementNode> {
        self.nodes.get(&id)
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    /// Arcs that can take part in ranking: both ends known, not a self-loop.
    pub fn rankable_edges(&self) -> impl Iterator<Item = (Id, Id)> + '_ {
        self.edges.iter().copied().filter(|(source, target)| {
            source != target && self.nodes.contains_key(source) && self.nodes.contains_key(target)
        })
    }
}

/// Result of [`place_with_fallback`].
#[derive(Debug, Clone)]
pub enum Placement {
    /// The layered engine succeeded with the requested parameters.
    Primary(Positions),
    /// The layered engine failed; `positions` come from a fallback and
    /// `cause` explains the original failure.
    Fallback {
        positions: Positions,
        cause: LayoutError,
    },
}

impl Placement {
    pub fn positions(&self) -> &Positions {
        match self {
            Placement::Primary(positions) | Placement::Fallback { positions, .. } => positions,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Placement::Fallback { .. })
    }

    /// Splits into positions and the failure that forced a fallback, if any.
    pub fn into_parts(self) -> (Positions, Option<LayoutError>) {
        match self {
            Placement::Primary(positions) => (positions, None),
            Placement::Fallback { positions, cause } => (positions, Some(cause)),
        }
    }
}

/// Places every node of `graph`, falling back instead of failing.
///
/// Order of attempts:
/// 1. the layered engine with `spacing`;
/// 2. the layered engine with the default spacing for `direction`, when it
///    differs from `spacing`;
/// 3. the basic engine with the default spacing, which cannot fail.
pub fn place_with_fallback(
    graph: &PlacementGraph,
    direction: LayoutDirection,
    spacing: Spacing,
) -> Placement {
    let cause = match sugiyama::Engine::new(direction, spacing).place(graph) {
        Ok(positions) => return Placement::Primary(positions),
        Err(err) => err,
    };
    warn!(err:% = cause; "Layered layout failed, falling back");

    let defaults = Spacing::for_direction(direction);
    if defaults != spacing {
        match sugiyama::Engine::new(direction, defaults).place(graph) {
            Ok(positions) => {
                debug!("Layered layout succeeded with default parameters");
                return Placement::Fallback { positions, cause };
            }
            Err(err) => {
                warn!(err:% = err; "Layered layout failed with default parameters");
            }
        }
    }

    debug!("Using basic layout");
    let positions = basic::Engine::new(direction, defaults).place_all(graph);
    Placement::Fallback { positions, cause }
}
