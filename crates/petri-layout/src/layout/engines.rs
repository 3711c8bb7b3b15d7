//! Placement engines
//!
//! Two engines are available:
//!
//! - [`sugiyama`]: layered drawing of the arc graph, one connected component
//!   at a time. Fails on invalid parameters or when the underlying crate
//!   panics.
//! - [`basic`]: breadth-first ranking in input order. Never fails and serves
//!   as the last resort of [`super::place_with_fallback`].
//!
//! Both engines share [`super::positioning`] for turning ranks into
//! coordinates, so their outputs obey the same spacing rules.

pub mod basic;
pub mod sugiyama;

use super::{LayoutError, PlacementGraph, Positions};

/// Interface of the placement engines.
pub trait PlacementEngine {
    /// Computes a top-left position for every node of `graph`.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if the engine cannot place the graph.
    fn place(&self, graph: &PlacementGraph) -> Result<Positions, LayoutError>;
}
