//! Summary counts of a net.

use serde::{Deserialize, Serialize};

use petri_layout_core::shape::ShapeKind;

use crate::records::{EdgeRecord, NodeRecord};

/// Counts derived from a net's records.
///
/// Tokens and markings are read from places only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetStatistics {
    pub places: usize,
    pub transitions: usize,
    pub arcs: usize,
    pub tokens: u64,
    pub visible_transitions: usize,
    pub invisible_transitions: usize,
    pub has_initial_marking: bool,
    pub has_final_marking: bool,
}

impl NetStatistics {
    pub fn from_records(nodes: &[NodeRecord], edges: &[EdgeRecord]) -> Self {
        let mut stats = Self {
            arcs: edges.len(),
            ..Self::default()
        };

        for node in nodes {
            let attributes = &node.attributes;
            match node.shape_kind {
                ShapeKind::Place => {
                    stats.places += 1;
                    let tokens = attributes.tokens.unwrap_or(0);
                    stats.tokens += u64::from(tokens);
                    stats.has_initial_marking |=
                        tokens > 0 || attributes.is_initial_marking.unwrap_or(false);
                    stats.has_final_marking |= attributes.is_final_marking.unwrap_or(false);
                }
                ShapeKind::Transition => {
                    stats.transitions += 1;
                    if attributes.is_invisible.unwrap_or(false) {
                        stats.invisible_transitions += 1;
                    } else {
                        stats.visible_transitions += 1;
                    }
                }
                ShapeKind::Unknown => {}
            }
        }

        stats
    }
}
