//! Shape kinds of Petri net nodes and their fixed dimensions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{attach::AttachPointCapacity, geometry::Size};

/// Diameter of the circle drawn for a place.
pub const PLACE_DIAMETER: f32 = 60.0;

/// Width of the rectangle drawn for a transition.
pub const TRANSITION_WIDTH: f32 = 80.0;

/// Height of the rectangle drawn for a transition.
pub const TRANSITION_HEIGHT: f32 = 50.0;

/// Bounding box used for shape kinds the layout does not recognize.
pub const DEFAULT_SHAPE_SIZE: f32 = 100.0;

/// The kind of a net node, fixing its size and perimeter geometry.
///
/// Any kind string other than `place` or `transition` deserializes to
/// [`ShapeKind::Unknown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Circle of [`PLACE_DIAMETER`].
    Place,
    /// Rectangle of [`TRANSITION_WIDTH`] × [`TRANSITION_HEIGHT`].
    Transition,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ShapeKind {
    /// Returns the fixed size of shapes of this kind.
    pub fn size(self) -> Size {
        match self {
            ShapeKind::Place => Size::new(PLACE_DIAMETER, PLACE_DIAMETER),
            ShapeKind::Transition => Size::new(TRANSITION_WIDTH, TRANSITION_HEIGHT),
            ShapeKind::Unknown => Size::new(DEFAULT_SHAPE_SIZE, DEFAULT_SHAPE_SIZE),
        }
    }

    /// Returns the largest attach point capacity a shape of this kind can carry.
    ///
    /// Unknown shapes only ever expose their four cardinal points.
    pub fn max_capacity(self) -> AttachPointCapacity {
        match self {
            ShapeKind::Place | ShapeKind::Transition => AttachPointCapacity::MAX,
            ShapeKind::Unknown => AttachPointCapacity::MIN,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Place => "place",
            ShapeKind::Transition => "transition",
            ShapeKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
