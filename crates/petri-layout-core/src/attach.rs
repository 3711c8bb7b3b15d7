//! Attach points on node perimeters.
//!
//! An attach point is a named spot on a place's circle or a transition's
//! rectangle where an arc may terminate. This module computes their absolute
//! coordinates for a given shape, position and point count.
//!
//! # Ordering
//!
//! Point ids are `point-0 .. point-(n-1)`. Generation is a pure function of
//! `(shape kind, position, count)`, so the same inputs always produce the
//! same ordered list.
//!
//! - **Circle** (place): `angle_i = i · 360 / n`, starting east and turning
//!   clockwise on screen (y grows downward).
//! - **Rectangle** (transition): ids 0..3 are the top, right, bottom and left
//!   side midpoints. Any further points are rays cast from the center at
//!   angles `(j + ½) · 360 / (n − 4)` and projected onto the side they hit.
//! - **Unknown**: the four cardinal midpoints of the default bounding box.

use std::{fmt, str::FromStr};

use crate::{
    geometry::{Point, Size},
    shape::ShapeKind,
};

/// Number of attach points a node exposes.
///
/// Always a multiple of four between [`AttachPointCapacity::MIN`] and
/// [`AttachPointCapacity::MAX`].
///
/// # Examples
///
/// ```
/// use petri_layout_core::attach::AttachPointCapacity;
///
/// assert_eq!(AttachPointCapacity::from_degree(0).get(), 4);
/// assert_eq!(AttachPointCapacity::from_degree(5).get(), 8);
/// assert_eq!(AttachPointCapacity::from_degree(20).get(), 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttachPointCapacity(u8);

impl AttachPointCapacity {
    /// Smallest capacity; every node has at least its four cardinal points.
    pub const MIN: Self = Self(4);

    /// Hard cap; arcs beyond it share points.
    pub const MAX: Self = Self(12);

    const STEP: u8 = 4;

    /// Capacity needed for a node with `degree` incident arcs:
    /// `clamp(round_up_to_multiple_of_4(max(4, degree)), 4, 12)`.
    pub fn from_degree(degree: usize) -> Self {
        let step = usize::from(Self::STEP);
        let rounded = degree.max(usize::from(Self::MIN.0)).div_ceil(step) * step;
        let capped = rounded.min(usize::from(Self::MAX.0));
        Self(capped as u8)
    }

    /// Coerces an arbitrary requested count into a valid capacity.
    ///
    /// Used for capacities carried on incoming records, which may be stale or
    /// hand-edited.
    pub fn normalized(requested: usize) -> Self {
        Self::from_degree(requested)
    }

    /// Returns the number of points.
    pub fn get(self) -> usize {
        usize::from(self.0)
    }

    /// Returns the next capacity step, bounded by `limit`, or `None` when
    /// the capacity already reached `limit`.
    pub fn grown(self, limit: Self) -> Option<Self> {
        if self >= limit {
            None
        } else {
            Some(Self((self.0 + Self::STEP).min(limit.0)))
        }
    }
}

impl Default for AttachPointCapacity {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for AttachPointCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an attach point within its node, rendered as `point-i`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttachPointId(usize);

impl AttachPointId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the zero-based index of the point.
    pub fn index(self) -> usize {
        self.0
    }

    /// Returns whether this id addresses a point of a node with `capacity`.
    pub fn fits(self, capacity: AttachPointCapacity) -> bool {
        self.0 < capacity.get()
    }

    /// Clamps a possibly stale id to the last valid index of `capacity`.
    pub fn clamped(self, capacity: AttachPointCapacity) -> Self {
        Self(self.0.min(capacity.get() - 1))
    }
}

impl fmt::Display for AttachPointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "point-{}", self.0)
    }
}

impl FromStr for AttachPointId {
    type Err = String;

    /// Parses `point-i`, optionally prefixed by a handle role such as
    /// `source-` or `target-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let index = s
            .rsplit_once("point-")
            .map(|(_, index)| index)
            .ok_or_else(|| format!("invalid attach point id `{s}`"))?;
        index
            .parse()
            .map(Self)
            .map_err(|err| format!("invalid attach point id `{s}`: {err}"))
    }
}

/// A point on a node perimeter where an arc may terminate.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachPoint {
    id: AttachPointId,
    coordinates: Point,
    angle: f32,
    used: bool,
    usage_count: u32,
}

impl AttachPoint {
    fn new(index: usize, coordinates: Point, angle: f32) -> Self {
        Self {
            id: AttachPointId::new(index),
            coordinates,
            angle,
            used: false,
            usage_count: 0,
        }
    }

    pub fn id(&self) -> AttachPointId {
        self.id
    }

    /// Absolute coordinates of the point.
    pub fn coordinates(&self) -> Point {
        self.coordinates
    }

    /// Angle in degrees the point was derived from.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Whether an arc has been attached to this point in the current batch.
    pub fn is_used(&self) -> bool {
        self.used
    }

    /// How many arcs have been attached to this point in the current batch.
    pub fn usage_count(&self) -> u32 {
        self.usage_count
    }

    /// Records one more arc attached to this point.
    pub fn mark_used(&mut self) {
        self.used = true;
        self.usage_count += 1;
    }
}

/// Generates the attach points of a node.
///
/// `position` is the node's top-left anchor. The requested capacity is
/// limited to [`ShapeKind::max_capacity`], so unknown shapes always get four
/// points.
///
/// # Examples
///
/// ```
/// use petri_layout_core::{
///     attach::{AttachPointCapacity, generate_attach_points},
///     geometry::Point,
///     shape::ShapeKind,
/// };
///
/// let points = generate_attach_points(
///     ShapeKind::Transition,
///     Point::new(0.0, 0.0),
///     AttachPointCapacity::MIN,
/// );
///
/// // top, right, bottom, left midpoints of an 80x50 rectangle
/// assert_eq!(points[0].coordinates(), Point::new(40.0, 0.0));
/// assert_eq!(points[1].coordinates(), Point::new(80.0, 25.0));
/// assert_eq!(points[2].coordinates(), Point::new(40.0, 50.0));
/// assert_eq!(points[3].coordinates(), Point::new(0.0, 25.0));
/// ```
pub fn generate_attach_points(
    kind: ShapeKind,
    position: Point,
    capacity: AttachPointCapacity,
) -> Vec<AttachPoint> {
    let capacity = capacity.min(kind.max_capacity());
    let size = kind.size();
    let center = position.add_point(size.half());

    match kind {
        ShapeKind::Place => circle_points(center, size.width() / 2.0, capacity.get()),
        ShapeKind::Transition | ShapeKind::Unknown => {
            rectangle_points(center, size, capacity.get())
        }
    }
}

/// Regenerates the attach points of a node, carrying `used` and
/// `usage_count` over from `previous` for every id that already existed.
pub fn regenerate_attach_points(
    previous: &[AttachPoint],
    kind: ShapeKind,
    position: Point,
    capacity: AttachPointCapacity,
) -> Vec<AttachPoint> {
    let mut points = generate_attach_points(kind, position, capacity);
    for point in &mut points {
        if let Some(old) = previous.iter().find(|old| old.id == point.id) {
            point.used = old.used;
            point.usage_count = old.usage_count;
        }
    }
    points
}

fn circle_points(center: Point, radius: f32, count: usize) -> Vec<AttachPoint> {
    (0..count)
        .map(|index| {
            let angle = index as f32 * 360.0 / count as f32;
            let (sin, cos) = angle.to_radians().sin_cos();
            let offset = Point::new(radius * cos, radius * sin);
            AttachPoint::new(index, center.add_point(offset), angle)
        })
        .collect()
}

fn rectangle_points(center: Point, size: Size, count: usize) -> Vec<AttachPoint> {
    let half_width = size.width() / 2.0;
    let half_height = size.height() / 2.0;

    let cardinals = [
        (270.0, Point::new(0.0, -half_height)),
        (0.0, Point::new(half_width, 0.0)),
        (90.0, Point::new(0.0, half_height)),
        (180.0, Point::new(-half_width, 0.0)),
    ];

    let mut points: Vec<AttachPoint> = cardinals
        .into_iter()
        .enumerate()
        .map(|(index, (angle, offset))| AttachPoint::new(index, center.add_point(offset), angle))
        .collect();

    let extra = count.saturating_sub(cardinals.len());
    for j in 0..extra {
        let angle = (j as f32 + 0.5) * 360.0 / extra as f32;
        let offset = project_onto_rectangle(angle, half_width, half_height);
        points.push(AttachPoint::new(
            cardinals.len() + j,
            center.add_point(offset),
            angle,
        ));
    }

    points
}

/// Projects a ray cast from the rectangle center at `angle` degrees onto the
/// side it crosses, returning the offset from the center.
fn project_onto_rectangle(angle: f32, half_width: f32, half_height: f32) -> Point {
    let angle = angle.rem_euclid(360.0);
    let tan = angle.to_radians().tan();
    // Angle from the center to the bottom-right corner.
    let corner = half_height.atan2(half_width).to_degrees();

    if angle <= corner || angle >= 360.0 - corner {
        // right side
        Point::new(half_width, half_width * tan)
    } else if angle < 180.0 - corner {
        // bottom side
        Point::new(half_height / tan, half_height)
    } else if angle <= 180.0 + corner {
        // left side
        Point::new(-half_width, -half_width * tan)
    } else {
        // top side
        Point::new(-half_height / tan, -half_height)
    }
}
