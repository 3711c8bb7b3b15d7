//! Assignment of arc endpoints to node attach points.
//!
//! Arcs are resolved one at a time, in input order, against a shared
//! [`ResolutionContext`]. For each arc the resolver walks a small state
//! machine:
//!
//! ```text
//! Seek(Initial) ──found──────────────────────────────▶ Done(Unused)
//!     │ none
//!     ▼
//! ExpandSource ──grown──▶ Seek(AfterSource) ──found──▶ Done(Expanded)
//!     │ at max                │ none
//!     ▼                       ▼
//! ExpandTarget ◀──────────────┘
//!     │ grown ──▶ Seek(AfterTarget) ──found──────────▶ Done(Expanded)
//!     │ at max                │ none
//!     ▼                       ▼
//! Reuse ────────────────────────────────────────────▶ Done(Reused)
//! ```
//!
//! Seeking picks the unused pair with the smallest straight-line distance;
//! ties go to the pair found first when iterating source points, then target
//! points, by index. Reuse picks the pair with the lowest combined usage,
//! then the shortest distance.

mod context;

use std::fmt;

use log::{trace, warn};

use petri_layout_core::{
    attach::{AttachPoint, AttachPointCapacity, AttachPointId},
    identifier::Id,
};

pub use context::{NodeAttachState, ResolutionContext};

/// How an arc's pair of points was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleResolution {
    /// Both points were free.
    Unused,
    /// Free points appeared after growing a node's capacity.
    Expanded,
    /// Both nodes were full, so already claimed points are shared.
    Reused,
    /// An endpoint names a node that does not exist.
    Dangling,
}

impl fmt::Display for HandleResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandleResolution::Unused => "unused",
            HandleResolution::Expanded => "expanded",
            HandleResolution::Reused => "reused",
            HandleResolution::Dangling => "dangling",
        };
        f.write_str(name)
    }
}

/// Attach points chosen for one arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleAssignment {
    source: AttachPointId,
    target: AttachPointId,
    resolution: HandleResolution,
}

impl HandleAssignment {
    pub fn new(source: AttachPointId, target: AttachPointId, resolution: HandleResolution) -> Self {
        Self {
            source,
            target,
            resolution,
        }
    }

    pub fn source(&self) -> AttachPointId {
        self.source
    }

    pub fn target(&self) -> AttachPointId {
        self.target
    }

    pub fn resolution(&self) -> HandleResolution {
        self.resolution
    }

    /// Handle name of the source end, such as `source-point-3`.
    pub fn source_handle(&self) -> String {
        format!("source-{}", self.source)
    }

    /// Handle name of the target end, such as `target-point-5`.
    pub fn target_handle(&self) -> String {
        format!("target-{}", self.target)
    }
}

/// Which growth steps have already been tried for the current arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Initial,
    AfterSource,
    AfterTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolveState {
    Seek(Stage),
    ExpandSource,
    ExpandTarget,
    Reuse,
    Done(AttachPointId, AttachPointId, HandleResolution),
}

/// Resolves arcs to attach point pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver;

impl Resolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves every arc in order, returning one assignment per arc.
    pub fn resolve_all(
        &self,
        context: &mut ResolutionContext,
        arcs: &[(Id, Id)],
    ) -> Vec<HandleAssignment> {
        arcs.iter()
            .map(|&(source, target)| self.resolve(context, source, target))
            .collect()
    }

    /// Resolves one arc and marks its points as used.
    ///
    /// Arcs naming an unknown node get `point-0` on both ends and leave the
    /// context untouched.
    pub fn resolve(
        &self,
        context: &mut ResolutionContext,
        source: Id,
        target: Id,
    ) -> HandleAssignment {
        if !context.contains(source) || !context.contains(target) {
            warn!(source:% = source, target:% = target; "Arc references an unknown node");
            return HandleAssignment::new(
                AttachPointId::default(),
                AttachPointId::default(),
                HandleResolution::Dangling,
            );
        }

        let mut state = ResolveState::Seek(Stage::Initial);
        let (source_point, target_point, resolution) = loop {
            state = match state {
                ResolveState::Seek(stage) => match nearest_unused(context, source, target) {
                    Some((s, t)) => {
                        let resolution = match stage {
                            Stage::Initial => HandleResolution::Unused,
                            Stage::AfterSource | Stage::AfterTarget => HandleResolution::Expanded,
                        };
                        ResolveState::Done(s, t, resolution)
                    }
                    None => match stage {
                        Stage::Initial => ResolveState::ExpandSource,
                        Stage::AfterSource => ResolveState::ExpandTarget,
                        Stage::AfterTarget => ResolveState::Reuse,
                    },
                },
                ResolveState::ExpandSource => {
                    if grow(context, source) {
                        ResolveState::Seek(Stage::AfterSource)
                    } else {
                        ResolveState::ExpandTarget
                    }
                }
                ResolveState::ExpandTarget => {
                    if grow(context, target) {
                        ResolveState::Seek(Stage::AfterTarget)
                    } else {
                        ResolveState::Reuse
                    }
                }
                ResolveState::Reuse => {
                    let (s, t) = least_used(context, source, target);
                    ResolveState::Done(s, t, HandleResolution::Reused)
                }
                ResolveState::Done(s, t, resolution) => break (s, t, resolution),
            };
        };

        let source_point = claim(context, source, source_point);
        let target_point = claim(context, target, target_point);

        trace!(
            source:% = source,
            target:% = target,
            source_point:% = source_point,
            target_point:% = target_point,
            resolution:% = resolution;
            "Resolved arc handles"
        );
        HandleAssignment::new(source_point, target_point, resolution)
    }
}

fn grow(context: &mut ResolutionContext, id: Id) -> bool {
    context.node_mut(id).is_some_and(NodeAttachState::grow)
}

/// Clamps `point` into the node's capacity and marks it used.
fn claim(context: &mut ResolutionContext, id: Id, point: AttachPointId) -> AttachPointId {
    let Some(node) = context.node_mut(id) else {
        return point;
    };
    let point = validated(point, node.capacity(), id);
    node.mark_used(point);
    point
}

fn validated(point: AttachPointId, capacity: AttachPointCapacity, id: Id) -> AttachPointId {
    if point.fits(capacity) {
        point
    } else {
        let clamped = point.clamped(capacity);
        warn!(
            node:% = id,
            point:% = point,
            clamped:% = clamped;
            "Attach point out of range, clamping"
        );
        clamped
    }
}

/// Candidate point pairs of an arc, skipping a self-loop's same-point pairs.
fn pairs<'a>(
    sources: impl Iterator<Item = &'a AttachPoint> + 'a,
    targets: impl Iterator<Item = &'a AttachPoint> + Clone + 'a,
    self_loop: bool,
) -> impl Iterator<Item = (&'a AttachPoint, &'a AttachPoint)> + 'a {
    sources.flat_map(move |s| {
        targets
            .clone()
            .filter(move |t| !(self_loop && s.id() == t.id()))
            .map(move |t| (s, t))
    })
}

fn nearest_unused(
    context: &ResolutionContext,
    source: Id,
    target: Id,
) -> Option<(AttachPointId, AttachPointId)> {
    let source_node = context.node(source)?;
    let target_node = context.node(target)?;

    let mut best: Option<(f32, AttachPointId, AttachPointId)> = None;
    for (s, t) in pairs(
        source_node.unused_points(),
        target_node.unused_points(),
        source == target,
    ) {
        let distance = s.coordinates().distance(t.coordinates());
        if best.is_none_or(|(best_distance, _, _)| distance < best_distance) {
            best = Some((distance, s.id(), t.id()));
        }
    }
    best.map(|(_, s, t)| (s, t))
}

fn least_used(
    context: &ResolutionContext,
    source: Id,
    target: Id,
) -> (AttachPointId, AttachPointId) {
    let (Some(source_node), Some(target_node)) = (context.node(source), context.node(target))
    else {
        return (AttachPointId::default(), AttachPointId::default());
    };

    let mut best: Option<(u32, f32, AttachPointId, AttachPointId)> = None;
    for (s, t) in pairs(
        source_node.points().iter(),
        target_node.points().iter(),
        source == target,
    ) {
        let usage = s.usage_count() + t.usage_count();
        let distance = s.coordinates().distance(t.coordinates());
        let better = best.is_none_or(|(best_usage, best_distance, _, _)| {
            usage < best_usage || (usage == best_usage && distance < best_distance)
        });
        if better {
            best = Some((usage, distance, s.id(), t.id()));
        }
    }
    best.map(|(_, _, s, t)| (s, t)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use petri_layout_core::{geometry::Point, shape::ShapeKind};

    use super::*;

    fn context(nodes: &[(&str, ShapeKind, Point, usize)]) -> ResolutionContext {
        let mut context = ResolutionContext::new();
        for (name, kind, position, capacity) in nodes {
            context.insert(
                Id::new(name),
                NodeAttachState::new(*kind, *position, AttachPointCapacity::normalized(*capacity)),
            );
        }
        context
    }

    #[test]
    fn test_nearest_unused_pair_faces_each_other() {
        let mut context = context(&[
            ("hn_p", ShapeKind::Place, Point::new(0.0, 0.0), 4),
            ("hn_t", ShapeKind::Transition, Point::new(200.0, 5.0), 4),
        ]);

        let assignment = Resolver::new().resolve(&mut context, Id::new("hn_p"), Id::new("hn_t"));

        // Right of the circle to left of the rectangle
        assert_eq!(assignment.source(), AttachPointId::new(0));
        assert_eq!(assignment.target(), AttachPointId::new(3));
        assert_eq!(assignment.resolution(), HandleResolution::Unused);
        assert_eq!(assignment.source_handle(), "source-point-0");
        assert_eq!(assignment.target_handle(), "target-point-3");

        let place = context.node(Id::new("hn_p")).expect("place exists");
        assert!(place.points()[0].is_used());
        assert_eq!(place.unused_points().count(), 3);
    }

    #[test]
    fn test_points_are_not_shared_while_free_ones_remain() {
        let mut context = context(&[
            ("hs_p", ShapeKind::Place, Point::new(0.0, 0.0), 4),
            ("hs_t", ShapeKind::Transition, Point::new(200.0, 5.0), 4),
        ]);
        let arcs: Vec<(Id, Id)> = (0..4).map(|_| (Id::new("hs_p"), Id::new("hs_t"))).collect();

        let assignments = Resolver::new().resolve_all(&mut context, &arcs);

        let mut sources: Vec<usize> = assignments.iter().map(|a| a.source().index()).collect();
        sources.sort_unstable();
        assert_eq!(sources, vec![0, 1, 2, 3]);
        assert!(assignments
            .iter()
            .all(|a| a.resolution() == HandleResolution::Unused));
    }

    #[test]
    fn test_expands_source_before_target() {
        let mut context = context(&[
            ("he_p", ShapeKind::Place, Point::new(0.0, 0.0), 4),
            ("he_t", ShapeKind::Transition, Point::new(200.0, 5.0), 4),
        ]);
        let arcs: Vec<(Id, Id)> = (0..5).map(|_| (Id::new("he_p"), Id::new("he_t"))).collect();

        let assignments = Resolver::new().resolve_all(&mut context, &arcs);

        assert_eq!(assignments[4].resolution(), HandleResolution::Expanded);
        let source = context.node(Id::new("he_p")).expect("place exists");
        let target = context.node(Id::new("he_t")).expect("transition exists");
        assert_eq!(source.capacity().get(), 8);
        assert_eq!(target.capacity().get(), 8);
        assert!(assignments[4].source().fits(source.capacity()));
        assert!(assignments[4].target().index() >= 4);
    }

    #[test]
    fn test_full_nodes_share_least_used_points() {
        let mut context = context(&[
            ("hr_p", ShapeKind::Place, Point::new(0.0, 0.0), 12),
            ("hr_t", ShapeKind::Transition, Point::new(200.0, 5.0), 12),
        ]);
        let arcs: Vec<(Id, Id)> = (0..13).map(|_| (Id::new("hr_p"), Id::new("hr_t"))).collect();

        let assignments = Resolver::new().resolve_all(&mut context, &arcs);

        assert!(assignments[..12]
            .iter()
            .all(|a| a.resolution() == HandleResolution::Unused));
        let last = assignments[12];
        assert_eq!(last.resolution(), HandleResolution::Reused);
        assert!(last.source().index() < 12);
        assert!(last.target().index() < 12);

        let source = context.node(Id::new("hr_p")).expect("place exists");
        let shared = &source.points()[last.source().index()];
        assert_eq!(shared.usage_count(), 2);
    }

    #[test]
    fn test_self_loop_uses_two_distinct_points() {
        let mut context = context(&[("hl_t", ShapeKind::Transition, Point::new(0.0, 0.0), 4)]);

        let assignment = Resolver::new().resolve(&mut context, Id::new("hl_t"), Id::new("hl_t"));

        assert_ne!(assignment.source(), assignment.target());
        let node = context.node(Id::new("hl_t")).expect("transition exists");
        assert_eq!(node.unused_points().count(), 2);
    }

    #[test]
    fn test_dangling_arc_leaves_context_untouched() {
        let mut context = context(&[("hd_p", ShapeKind::Place, Point::new(0.0, 0.0), 4)]);

        let assignment =
            Resolver::new().resolve(&mut context, Id::new("hd_p"), Id::new("hd_missing"));

        assert_eq!(assignment.resolution(), HandleResolution::Dangling);
        assert_eq!(assignment.source_handle(), "source-point-0");
        assert_eq!(assignment.target_handle(), "target-point-0");
        let node = context.node(Id::new("hd_p")).expect("place exists");
        assert_eq!(node.unused_points().count(), 4);
    }

    #[test]
    fn test_unknown_shapes_never_grow() {
        let mut context = context(&[
            ("hu_a", ShapeKind::Unknown, Point::new(0.0, 0.0), 12),
            ("hu_b", ShapeKind::Unknown, Point::new(300.0, 0.0), 12),
        ]);
        let arcs: Vec<(Id, Id)> = (0..5).map(|_| (Id::new("hu_a"), Id::new("hu_b"))).collect();

        let assignments = Resolver::new().resolve_all(&mut context, &arcs);

        assert_eq!(assignments[4].resolution(), HandleResolution::Reused);
        let node = context.node(Id::new("hu_a")).expect("node exists");
        assert_eq!(node.capacity(), AttachPointCapacity::MIN);
    }

    #[test]
    fn test_validated_clamps_stale_ids() {
        let id = Id::new("hv_p");

        assert_eq!(
            validated(AttachPointId::new(9), AttachPointCapacity::MIN, id),
            AttachPointId::new(3)
        );
        assert_eq!(
            validated(AttachPointId::new(2), AttachPointCapacity::MIN, id),
            AttachPointId::new(2)
        );
    }
}
