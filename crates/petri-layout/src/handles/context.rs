//! Mutable attach point state shared by all arcs of one resolution pass.

use indexmap::IndexMap;

use petri_layout_core::{
    attach::{
        AttachPoint, AttachPointCapacity, AttachPointId, generate_attach_points,
        regenerate_attach_points,
    },
    geometry::Point,
    identifier::Id,
    shape::ShapeKind,
};

/// Attach points of one node together with the shape they were generated for.
#[derive(Debug, Clone)]
pub struct NodeAttachState {
    kind: ShapeKind,
    position: Point,
    capacity: AttachPointCapacity,
    points: Vec<AttachPoint>,
}

impl NodeAttachState {
    /// Generates the points of a node at `position` (top-left).
    ///
    /// `capacity` is limited to what `kind` supports.
    pub fn new(kind: ShapeKind, position: Point, capacity: AttachPointCapacity) -> Self {
        let capacity = capacity.min(kind.max_capacity());
        let points = generate_attach_points(kind, position, capacity);
        Self {
            kind,
            position,
            capacity,
            points,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn capacity(&self) -> AttachPointCapacity {
        self.capacity
    }

    pub fn points(&self) -> &[AttachPoint] {
        &self.points
    }

    /// Moves the node, recomputing point coordinates and keeping usage.
    pub fn move_to(&mut self, position: Point) {
        self.position = position;
        self.points = regenerate_attach_points(&self.points, self.kind, position, self.capacity);
    }

    /// Grows the capacity by one step, returning `false` once the shape's
    /// maximum is reached.
    pub fn grow(&mut self) -> bool {
        match self.capacity.grown(self.kind.max_capacity()) {
            Some(capacity) => {
                self.capacity = capacity;
                self.points =
                    regenerate_attach_points(&self.points, self.kind, self.position, capacity);
                true
            }
            None => false,
        }
    }

    /// Points no arc has claimed yet.
    pub fn unused_points(&self) -> impl Iterator<Item = &AttachPoint> + Clone {
        self.points.iter().filter(|point| !point.is_used())
    }

    /// Marks a point as claimed by one more arc.
    ///
    /// Returns `false` if the id does not belong to this node.
    pub fn mark_used(&mut self, id: AttachPointId) -> bool {
        match self.points.get_mut(id.index()) {
            Some(point) => {
                point.mark_used();
                true
            }
            None => false,
        }
    }
}

/// Attach point state of every node, in input order.
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    nodes: IndexMap<Id, NodeAttachState>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: Id, state: NodeAttachState) {
        self.nodes.insert(id, state);
    }

    pub fn contains(&self, id: Id) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: Id) -> Option<&NodeAttachState> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: Id) -> Option<&mut NodeAttachState> {
        self.nodes.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Id, &NodeAttachState)> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Id, &mut NodeAttachState)> {
        self.nodes.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
