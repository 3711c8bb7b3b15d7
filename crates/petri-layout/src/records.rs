//! Serializable node, arc and document records.
//!
//! Field names follow the camelCase JSON used by diagram editors. Input
//! records are [`NodeRecord`] and [`EdgeRecord`]; a layout pass turns them into
//! [`PositionedNode`] and [`RoutedEdge`], which flatten the input record and
//! add the computed fields.

use serde::{Deserialize, Serialize};

use petri_layout_core::{
    attach::AttachPoint, color::Color, geometry::Point, shape::ShapeKind,
};

use crate::{error::PetriLayoutError, layout::LayoutDirection, statistics::NetStatistics};

/// Edge type understood by the rendering layer.
pub const EDGE_TYPE: &str = "smoothstep";

/// Arrow marker drawn at the target end of every arc.
pub const MARKER_TYPE: &str = "arrowclosed";

/// Width and height of the arrow marker.
pub const MARKER_SIZE: u32 = 20;

/// Stroke width of every arc.
pub const STROKE_WIDTH: u32 = 2;

/// Top-left anchor of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Self {
            x: point.x(),
            y: point.y(),
        }
    }
}

impl From<Position> for Point {
    fn from(position: Position) -> Self {
        Point::new(position.x, position.y)
    }
}

/// Free-form attributes carried by a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_initial_marking: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_final_marking: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_invisible: Option<bool>,

    /// Attach point capacity from a previous layout pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attach_points: Option<usize>,
}

/// A place or transition as it arrives from the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,

    #[serde(alias = "type")]
    pub shape_kind: ShapeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    #[serde(default)]
    pub attributes: NodeAttributes,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>, shape_kind: ShapeKind) -> Self {
        Self {
            id: id.into(),
            shape_kind,
            position: None,
            attributes: NodeAttributes::default(),
        }
    }

    pub fn place(id: impl Into<String>) -> Self {
        Self::new(id, ShapeKind::Place)
    }

    pub fn transition(id: impl Into<String>) -> Self {
        Self::new(id, ShapeKind::Transition)
    }

    /// Sets the capacity carried over from a previous pass.
    pub fn with_attach_points(mut self, count: usize) -> Self {
        self.attributes.attach_points = Some(count);
        self
    }

    pub fn with_tokens(mut self, tokens: u32) -> Self {
        self.attributes.tokens = Some(tokens);
        self
    }

    /// Display label, defaulting to the id.
    pub fn label(&self) -> &str {
        self.attributes.label.as_deref().unwrap_or(&self.id)
    }

    /// Name, defaulting to the label.
    pub fn name(&self) -> &str {
        self.attributes.name.as_deref().unwrap_or_else(|| self.label())
    }

    /// Fills in a missing label and name.
    pub fn normalized(mut self) -> Self {
        let label = self.label().to_string();
        let name = self.name().to_string();
        self.attributes.label = Some(label);
        self.attributes.name = Some(name);
        self
    }
}

/// A directed arc as it arrives from the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub id: String,
    pub source: String,
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

impl EdgeRecord {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            weight: None,
        }
    }
}

/// Side of a node arcs leave from or arrive at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorSide {
    Top,
    Right,
    Bottom,
    Left,
}

/// An attach point as written to the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachPointRecord {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

impl From<&AttachPoint> for AttachPointRecord {
    fn from(point: &AttachPoint) -> Self {
        let coordinates = point.coordinates();
        Self {
            id: point.id().to_string(),
            x: coordinates.x(),
            y: coordinates.y(),
        }
    }
}

/// A node after layout.
///
/// The flattened record carries the final `position` and the capacity in
/// `attributes.attachPoints`, so it can be fed back into a relayout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    #[serde(flatten)]
    pub record: NodeRecord,
    pub source_anchor_side: AnchorSide,
    pub target_anchor_side: AnchorSide,
    pub attach_point_capacity: usize,
    pub attach_points: Vec<AttachPointRecord>,
}

impl PositionedNode {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Final top-left position.
    pub fn position(&self) -> Position {
        self.record.position.unwrap_or_default()
    }

    /// Converts back into an input record for a later relayout.
    pub fn into_record(self) -> NodeRecord {
        self.record
    }
}

/// Arrow marker metadata of an arc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerEnd {
    #[serde(rename = "type")]
    pub kind: String,
    pub width: u32,
    pub height: u32,
    pub color: String,
}

/// Stroke metadata of an arc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: u32,
}

/// An arc after handle assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedEdge {
    #[serde(flatten)]
    pub record: EdgeRecord,
    pub source_handle: String,
    pub target_handle: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub animated: bool,
    pub marker_end: MarkerEnd,
    pub style: EdgeStyle,
}

impl RoutedEdge {
    /// Builds a routed arc with the fixed presentation metadata.
    pub fn new(
        record: EdgeRecord,
        source_handle: String,
        target_handle: String,
        color: Color,
    ) -> Self {
        let color = color.to_hex_string();
        Self {
            record,
            source_handle,
            target_handle,
            edge_type: EDGE_TYPE.to_string(),
            animated: false,
            marker_end: MarkerEnd {
                kind: MARKER_TYPE.to_string(),
                width: MARKER_SIZE,
                height: MARKER_SIZE,
                color: color.clone(),
            },
            style: EdgeStyle {
                stroke: color,
                stroke_width: STROKE_WIDTH,
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Converts back into an input record for a later relayout.
    pub fn into_record(self) -> EdgeRecord {
        self.record
    }
}

/// A net as exchanged with the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_name: Option<String>,

    pub nodes: Vec<NodeRecord>,

    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl NetDocument {
    /// Parses a JSON net document.
    ///
    /// # Errors
    ///
    /// Returns [`PetriLayoutError::Parse`] carrying `src` for diagnostics.
    pub fn from_json(src: &str) -> Result<Self, PetriLayoutError> {
        serde_json::from_str(src).map_err(|err| PetriLayoutError::new_parse_error(err, src))
    }
}

/// A net after layout, ready to be written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedNetDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_name: Option<String>,

    pub direction: LayoutDirection,

    pub nodes: Vec<PositionedNode>,

    pub edges: Vec<RoutedEdge>,

    pub statistics: NetStatistics,
}

impl RoutedNetDocument {
    /// Serializes the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PetriLayoutError::Serialize`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, PetriLayoutError> {
        serde_json::to_string_pretty(self).map_err(PetriLayoutError::Serialize)
    }

    /// Converts back into an input document for a later relayout.
    pub fn into_document(self) -> NetDocument {
        NetDocument {
            network_id: self.network_id,
            network_name: self.network_name,
            nodes: self.nodes.into_iter().map(PositionedNode::into_record).collect(),
            edges: self.edges.into_iter().map(RoutedEdge::into_record).collect(),
        }
    }
}
