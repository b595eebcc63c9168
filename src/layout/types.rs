use serde::Serialize;

use crate::ir::LocationId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Location,
}

/// Original record fields plus the levels the engine assigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub id: LocationId,
    pub name: String,
    pub type_name: String,
    pub parent_id: Option<LocationId>,
    /// Child count used for ordering: the record's own value, or the number of
    /// children present in the snapshot when the record had none.
    pub child_count: u32,
    pub description: Option<String>,
    pub level: i32,
    pub visual_level: usize,
    pub level_index: usize,
}

/// A laid-out location. `position` is the centre of the node's box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    pub id: LocationId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub width: f32,
    pub height: f32,
    pub position: Position,
    pub data: NodeData,
}

impl PositionedNode {
    pub fn left(&self) -> f32 {
        self.position.x - self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.width / 2.0
    }

    pub fn top(&self) -> f32 {
        self.position.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.height / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: LocationId,
    pub target: LocationId,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub(crate) fn of_nodes(nodes: &[PositionedNode]) -> Self {
        let mut iter = nodes.iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        let mut bounds = Self {
            min_x: first.left(),
            min_y: first.top(),
            max_x: first.right(),
            max_y: first.bottom(),
        };
        for node in iter {
            bounds.min_x = bounds.min_x.min(node.left());
            bounds.min_y = bounds.min_y.min(node.top());
            bounds.max_x = bounds.max_x.max(node.right());
            bounds.max_y = bounds.max_y.max(node.bottom());
        }
        bounds
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<Edge>,
    /// Diagram origin picked by the level assigner.
    pub root_id: Option<LocationId>,
    pub bounds: Bounds,
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.id.as_str() == id)
    }
}
