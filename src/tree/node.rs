//! Tree nodes and the payload used to grow a tree

use super::MoveCode;
use crate::identifiers::NodeId;

/// One position reached by playing a move from its parent.
///
/// The root carries the starting position and no move. `children[0]` is the
/// mainline continuation; later entries are variations from the same position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveNode {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Human-readable notation (SAN), absent at the root
    pub san: Option<String>,
    pub move_code: Option<MoveCode>,
    /// Full position string (FEN)
    pub position: String,
    pub ply: u32,
}

impl MoveNode {
    pub fn root(id: NodeId, position: impl Into<String>) -> Self {
        Self {
            id,
            parent_id: None,
            children: Vec::new(),
            san: None,
            move_code: None,
            position: position.into(),
            ply: 0,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The first child, if any.
    pub fn mainline_child(&self) -> Option<&NodeId> {
        self.children.first()
    }
}

/// What a new child node records: the move that produced it and the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub san: Option<String>,
    pub move_code: Option<MoveCode>,
    pub position: String,
}

impl MoveRecord {
    pub fn new(position: impl Into<String>) -> Self {
        Self {
            san: None,
            move_code: None,
            position: position.into(),
        }
    }

    pub fn with_san(mut self, san: impl Into<String>) -> Self {
        self.san = Some(san.into());
        self
    }

    pub fn with_move_code(mut self, code: MoveCode) -> Self {
        self.move_code = Some(code);
        self
    }
}
