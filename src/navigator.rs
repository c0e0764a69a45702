//! Session cursor over a move tree
//!
//! A [`Navigator`] owns the tree of one session together with the node where
//! play currently is. Moves made from a node that already has continuations
//! become new variations; the cursor then follows the new node.

use crate::{
    Result,
    applier::MoveApplier,
    identifiers::NodeId,
    ports::MoveRequest,
    tree::{IdAllocator, MoveNode, MoveTree},
};

/// Result of a single-step cursor movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The cursor moved to this node.
    Moved(NodeId),
    /// Already at the root; nothing changed.
    AtRoot,
    /// Already at a leaf; nothing changed.
    AtLeaf,
}

/// Cursor over one session's tree.
#[derive(Debug, Clone)]
pub struct Navigator {
    tree: MoveTree,
    current: NodeId,
}

impl Navigator {
    /// Start at the root of `tree`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the tree's root id has no node.
    pub fn new(tree: MoveTree) -> Result<Self> {
        tree.node(tree.root_id())?;
        let current = tree.root_id().clone();
        Ok(Self { tree, current })
    }

    /// Start a fresh one-node tree at `position`.
    pub fn from_position(position: impl Into<String>) -> Self {
        let tree = MoveTree::new(position);
        let current = tree.root_id().clone();
        Self { tree, current }
    }

    pub fn tree(&self) -> &MoveTree {
        &self.tree
    }

    /// Hand the tree back, ending the cursor.
    pub fn into_tree(self) -> MoveTree {
        self.tree
    }

    pub fn current_id(&self) -> &NodeId {
        &self.current
    }

    /// The node under the cursor.
    ///
    /// Nodes are never removed and every cursor move checks its target, so
    /// the cursor always resolves.
    pub fn current(&self) -> &MoveNode {
        self.tree
            .get(&self.current)
            .expect("cursor always points at an existing node")
    }

    /// Move the cursor to `id`.
    ///
    /// # Errors
    ///
    /// `NotFound` if `id` is not in the tree; the cursor stays put.
    pub fn goto_node(&mut self, id: &NodeId) -> Result<&MoveNode> {
        let node = self.tree.node(id)?;
        self.current = id.clone();
        Ok(node)
    }

    /// Step to the parent of the current node.
    pub fn back(&mut self) -> Step {
        match self.current().parent_id.clone() {
            Some(parent) if self.tree.contains(&parent) => {
                self.current = parent.clone();
                Step::Moved(parent)
            }
            _ => Step::AtRoot,
        }
    }

    /// Step to the mainline child of the current node.
    pub fn forward(&mut self) -> Step {
        match self.current().mainline_child().cloned() {
            Some(child) if self.tree.contains(&child) => {
                self.current = child.clone();
                Step::Moved(child)
            }
            _ => Step::AtLeaf,
        }
    }

    /// Nodes from the root to the cursor, inclusive.
    pub fn path(&self) -> Result<Vec<&MoveNode>> {
        self.tree.get_path(&self.current)
    }

    /// Children of the current node, mainline first.
    pub fn variations(&self) -> Vec<&MoveNode> {
        self.current()
            .children
            .iter()
            .filter_map(|id| self.tree.get(id))
            .collect()
    }

    /// Play `request` from the cursor and advance onto the resulting node.
    ///
    /// # Errors
    ///
    /// `IllegalMove` if the engine rejects the move; tree and cursor unchanged.
    pub fn play(&mut self, applier: &MoveApplier<'_>, request: &MoveRequest) -> Result<&MoveNode> {
        let id = applier.apply_move(&mut self.tree, &self.current, request)?;
        self.goto_node(&id)
    }

    /// Like [`play`](Self::play), failing with `Conflict` if the cursor node no
    /// longer has `expected_children` children.
    pub fn play_expecting(
        &mut self,
        applier: &MoveApplier<'_>,
        expected_children: usize,
        request: &MoveRequest,
    ) -> Result<&MoveNode> {
        let id = applier.apply_move_expecting(
            &mut self.tree,
            &self.current,
            expected_children,
            request,
        )?;
        self.goto_node(&id)
    }

    /// Supersede the tree with a fresh root at `position`, keeping the id strategy.
    pub fn reset(&mut self, position: impl Into<String>) {
        let strategy = self.tree.id_allocator().strategy();
        self.tree = MoveTree::with_allocator(position, IdAllocator::new(strategy));
        self.current = self.tree.root_id().clone();
    }
}
