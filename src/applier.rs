//! Move applier: bridges a move tree to the rules engine

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    identifiers::NodeId,
    ports::{AppliedMove, CandidateMove, MoveRequest, RulesEngine},
    tree::{MoveNode, MoveRecord, MoveTree},
};

/// What to do when the requested move already exists as a child of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateMovePolicy {
    /// Always append, even if an identical sibling exists.
    #[default]
    AppendVariation,
    /// Return the existing child instead of appending a copy.
    ReuseExisting,
}

impl fmt::Display for DuplicateMovePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateMovePolicy::AppendVariation => write!(f, "append"),
            DuplicateMovePolicy::ReuseExisting => write!(f, "reuse"),
        }
    }
}

impl FromStr for DuplicateMovePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" | "append-variation" => Ok(DuplicateMovePolicy::AppendVariation),
            "reuse" | "reuse-existing" => Ok(DuplicateMovePolicy::ReuseExisting),
            other => Err(Error::InvalidConfiguration {
                message: format!("unknown duplicate-move policy '{other}' (expected append or reuse)"),
            }),
        }
    }
}

/// Applies engine-validated moves to a tree.
///
/// # Examples
///
/// ```
/// use movetree::adapters::ShakmatyEngine;
/// use movetree::applier::MoveApplier;
/// use movetree::tree::MoveTree;
///
/// let engine = ShakmatyEngine::new();
/// let applier = MoveApplier::new(&engine);
/// let mut tree = MoveTree::new("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
/// let root = tree.root_id().clone();
///
/// let e4 = applier.apply_move(&mut tree, &root, &"e2e4".parse()?)?;
/// assert_eq!(tree.get(&e4).unwrap().san.as_deref(), Some("e4"));
/// # Ok::<(), movetree::Error>(())
/// ```
#[derive(Clone, Copy)]
pub struct MoveApplier<'e> {
    engine: &'e dyn RulesEngine,
    policy: DuplicateMovePolicy,
}

impl<'e> MoveApplier<'e> {
    pub fn new(engine: &'e dyn RulesEngine) -> Self {
        Self {
            engine,
            policy: DuplicateMovePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DuplicateMovePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DuplicateMovePolicy {
        self.policy
    }

    /// Legal moves from the position at `node_id`.
    pub fn legal_moves(&self, tree: &MoveTree, node_id: &NodeId) -> Result<Vec<CandidateMove>> {
        let node = tree.node(node_id)?;
        self.engine.legal_moves(&node.position)
    }

    /// Play `request` from `from` and return the id of the resulting node.
    ///
    /// # Errors
    ///
    /// `NotFound` if `from` is absent; `IllegalMove` (tree untouched) if the
    /// engine rejects the move.
    pub fn apply_move(
        &self,
        tree: &mut MoveTree,
        from: &NodeId,
        request: &MoveRequest,
    ) -> Result<NodeId> {
        self.apply(tree, from, request, None)
    }

    /// Like [`apply_move`](Self::apply_move), but fails with `Conflict` if
    /// `from` no longer has `expected_children` children.
    pub fn apply_move_expecting(
        &self,
        tree: &mut MoveTree,
        from: &NodeId,
        expected_children: usize,
        request: &MoveRequest,
    ) -> Result<NodeId> {
        self.apply(tree, from, request, Some(expected_children))
    }

    fn apply(
        &self,
        tree: &mut MoveTree,
        from: &NodeId,
        request: &MoveRequest,
        expected_children: Option<usize>,
    ) -> Result<NodeId> {
        let position = tree.node(from)?.position.clone();
        let applied = self
            .engine
            .apply_move(&position, request)
            .inspect_err(|e| tracing::debug!(node = %from, %request, error = %e, "move rejected"))?;

        if self.policy == DuplicateMovePolicy::ReuseExisting
            && let Some(existing) = tree.find_child(from, |child| same_move(child, &applied))?
        {
            tracing::debug!(node = %from, child = %existing.id, %request, "reusing existing child");
            return Ok(existing.id.clone());
        }

        let record = MoveRecord::new(applied.position)
            .with_san(applied.san)
            .with_move_code(applied.move_code);
        match expected_children {
            Some(expected) => tree.add_child_expecting(from, expected, record),
            None => tree.add_child(from, record),
        }
    }
}

/// Compare by move code when the child has one, by notation otherwise.
fn same_move(child: &MoveNode, applied: &AppliedMove) -> bool {
    match child.move_code {
        Some(code) => code == applied.move_code,
        None => child.san.as_deref() == Some(applied.san.as_str()),
    }
}
