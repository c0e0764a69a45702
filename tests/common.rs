//! Common test utilities for the movetree test suite.
//!
//! Provides a rules engine that accepts every coordinate move and a seeded
//! builder for branching trees.

use movetree::{
    MoveTree, NodeId, Result,
    ports::{AppliedMove, CandidateMove, MoveRequest, RulesEngine},
    tree::MoveRecord,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Standard starting position
pub const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Accepts any move; the resulting position appends the move to the old one.
pub struct EchoEngine;

impl RulesEngine for EchoEngine {
    fn legal_moves(&self, _position: &str) -> Result<Vec<CandidateMove>> {
        Ok(Vec::new())
    }

    fn apply_move(&self, position: &str, request: &MoveRequest) -> Result<AppliedMove> {
        Ok(AppliedMove {
            san: request.to_string(),
            move_code: request.move_code,
            position: format!("{position} {request}"),
        })
    }
}

const SQUARES: [&str; 8] = ["a", "b", "c", "d", "e", "f", "g", "h"];

fn random_code(rng: &mut StdRng) -> String {
    let from = (rng.random_range(0..8), rng.random_range(1..=8));
    let mut to = (rng.random_range(0..8), rng.random_range(1..=8));
    if to == from {
        to.1 = if from.1 == 8 { 1 } else { from.1 + 1 };
    }
    format!("{}{}{}{}", SQUARES[from.0], from.1, SQUARES[to.0], to.1)
}

/// A tree of exactly `nodes` nodes whose deepest node sits at `plies`.
///
/// A mainline of `plies` moves is laid down first; the remaining nodes hang
/// off random nodes above the deepest ply, so the tree branches.
pub fn branching_tree(nodes: usize, plies: u32, seed: u64) -> MoveTree {
    assert!(nodes > plies as usize, "need at least one node per ply plus the root");
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tree = MoveTree::new(START);

    let mut cursor = tree.root_id().clone();
    for _ in 0..plies {
        cursor = grow(&mut tree, &cursor, &mut rng);
    }

    while tree.len() < nodes {
        let mut candidates: Vec<NodeId> = tree
            .entries()
            .filter(|(_, node)| node.ply < plies)
            .map(|(id, _)| id.clone())
            .collect();
        candidates.sort();
        let parent = candidates[rng.random_range(0..candidates.len())].clone();
        grow(&mut tree, &parent, &mut rng);
    }
    tree
}

fn grow(tree: &mut MoveTree, parent: &NodeId, rng: &mut StdRng) -> NodeId {
    let code = random_code(rng);
    let position = format!("{} {code}", tree.get(parent).unwrap().position);
    let record = MoveRecord::new(position)
        .with_san(code.clone())
        .with_move_code(code.parse().unwrap());
    tree.add_child(parent, record).unwrap()
}
