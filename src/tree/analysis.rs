//! Shape statistics over a move tree
//!
//! Every walk here keeps a visited set, so adjacency that loops back on itself
//! (possible for decoded, not yet validated input) is visited once and the walk
//! ends in time proportional to the node count.

use std::collections::HashSet;

use serde::Serialize;

use super::MoveTree;
use crate::identifiers::NodeId;

/// Longest root-to-leaf distance in edges, following `children` lists.
///
/// Dangling child ids are ignored. Returns 0 when the root is missing.
pub fn max_depth(tree: &MoveTree) -> usize {
    let Some(root) = tree.root() else {
        return 0;
    };

    let mut deepest = 0;
    let mut visited: HashSet<&NodeId> = HashSet::from([&root.id]);
    let mut stack = vec![(root, 0usize)];

    while let Some((node, depth)) = stack.pop() {
        deepest = deepest.max(depth);
        for child_id in &node.children {
            if !visited.insert(child_id) {
                continue;
            }
            if let Some(child) = tree.get(child_id) {
                stack.push((child, depth + 1));
            }
        }
    }

    deepest
}

/// Number of variations reachable from the root: every child beyond the first.
pub fn count_variations(tree: &MoveTree) -> usize {
    reachable(tree)
        .into_iter()
        .filter_map(|id| tree.get(id))
        .map(|node| node.children.len().saturating_sub(1))
        .sum()
}

fn reachable(tree: &MoveTree) -> Vec<&NodeId> {
    let Some(root) = tree.root() else {
        return Vec::new();
    };

    let mut visited: HashSet<&NodeId> = HashSet::from([&root.id]);
    let mut order = vec![&root.id];
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        for child_id in &node.children {
            if let Some(child) = tree.get(child_id)
                && visited.insert(child_id)
            {
                order.push(child_id);
                stack.push(child);
            }
        }
    }

    order
}

/// Summary of a tree's shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub nodes: usize,
    /// Nodes reachable from the root through children lists
    pub reachable: usize,
    pub leaves: usize,
    pub variations: usize,
    pub max_ply: u32,
    pub depth: usize,
    /// Moves on the root's mainline
    pub mainline_moves: usize,
}

impl TreeStats {
    pub fn collect(tree: &MoveTree) -> Self {
        let mainline_moves = tree
            .mainline(tree.root_id())
            .map(|line| line.len().saturating_sub(1))
            .unwrap_or(0);

        Self {
            nodes: tree.len(),
            reachable: reachable(tree).len(),
            leaves: tree.leaves().len(),
            variations: count_variations(tree),
            max_ply: tree.entries().map(|(_, node)| node.ply).max().unwrap_or(0),
            depth: max_depth(tree),
            mainline_moves,
        }
    }
}
