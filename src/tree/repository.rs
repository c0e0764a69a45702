//! Node repository: the owned node mapping plus the root pointer

use std::collections::{HashMap, HashSet};

use super::{IdAllocator, MoveNode, MoveRecord};
use crate::{
    error::{Error, Result},
    identifiers::NodeId,
};

/// A branching move tree.
///
/// The tree is the single writer of its node mapping: children are only ever
/// appended to an existing node, so the parent relation stays acyclic for any
/// tree grown through this API. Trees assembled with [`MoveTree::from_parts`]
/// (the codec does this) carry no such guarantee until validated.
///
/// # Examples
///
/// ```
/// use movetree::tree::{MoveRecord, MoveTree};
///
/// let mut tree = MoveTree::new("8/8/8/8/8/8/8/K6k w - - 0 1");
/// let root = tree.root_id().clone();
/// let child = tree.add_child(&root, MoveRecord::new("8/8/8/8/8/8/8/1K5k b - - 1 1").with_san("Kb1"))?;
///
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.get(&child).unwrap().ply, 1);
/// # Ok::<(), movetree::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MoveTree {
    nodes: HashMap<NodeId, MoveNode>,
    root_id: NodeId,
    ids: IdAllocator,
}

impl MoveTree {
    /// Create a one-node tree with sequential ids.
    pub fn new(position: impl Into<String>) -> Self {
        Self::with_allocator(position, IdAllocator::sequential())
    }

    /// Create a one-node tree that mints ids with the given allocator.
    pub fn with_allocator(position: impl Into<String>, mut ids: IdAllocator) -> Self {
        let root_id = ids.allocate(|_| false);
        let root = MoveNode::root(root_id.clone(), position);
        let mut nodes = HashMap::new();
        nodes.insert(root_id.clone(), root);
        Self {
            nodes,
            root_id,
            ids,
        }
    }

    /// Assemble a tree from raw parts without checking any invariant.
    pub fn from_parts(nodes: HashMap<NodeId, MoveNode>, root_id: NodeId, ids: IdAllocator) -> Self {
        Self {
            nodes,
            root_id,
            ids,
        }
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root_id
    }

    pub fn root(&self) -> Option<&MoveNode> {
        self.nodes.get(&self.root_id)
    }

    pub fn get(&self, id: &NodeId) -> Option<&MoveNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node, failing with `NotFound`.
    pub fn node(&self, id: &NodeId) -> Result<&MoveNode> {
        self.nodes.get(id).ok_or_else(|| Error::not_found(id.as_str()))
    }

    /// Stored entries in unspecified order, keyed as stored.
    pub fn entries(&self) -> impl Iterator<Item = (&NodeId, &MoveNode)> {
        self.nodes.iter()
    }

    /// Node keys in ascending order.
    pub fn sorted_ids(&self) -> Vec<&NodeId> {
        let mut ids: Vec<&NodeId> = self.nodes.keys().collect();
        ids.sort();
        ids
    }

    pub fn id_allocator(&self) -> &IdAllocator {
        &self.ids
    }

    /// Append a new child to `parent_id` and return its id.
    ///
    /// The child lands after any existing children, so calling this on a node
    /// that already has a continuation records a new variation.
    ///
    /// # Errors
    ///
    /// `NotFound` if `parent_id` is not in the tree.
    pub fn add_child(&mut self, parent_id: &NodeId, record: MoveRecord) -> Result<NodeId> {
        self.insert_child(parent_id, None, record)
    }

    /// Append a child only if the parent still has `expected_children` children.
    ///
    /// Callers pass the child count they observed when deciding on the move; a
    /// different count means another move was accepted in between.
    ///
    /// # Errors
    ///
    /// `NotFound` if the parent is gone, `Conflict` if its children changed.
    pub fn add_child_expecting(
        &mut self,
        parent_id: &NodeId,
        expected_children: usize,
        record: MoveRecord,
    ) -> Result<NodeId> {
        self.insert_child(parent_id, Some(expected_children), record)
    }

    fn insert_child(
        &mut self,
        parent_id: &NodeId,
        expected_children: Option<usize>,
        record: MoveRecord,
    ) -> Result<NodeId> {
        let parent = self.node(parent_id)?;
        if let Some(expected) = expected_children
            && parent.children.len() != expected
        {
            return Err(Error::Conflict {
                parent: parent_id.to_string(),
                expected,
                found: parent.children.len(),
            });
        }
        let ply = parent.ply + 1;

        #[cfg(any(test, feature = "strict"))]
        let was_valid = crate::validation::validate(self).is_valid();

        let nodes = &self.nodes;
        let id = self.ids.allocate(|candidate| nodes.contains_key(candidate));
        let node = MoveNode {
            id: id.clone(),
            parent_id: Some(parent_id.clone()),
            children: Vec::new(),
            san: record.san,
            move_code: record.move_code,
            position: record.position,
            ply,
        };
        self.nodes.insert(id.clone(), node);
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.children.push(id.clone());
        }

        tracing::debug!(parent = %parent_id, child = %id, ply, "appended move node");

        // appending never repairs a tree, but it must not break a valid one
        #[cfg(any(test, feature = "strict"))]
        if was_valid {
            let report = crate::validation::validate(self);
            assert!(
                report.is_valid(),
                "tree invariants broken after appending '{id}': {:?}",
                report.errors()
            );
        }

        Ok(id)
    }

    /// The chain of nodes from the root to `id`, inclusive.
    ///
    /// # Errors
    ///
    /// `NotFound` if `id` is absent. `InvalidTree` if the parent chain is
    /// broken or cyclic, which only happens for unvalidated input.
    pub fn get_path(&self, id: &NodeId) -> Result<Vec<&MoveNode>> {
        let mut node = self.node(id)?;
        let mut path = vec![node];
        let mut visited: HashSet<&NodeId> = HashSet::from([&node.id]);

        while let Some(parent_id) = &node.parent_id {
            if !visited.insert(parent_id) {
                return Err(Error::InvalidTree {
                    reason: format!("parent chain of '{id}' loops through '{parent_id}'"),
                });
            }
            node = self.nodes.get(parent_id).ok_or_else(|| Error::InvalidTree {
                reason: format!("node '{}' references missing parent '{parent_id}'", node.id),
            })?;
            path.push(node);
        }

        path.reverse();
        Ok(path)
    }

    /// Follow first children from `from` until a leaf.
    ///
    /// The starting node is included. Stops early on a dangling or repeated id.
    pub fn mainline(&self, from: &NodeId) -> Result<Vec<&MoveNode>> {
        let mut node = self.node(from)?;
        let mut line = vec![node];
        let mut visited: HashSet<&NodeId> = HashSet::from([&node.id]);

        while let Some(next_id) = node.mainline_child() {
            let Some(next) = self.nodes.get(next_id) else {
                break;
            };
            if !visited.insert(next_id) {
                break;
            }
            line.push(next);
            node = next;
        }
        Ok(line)
    }

    /// The first child of `parent_id` matching `predicate`.
    pub fn find_child(
        &self,
        parent_id: &NodeId,
        predicate: impl Fn(&MoveNode) -> bool,
    ) -> Result<Option<&MoveNode>> {
        let parent = self.node(parent_id)?;
        Ok(parent
            .children
            .iter()
            .filter_map(|child| self.nodes.get(child))
            .find(|child| predicate(child)))
    }

    /// Leaf nodes in ascending id order.
    pub fn leaves(&self) -> Vec<&MoveNode> {
        self.sorted_ids()
            .into_iter()
            .filter_map(|id| self.nodes.get(id))
            .filter(|node| node.is_leaf())
            .collect()
    }
}

/// Structural equality: same root id and the same node mapping.
///
/// The id allocator is bookkeeping and does not take part.
impl PartialEq for MoveTree {
    fn eq(&self, other: &Self) -> bool {
        self.root_id == other.root_id && self.nodes == other.nodes
    }
}

impl Eq for MoveTree {}
