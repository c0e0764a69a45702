//! Structural validation of move trees
//!
//! [`validate`] walks the whole tree and reports every broken invariant it can
//! find. It never fails and never repairs anything; callers decide what a
//! non-empty report means for them.

use std::{collections::HashSet, fmt};

use serde::Serialize;

use crate::{
    error::{Error, Result},
    identifiers::NodeId,
    tree::MoveTree,
};

/// One broken structural invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The declared root id has no node.
    MissingRoot { root: NodeId },
    /// The root node declares a parent.
    RootHasParent { root: NodeId, parent: NodeId },
    /// A node's own id differs from the key it is stored under.
    IdMismatch { key: NodeId, id: NodeId },
    /// A node other than the root has no parent.
    Detached { node: NodeId },
    /// A node's parent id does not resolve.
    MissingParent { node: NodeId, parent: NodeId },
    /// A listed child id does not resolve.
    MissingChild { parent: NodeId, child: NodeId },
    /// A listed child names a different parent (or none).
    ChildParentMismatch {
        parent: NodeId,
        child: NodeId,
        declared: Option<NodeId>,
    },
    /// A child id appears more than once in one children list.
    DuplicateChild { parent: NodeId, child: NodeId },
    /// A node's ply is not its parent's ply plus one.
    PlyMismatch {
        node: NodeId,
        parent: NodeId,
        expected: u64,
        found: u32,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingRoot { root } => write!(f, "root node '{root}' does not exist"),
            Violation::RootHasParent { root, parent } => {
                write!(f, "root node '{root}' declares parent '{parent}'")
            }
            Violation::IdMismatch { key, id } => {
                write!(f, "node stored under key '{key}' has id '{id}'")
            }
            Violation::Detached { node } => write!(f, "non-root node '{node}' has no parent"),
            Violation::MissingParent { node, parent } => {
                write!(f, "node '{node}' references non-existent parent '{parent}'")
            }
            Violation::MissingChild { parent, child } => {
                write!(f, "node '{parent}' lists non-existent child '{child}'")
            }
            Violation::ChildParentMismatch {
                parent,
                child,
                declared: Some(declared),
            } => write!(
                f,
                "parent/child mismatch: node '{parent}' lists child '{child}' whose parent is '{declared}'"
            ),
            Violation::ChildParentMismatch {
                parent,
                child,
                declared: None,
            } => write!(
                f,
                "parent/child mismatch: node '{parent}' lists child '{child}' which has no parent"
            ),
            Violation::DuplicateChild { parent, child } => {
                write!(f, "node '{parent}' lists child '{child}' more than once")
            }
            Violation::PlyMismatch {
                node,
                parent,
                expected,
                found,
            } => write!(
                f,
                "node '{node}' has ply {found}, expected {expected} (one past parent '{parent}')"
            ),
        }
    }
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Human-readable findings, in discovery order.
    pub fn errors(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }

    /// Turn a failing report into `InvalidTree`.
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }
        Err(Error::InvalidTree {
            reason: self.errors().join("; "),
        })
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ValidationReport", 2)?;
        state.serialize_field("valid", &self.is_valid())?;
        state.serialize_field("errors", &self.errors())?;
        state.end()
    }
}

/// Check every structural invariant of `tree`.
///
/// The root is checked first, then each node in ascending key order for: id
/// matches key, parent exists, children exist and point back, no duplicate
/// children, ply is one past the parent's. Acyclicity is not checked
/// separately; a cycle always breaks the ply rule somewhere along it.
pub fn validate(tree: &MoveTree) -> ValidationReport {
    let mut violations = Vec::new();
    let root_id = tree.root_id();

    match tree.get(root_id) {
        None => violations.push(Violation::MissingRoot {
            root: root_id.clone(),
        }),
        Some(root) => {
            if let Some(parent) = &root.parent_id {
                violations.push(Violation::RootHasParent {
                    root: root_id.clone(),
                    parent: parent.clone(),
                });
            }
        }
    }

    for key in tree.sorted_ids() {
        let Some(node) = tree.get(key) else {
            continue;
        };

        if &node.id != key {
            violations.push(Violation::IdMismatch {
                key: key.clone(),
                id: node.id.clone(),
            });
        }

        if key != root_id {
            match &node.parent_id {
                None => violations.push(Violation::Detached { node: key.clone() }),
                Some(parent_id) if !tree.contains(parent_id) => {
                    violations.push(Violation::MissingParent {
                        node: key.clone(),
                        parent: parent_id.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        let mut seen = HashSet::new();
        for child_id in &node.children {
            if !seen.insert(child_id) {
                violations.push(Violation::DuplicateChild {
                    parent: key.clone(),
                    child: child_id.clone(),
                });
                continue;
            }
            match tree.get(child_id) {
                None => violations.push(Violation::MissingChild {
                    parent: key.clone(),
                    child: child_id.clone(),
                }),
                Some(child) if child.parent_id.as_ref() != Some(key) => {
                    violations.push(Violation::ChildParentMismatch {
                        parent: key.clone(),
                        child: child_id.clone(),
                        declared: child.parent_id.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        if key != root_id
            && let Some(parent_id) = &node.parent_id
            && let Some(parent) = tree.get(parent_id)
        {
            let expected = u64::from(parent.ply) + 1;
            if u64::from(node.ply) != expected {
                violations.push(Violation::PlyMismatch {
                    node: key.clone(),
                    parent: parent_id.clone(),
                    expected,
                    found: node.ply,
                });
            }
        }
    }

    if !violations.is_empty() {
        tracing::debug!(count = violations.len(), root = %root_id, "tree failed validation");
    }

    ValidationReport { violations }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::tree::{IdAllocator, MoveNode, MoveRecord};

    fn node(id: &str, parent: Option<&str>, children: &[&str], ply: u32) -> MoveNode {
        MoveNode {
            id: NodeId::new(id),
            parent_id: parent.map(NodeId::new),
            children: children.iter().map(|c| NodeId::new(*c)).collect(),
            san: None,
            move_code: None,
            position: format!("pos-{id}"),
            ply,
        }
    }

    fn assemble(root: &str, nodes: Vec<MoveNode>) -> MoveTree {
        let map: HashMap<_, _> = nodes.into_iter().map(|n| (n.id.clone(), n)).collect();
        MoveTree::from_parts(map, NodeId::new(root), IdAllocator::default())
    }

    #[test]
    fn grown_tree_is_valid() {
        let mut tree = MoveTree::new("p0");
        let root = tree.root_id().clone();
        let a = tree.add_child(&root, MoveRecord::new("p1")).unwrap();
        tree.add_child(&root, MoveRecord::new("p1b")).unwrap();
        tree.add_child(&a, MoveRecord::new("p2")).unwrap();

        let report = validate(&tree);
        assert!(report.is_valid(), "{:?}", report.errors());
        assert!(report.errors().is_empty());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn missing_root_is_reported() {
        let tree = assemble("r", vec![node("a", None, &[], 0)]);
        let report = validate(&tree);
        assert!(!report.is_valid());
        assert!(matches!(report.violations()[0], Violation::MissingRoot { .. }));
    }

    #[test]
    fn root_with_parent_is_reported() {
        let tree = assemble("r", vec![node("r", Some("r"), &[], 0)]);
        let report = validate(&tree);
        assert!(
            report
                .violations()
                .iter()
                .any(|v| matches!(v, Violation::RootHasParent { .. }))
        );
    }

    #[test]
    fn id_key_mismatch_is_reported() {
        let mut stray = node("a", Some("r"), &[], 1);
        stray.id = NodeId::new("r");
        let mut map = HashMap::new();
        map.insert(NodeId::new("r"), node("r", None, &[], 0));
        map.insert(NodeId::new("a"), stray);
        let tree = MoveTree::from_parts(map, NodeId::new("r"), IdAllocator::default());

        let report = validate(&tree);
        assert_eq!(
            report.violations(),
            &[Violation::IdMismatch {
                key: NodeId::new("a"),
                id: NodeId::new("r"),
            }]
        );
    }

    #[test]
    fn detached_node_is_reported() {
        let tree = assemble("r", vec![node("r", None, &[], 0), node("x", None, &[], 1)]);
        let report = validate(&tree);
        assert_eq!(
            report.violations(),
            &[Violation::Detached {
                node: NodeId::new("x")
            }]
        );
    }

    #[test]
    fn duplicate_children_reported_once_per_repeat() {
        let tree = assemble(
            "r",
            vec![node("r", None, &["a", "a", "a"], 0), node("a", Some("r"), &[], 1)],
        );
        let report = validate(&tree);
        assert_eq!(report.violations().len(), 2);
        assert!(
            report
                .violations()
                .iter()
                .all(|v| matches!(v, Violation::DuplicateChild { .. }))
        );
    }

    #[test]
    fn ply_gap_is_reported() {
        let tree = assemble(
            "r",
            vec![node("r", None, &["a"], 0), node("a", Some("r"), &[], 3)],
        );
        let report = validate(&tree);
        assert_eq!(
            report.errors(),
            vec!["node 'a' has ply 3, expected 1 (one past parent 'r')".to_string()]
        );
    }

    #[test]
    fn collects_every_violation() {
        let tree = assemble(
            "r",
            vec![
                node("r", None, &["a", "ghost"], 0),
                node("a", Some("b"), &[], 5),
                node("b", Some("missing"), &[], 1),
            ],
        );
        let report = validate(&tree);
        let kinds: Vec<_> = report.violations().to_vec();
        assert!(kinds.contains(&Violation::ChildParentMismatch {
            parent: NodeId::new("r"),
            child: NodeId::new("a"),
            declared: Some(NodeId::new("b")),
        }));
        assert!(kinds.contains(&Violation::MissingChild {
            parent: NodeId::new("r"),
            child: NodeId::new("ghost"),
        }));
        assert!(kinds.contains(&Violation::MissingParent {
            node: NodeId::new("b"),
            parent: NodeId::new("missing"),
        }));
        assert!(kinds.contains(&Violation::PlyMismatch {
            node: NodeId::new("a"),
            parent: NodeId::new("b"),
            expected: 2,
            found: 5,
        }));
        assert_eq!(kinds.len(), 4);
    }

    #[test]
    fn report_serializes_as_valid_and_errors() {
        let tree = assemble("r", vec![node("r", None, &["x"], 0)]);
        let json = serde_json::to_value(validate(&tree)).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"].as_array().unwrap().len(), 1);
    }
}
