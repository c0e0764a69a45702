//! Canonical JSON wire encoding of move trees
//!
//! Layout:
//!
//! ```text
//! {
//!   "nodes": {
//!     "<id>": { "id", "parentId", "children", "move", "uci", "fen", "ply" }, ...
//!   },
//!   "rootId": "<id>"
//! }
//! ```
//!
//! Encoding is deterministic: nodes are written in ascending id order and each
//! node's fields in the order above, so `encode(decode(encode(t)))` reproduces
//! the same string. Decoding is strict about shape but restates loosely typed
//! ids (numbers) as strings. It does not run the validator.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
    str::FromStr,
};

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{MapAccess, Visitor},
};
use serde_json::Value;

use crate::{
    error::{Error, Result},
    identifiers::NodeId,
    tree::{IdAllocator, IdStrategy, MoveCode, MoveNode, MoveTree},
};

/// What to do with a node whose `ply` is absent or not a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlyPolicy {
    /// Substitute 0 and log a warning; the validator then flags any non-root node.
    #[default]
    DefaultToZero,
    /// Reject the payload with `FormatError`.
    Strict,
}

impl fmt::Display for PlyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlyPolicy::DefaultToZero => write!(f, "default-to-zero"),
            PlyPolicy::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for PlyPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default-to-zero" | "default" | "lenient" => Ok(PlyPolicy::DefaultToZero),
            "strict" => Ok(PlyPolicy::Strict),
            other => Err(Error::InvalidConfiguration {
                message: format!("unknown ply policy '{other}' (expected default-to-zero or strict)"),
            }),
        }
    }
}

/// Options for [`decode_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub ply_policy: PlyPolicy,
    /// Allocator strategy for nodes added after decoding
    pub id_strategy: IdStrategy,
}

impl DecodeOptions {
    pub fn with_ply_policy(mut self, policy: PlyPolicy) -> Self {
        self.ply_policy = policy;
        self
    }

    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }
}

#[derive(Serialize)]
struct WireTree<'a> {
    nodes: BTreeMap<&'a str, WireNode<'a>>,
    #[serde(rename = "rootId")]
    root_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireNode<'a> {
    id: &'a str,
    parent_id: Option<&'a str>,
    children: &'a [NodeId],
    #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
    san: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uci: Option<String>,
    fen: &'a str,
    ply: u32,
}

fn wire_tree(tree: &MoveTree) -> Result<WireTree<'_>> {
    let root_id = tree.root_id();
    if root_id.as_str().is_empty() {
        return Err(Error::InvalidTree {
            reason: "tree has no root id".to_string(),
        });
    }
    if !tree.contains(root_id) {
        return Err(Error::InvalidTree {
            reason: format!("root id '{root_id}' is not present in the node mapping"),
        });
    }

    let nodes = tree
        .entries()
        .map(|(key, node)| {
            let wire = WireNode {
                id: node.id.as_str(),
                parent_id: node.parent_id.as_ref().map(NodeId::as_str),
                children: &node.children,
                san: node.san.as_deref(),
                uci: node.move_code.map(|code| code.to_string()),
                fen: &node.position,
                ply: node.ply,
            };
            (key.as_str(), wire)
        })
        .collect();

    Ok(WireTree {
        nodes,
        root_id: root_id.as_str(),
    })
}

/// Encode a tree to its canonical compact wire string.
///
/// # Errors
///
/// `InvalidTree` if the root id is empty or has no node.
pub fn encode(tree: &MoveTree) -> Result<String> {
    let wire = wire_tree(tree)?;
    serde_json::to_string(&wire).map_err(|e| Error::SerializationContext {
        operation: "encode move tree".to_string(),
        message: e.to_string(),
    })
}

/// Encode a tree as indented JSON, with the same ordering as [`encode`].
pub fn encode_pretty(tree: &MoveTree) -> Result<String> {
    let wire = wire_tree(tree)?;
    serde_json::to_string_pretty(&wire).map_err(|e| Error::SerializationContext {
        operation: "encode move tree".to_string(),
        message: e.to_string(),
    })
}

/// Node entries in payload order; repeated keys are rejected while parsing.
struct NodeEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for NodeEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = NodeEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping node ids to nodes")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<NodeEntries, A::Error> {
                let mut seen = HashSet::new();
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    if !seen.insert(key.clone()) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate node id '{key}'"
                        )));
                    }
                    entries.push((key, value));
                }
                Ok(NodeEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[derive(Deserialize)]
struct RawTree {
    nodes: Option<NodeEntries>,
    #[serde(rename = "rootId")]
    root_id: Option<Value>,
}

/// Decode a wire string with default options.
///
/// # Errors
///
/// - `FormatError` for empty or malformed input
/// - `MissingField` when `nodes` or `rootId` is absent, or a node has no `fen`
/// - `NotFound` when `rootId` names no node
pub fn decode(input: &str) -> Result<MoveTree> {
    decode_with(input, &DecodeOptions::default())
}

/// Decode a wire string with explicit options.
pub fn decode_with(input: &str, options: &DecodeOptions) -> Result<MoveTree> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::format("payload is empty"));
    }
    if !trimmed.starts_with('{') {
        return Err(Error::format("top-level value must be an object"));
    }

    let raw: RawTree = serde_json::from_str(trimmed).map_err(|e| Error::format(e.to_string()))?;
    let entries = raw.nodes.ok_or_else(|| Error::missing("nodes"))?;
    let root_value = raw.root_id.ok_or_else(|| Error::missing("rootId"))?;
    let root_id = coerce_id(&root_value, "rootId")?.ok_or_else(|| Error::missing("rootId"))?;

    if !entries.0.iter().any(|(key, _)| key == root_id.as_str()) {
        return Err(Error::not_found(root_id.as_str()));
    }

    let mut nodes = HashMap::with_capacity(entries.0.len());
    for (key, value) in entries.0 {
        let node = coerce_node(&key, &value, options.ply_policy)?;
        nodes.insert(NodeId::new(key), node);
    }

    tracing::debug!(nodes = nodes.len(), root = %root_id, "decoded move tree");
    Ok(MoveTree::from_parts(
        nodes,
        root_id,
        IdAllocator::new(options.id_strategy),
    ))
}

/// Restate a string or integer id as a `NodeId`; `null` is absence.
fn coerce_id(value: &Value, field: &str) -> Result<Option<NodeId>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(NodeId::new(s.as_str()))),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Some(NodeId::new(n.to_string()))),
        other => Err(Error::format(format!(
            "'{field}' must be a string or integer id, found {other}"
        ))),
    }
}

fn optional_string(
    node: &serde_json::Map<String, Value>,
    field: &str,
    key: &str,
) -> Result<Option<String>> {
    match node.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::format(format!(
            "node '{key}': '{field}' must be a string, found {other}"
        ))),
    }
}

fn coerce_node(key: &str, value: &Value, ply_policy: PlyPolicy) -> Result<MoveNode> {
    let Value::Object(node) = value else {
        return Err(Error::format(format!("node '{key}' must be an object")));
    };

    let id = match node.get("id") {
        Some(value) => coerce_id(value, "id")?.unwrap_or_else(|| NodeId::new(key)),
        None => NodeId::new(key),
    };

    let parent_id = match node.get("parentId") {
        Some(value) => coerce_id(value, "parentId")?,
        None => None,
    };

    let children = match node.get("children") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                coerce_id(item, "children")?.ok_or_else(|| {
                    Error::format(format!("node '{key}': children must not contain null"))
                })
            })
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(Error::format(format!(
                "node '{key}': 'children' must be an array, found {other}"
            )));
        }
    };

    let san = optional_string(node, "move", key)?;
    let move_code = optional_string(node, "uci", key)?
        .map(|raw| {
            raw.parse::<MoveCode>()
                .map_err(|e| Error::format(format!("node '{key}': {e}")))
        })
        .transpose()?;

    let position = match node.get("fen") {
        None | Some(Value::Null) => return Err(Error::missing(format!("nodes.{key}.fen"))),
        Some(Value::String(fen)) => fen.clone(),
        Some(other) => {
            return Err(Error::format(format!(
                "node '{key}': 'fen' must be a string, found {other}"
            )));
        }
    };

    let ply = coerce_ply(key, node.get("ply"), ply_policy)?;

    Ok(MoveNode {
        id,
        parent_id,
        children,
        san,
        move_code,
        position,
        ply,
    })
}

fn coerce_ply(key: &str, value: Option<&Value>, policy: PlyPolicy) -> Result<u32> {
    let number = match value {
        Some(Value::Number(n)) => n,
        _ => {
            return match policy {
                PlyPolicy::DefaultToZero => {
                    tracing::warn!(node = key, "ply absent or non-numeric, defaulting to 0");
                    Ok(0)
                }
                PlyPolicy::Strict => Err(Error::format(format!(
                    "node '{key}': 'ply' is absent or not a number"
                ))),
            };
        }
    };

    let whole = number.as_u64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0)
            .map(|f| f as u64)
    });

    whole
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            Error::format(format!(
                "node '{key}': 'ply' must be a non-negative integer, found {number}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::MoveRecord;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn sample_tree() -> MoveTree {
        let mut tree = MoveTree::new(START);
        let root = tree.root_id().clone();
        let e4 = tree
            .add_child(
                &root,
                MoveRecord::new("after-e4")
                    .with_san("e4")
                    .with_move_code("e2e4".parse().unwrap()),
            )
            .unwrap();
        tree.add_child(&root, MoveRecord::new("after-d4").with_san("d4"))
            .unwrap();
        tree.add_child(
            &e4,
            MoveRecord::new("after-c5").with_move_code("c7c5".parse().unwrap()),
        )
        .unwrap();
        tree
    }

    #[test]
    fn encode_writes_documented_shape() {
        let tree = sample_tree();
        let value: Value = serde_json::from_str(&encode(&tree).unwrap()).unwrap();

        assert_eq!(value["rootId"], "n0");
        let root = &value["nodes"]["n0"];
        assert_eq!(root["parentId"], Value::Null);
        assert_eq!(root["children"], serde_json::json!(["n1", "n2"]));
        assert!(root.get("move").is_none());
        assert!(root.get("uci").is_none());
        assert_eq!(root["fen"], START);
        assert_eq!(root["ply"], 0);

        let e4 = &value["nodes"]["n1"];
        assert_eq!(e4["move"], "e4");
        assert_eq!(e4["uci"], "e2e4");
        assert_eq!(value["nodes"]["n2"].get("uci"), None);
        assert_eq!(value["nodes"]["n3"].get("move"), None);
    }

    #[test]
    fn encode_is_stable_across_round_trips() {
        let tree = sample_tree();
        let first = encode(&tree).unwrap();
        let second = encode(&decode(&first).unwrap()).unwrap();
        assert_eq!(first, second);
        assert!(first.find("\"id\"").unwrap() < first.find("\"parentId\"").unwrap());
    }

    #[test]
    fn decode_restores_structure() {
        let tree = sample_tree();
        let decoded = decode(&encode(&tree).unwrap()).unwrap();
        assert_eq!(decoded, tree);
    }

    #[test]
    fn encode_rejects_tree_without_root() {
        let tree = MoveTree::from_parts(HashMap::new(), NodeId::new("r"), IdAllocator::default());
        assert!(matches!(encode(&tree), Err(Error::InvalidTree { .. })));

        let tree = MoveTree::from_parts(HashMap::new(), NodeId::new(""), IdAllocator::default());
        assert!(matches!(encode(&tree), Err(Error::InvalidTree { .. })));
    }

    #[test]
    fn decode_rejects_empty_and_malformed_input() {
        for input in ["", "   ", "{", "[1,2]", "null", "{\"nodes\": 3, \"rootId\": \"a\"}"] {
            assert!(
                matches!(decode(input), Err(Error::FormatError { .. })),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn decode_reports_missing_top_level_fields() {
        assert!(matches!(
            decode(r#"{"rootId": "a"}"#),
            Err(Error::MissingField { field }) if field == "nodes"
        ));
        assert!(matches!(
            decode(r#"{"nodes": {}}"#),
            Err(Error::MissingField { field }) if field == "rootId"
        ));
        assert!(matches!(
            decode(r#"{"nodes": {}, "rootId": null}"#),
            Err(Error::MissingField { .. })
        ));
    }

    #[test]
    fn decode_reports_unknown_root() {
        let input = r#"{"nodes": {"a": {"id": "a", "fen": "x", "ply": 0}}, "rootId": "b"}"#;
        assert!(matches!(decode(input), Err(Error::NotFound { id }) if id == "b"));
    }

    #[test]
    fn decode_rejects_duplicate_node_keys() {
        let input = r#"{"nodes": {"a": {"fen": "x"}, "a": {"fen": "y"}}, "rootId": "a"}"#;
        let err = decode(input).unwrap_err();
        assert!(matches!(err, Error::FormatError { message } if message.contains("duplicate")));
    }

    #[test]
    fn decode_coerces_numeric_ids_and_fills_absent_fields() {
        let input = r#"{
            "nodes": {
                "1": {"id": 1, "parentId": null, "children": [2], "fen": "p0", "ply": 0},
                "2": {"parentId": 1, "fen": "p1", "ply": 1}
            },
            "rootId": 1
        }"#;
        let tree = decode(input).unwrap();
        assert_eq!(tree.root_id(), &NodeId::new("1"));
        let child = tree.get(&NodeId::new("2")).unwrap();
        assert_eq!(child.id, "2");
        assert_eq!(child.parent_id, Some(NodeId::new("1")));
        assert!(child.children.is_empty());
        assert_eq!(child.san, None);
        assert_eq!(child.move_code, None);
        assert_eq!(tree.root().unwrap().children, vec![NodeId::new("2")]);
    }

    #[test]
    fn decode_requires_position() {
        let input = r#"{"nodes": {"a": {"id": "a", "ply": 0}}, "rootId": "a"}"#;
        assert!(matches!(
            decode(input),
            Err(Error::MissingField { field }) if field == "nodes.a.fen"
        ));
    }

    #[test]
    fn decode_rejects_bad_move_code() {
        let input = r#"{"nodes": {"a": {"id": "a", "fen": "p", "uci": "zz99", "ply": 0}}, "rootId": "a"}"#;
        assert!(matches!(decode(input), Err(Error::FormatError { .. })));
    }

    #[test]
    fn ply_policy_controls_absent_ply() {
        let input = r#"{"nodes": {"a": {"id": "a", "fen": "p", "ply": "seven"}}, "rootId": "a"}"#;

        let lenient = decode(input).unwrap();
        assert_eq!(lenient.root().unwrap().ply, 0);

        let strict = DecodeOptions::default().with_ply_policy(PlyPolicy::Strict);
        assert!(matches!(
            decode_with(input, &strict),
            Err(Error::FormatError { .. })
        ));
    }

    #[test]
    fn negative_or_fractional_ply_is_rejected_under_both_policies() {
        for ply in ["-1", "1.5"] {
            let input = format!(r#"{{"nodes": {{"a": {{"fen": "p", "ply": {ply}}}}}, "rootId": "a"}}"#);
            assert!(decode(&input).is_err(), "accepted ply {ply}");
        }
        let input = r#"{"nodes": {"a": {"fen": "p", "ply": 2.0}}, "rootId": "a"}"#;
        assert_eq!(decode(input).unwrap().root().unwrap().ply, 2);
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!("strict".parse::<PlyPolicy>().unwrap(), PlyPolicy::Strict);
        assert_eq!(
            "Default-To-Zero".parse::<PlyPolicy>().unwrap(),
            PlyPolicy::DefaultToZero
        );
        assert!("maybe".parse::<PlyPolicy>().is_err());
    }
}
