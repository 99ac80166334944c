//! Structural diff between a server document and its local definition

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

/// Maximum recursion depth for diff operations
const MAX_DIFF_DEPTH: usize = 128;

/// Key used when two non-object documents differ as a whole
pub const WHOLE_VALUE_KEY: &str = "value";

/// Field-path segment to diff subtree
pub type DiffMap = BTreeMap<String, DiffTree>;

/// One level of a structural diff.
///
/// A leaf holds exactly the two sides of a differing field; any deeper
/// difference is a node keyed by the nested field names. Serializes as
/// `{"server": .., "local": ..}` for leaves and a plain object for nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiffTree {
    Leaf { server: Value, local: Value },
    Node(DiffMap),
}

impl DiffTree {
    pub fn leaf(server: Value, local: Value) -> Self {
        Self::Leaf { server, local }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Number of differing leaf fields under this subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Node(children) => children.values().map(DiffTree::leaf_count).sum(),
        }
    }
}

/// Compute the structural diff of two documents.
///
/// Objects are compared over the union of their keys; a key missing on
/// one side compares as `null`. Two differing objects recurse, anything
/// else (scalars, arrays, type changes) is a leaf. Identical inputs give
/// an empty map.
pub fn diff_values(server: &Value, local: &Value) -> DiffMap {
    match (server, local) {
        (Value::Object(_), Value::Object(_)) => diff_objects(server, local, 0),
        _ if server == local => DiffMap::new(),
        _ => {
            let mut map = DiffMap::new();
            map.insert(
                WHOLE_VALUE_KEY.to_string(),
                DiffTree::leaf(server.clone(), local.clone()),
            );
            map
        }
    }
}

fn diff_objects(server: &Value, local: &Value, depth: usize) -> DiffMap {
    let (Value::Object(server_obj), Value::Object(local_obj)) = (server, local) else {
        return DiffMap::new();
    };

    let keys: BTreeSet<&String> = server_obj.keys().chain(local_obj.keys()).collect();
    let mut diff = DiffMap::new();

    for key in keys {
        let server_value = server_obj.get(key).unwrap_or(&Value::Null);
        let local_value = local_obj.get(key).unwrap_or(&Value::Null);
        if server_value == local_value {
            continue;
        }

        let subtree = match (server_value, local_value) {
            // Past the depth cap the whole subtree is reported as one leaf
            (Value::Object(_), Value::Object(_)) if depth < MAX_DIFF_DEPTH => {
                DiffTree::Node(diff_objects(server_value, local_value, depth + 1))
            }
            _ => DiffTree::leaf(server_value.clone(), local_value.clone()),
        };
        diff.insert(key.clone(), subtree);
    }

    diff
}
