//! Items and the discrepancies found for them

use serde::Serialize;
use serde_json::Value;

use crate::diff::{DiffMap, diff_values};

/// Reported when an item exists on the server only
pub const MISSING_LOCALLY: &str = "exists on server but not locally";

/// Reported when an item exists in the local repository only
pub const MISSING_ON_SERVER: &str = "exists locally but not on server";

/// Reported when the only local definition is Ruby DSL, which is never evaluated
pub const DEFINED_IN_RUBY: &str = "defined in Ruby; not compared";

/// A single reported difference
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Discrepancy {
    Message(String),
    Diff(DiffMap),
}

impl From<&str> for Discrepancy {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<String> for Discrepancy {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

/// One named object compared between the server and the local repository
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub name: String,
    pub server: Option<Value>,
    pub local: Option<Value>,
    pub errors: Vec<Discrepancy>,
}

impl Item {
    pub fn new(name: impl Into<String>, server: Option<Value>, local: Option<Value>) -> Self {
        Self {
            name: name.into(),
            server,
            local,
            errors: Vec::new(),
        }
    }

    /// Build an item whose errors come from comparing the two documents:
    /// absence on either side, otherwise the structural diff.
    ///
    /// The server side is checked first, so a name with no readable
    /// document on either side is reported as missing on the server.
    pub fn compared(name: impl Into<String>, server: Option<Value>, local: Option<Value>) -> Self {
        let mut item = Self::new(name, server, local);
        match (&item.server, &item.local) {
            (None, _) => item.push_message(MISSING_ON_SERVER),
            (Some(_), None) => item.push_message(MISSING_LOCALLY),
            (Some(server), Some(local)) => {
                let diff = diff_values(server, local);
                item.push_diff(diff);
            }
        }
        item
    }

    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push_message(&mut self, message: impl Into<String>) {
        self.errors.push(Discrepancy::Message(message.into()));
    }

    /// Record a structural diff; empty diffs are not discrepancies.
    pub fn push_diff(&mut self, diff: DiffMap) {
        if !diff.is_empty() {
            self.errors.push(Discrepancy::Diff(diff));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn new_item_passes() {
        let item = Item::new("web", None, None);
        assert!(item.passed());
    }

    #[test]
    fn compared_reports_absence() {
        let item = Item::compared("web", Some(json!({"name": "web"})), None);
        assert_eq!(item.errors, vec![Discrepancy::from(MISSING_LOCALLY)]);

        let item = Item::compared("db", None, Some(json!({"name": "db"})));
        assert_eq!(item.errors, vec![Discrepancy::from(MISSING_ON_SERVER)]);
    }

    #[test]
    fn compared_with_neither_side_is_missing_on_server() {
        let item = Item::compared("ghost", None, None);
        assert!(!item.passed());
        assert_eq!(item.errors, vec![Discrepancy::from(MISSING_ON_SERVER)]);
    }

    #[test]
    fn compared_identical_documents_pass() {
        let doc = json!({"name": "web", "run_list": []});
        let item = Item::compared("web", Some(doc.clone()), Some(doc));
        assert!(item.passed());
    }

    #[test]
    fn compared_differing_documents_record_one_diff() {
        let item = Item::compared(
            "web",
            Some(json!({"description": "a"})),
            Some(json!({"description": "b"})),
        );
        assert_eq!(item.errors.len(), 1);
        assert!(matches!(&item.errors[0], Discrepancy::Diff(map) if map.contains_key("description")));
    }

    #[test]
    fn serializes_as_record() {
        let mut item = Item::new("web", Some(json!({"a": 1})), None);
        item.push_message(MISSING_LOCALLY);
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({
                "name": "web",
                "server": {"a": 1},
                "local": null,
                "errors": ["exists on server but not locally"]
            })
        );
    }
}
