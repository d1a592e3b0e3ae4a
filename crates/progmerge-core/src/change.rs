//! Audit records for merge decisions.
//!
//! Every decision the merge engine takes, whether choosing a field value,
//! merging a matched pair, or inserting an unmatched entity, produces exactly one
//! [`ChangeSummary`]. The resulting log is ordered in decision order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of decision recorded in a [`ChangeSummary`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    MergeImported,
    Insert,
    Update,
    Delete,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::MergeImported => "MERGE_IMPORTED",
            ChangeType::Insert => "INSERT",
            ChangeType::Update => "UPDATE",
            ChangeType::Delete => "DELETE",
        }
    }
}

/// One merge decision.
///
/// `location` is a table name (`ContentGroup`) or a table/field path
/// (`ContentGroup.title`, `ContentGroup/ContentElement`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    pub location: String,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_data: Option<Value>,
    #[serde(default)]
    pub import_data: Vec<Value>,
    pub new_data: Value,
}

impl ChangeSummary {
    pub fn new(
        location: impl Into<String>,
        change_type: ChangeType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            change_type,
            description: description.into(),
            original_data: None,
            import_data: Vec::new(),
            new_data: Value::Null,
        }
    }

    pub fn with_original(mut self, original: Value) -> Self {
        self.original_data = Some(original);
        self
    }

    pub fn with_import(mut self, import: Vec<Value>) -> Self {
        self.import_data = import;
        self
    }

    pub fn with_new(mut self, new_data: Value) -> Self {
        self.new_data = new_data;
        self
    }
}

/// Serialize a value for the audit log.
///
/// The model types serialize infallibly (plain structs, string keys); a
/// failure is recorded as `null` rather than aborting a merge over an audit detail.
pub(crate) fn audit_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
