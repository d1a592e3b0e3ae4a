//! Field-level conflict resolution.
//!
//! [`FieldMerger`] resolves one optional field at a time and records every
//! decision as a [`ChangeSummary`] located at `<table path>.<field>`.

use serde::Serialize;
use std::collections::BTreeSet;

use super::list::merge_lists;
use super::MergeOptions;
use crate::change::{audit_value, ChangeSummary, ChangeType};
use crate::matching::{Matchable, SOURCE_ID_DELIMITER};

/// Emptiness test used by the default merger.
pub trait Presence {
    fn is_blank(&self) -> bool;
}

impl Presence for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Presence for i64 {
    fn is_blank(&self) -> bool {
        false
    }
}

impl Presence for bool {
    fn is_blank(&self) -> bool {
        false
    }
}

impl Presence for serde_json::Value {
    fn is_blank(&self) -> bool {
        match self {
            serde_json::Value::Null => true,
            serde_json::Value::String(s) => s.is_empty(),
            serde_json::Value::Array(a) => a.is_empty(),
            serde_json::Value::Object(o) => o.is_empty(),
            _ => false,
        }
    }
}

impl<T> Presence for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Presence for BTreeSet<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

/// Join two composite source ids, left first.
pub fn concat_source_ids(left: &str, right: &str) -> String {
    format!("{}{}{}", left, SOURCE_ID_DELIMITER, right)
}

/// Per-entity field resolver that accumulates an audit log.
#[derive(Debug)]
pub struct FieldMerger {
    location: String,
    options: MergeOptions,
    changes: Vec<ChangeSummary>,
}

impl FieldMerger {
    pub fn new(location: impl Into<String>, options: MergeOptions) -> Self {
        Self {
            location: location.into(),
            options,
            changes: Vec::new(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn field_location(&self, key: &str) -> String {
        if self.location.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.location, key)
        }
    }

    fn child_location(&self, table: &str) -> String {
        if self.location.is_empty() {
            table.to_string()
        } else {
            format!("{}/{}", self.location, table)
        }
    }

    fn record<T: Serialize>(
        &mut self,
        key: &str,
        description: &str,
        original: Option<&T>,
        imported: Option<&T>,
        chosen: &T,
    ) {
        let mut summary =
            ChangeSummary::new(self.field_location(key), ChangeType::MergeImported, description)
                .with_import(imported.map(audit_value).into_iter().collect())
                .with_new(audit_value(chosen));
        if let Some(original) = original {
            summary = summary.with_original(audit_value(original));
        }
        self.changes.push(summary);
    }

    /// Resolve one optional field.
    ///
    /// - only `left` present: taken as-is
    /// - only `right` present: taken as-is
    /// - neither present: `None`, the field stays absent
    /// - both present: `merge_fn(self, key, left, right)`
    pub fn merge_field<T, F>(
        &mut self,
        key: &str,
        left: Option<&T>,
        right: Option<&T>,
        merge_fn: F,
    ) -> Option<T>
    where
        T: Clone + Serialize,
        F: FnOnce(&mut Self, &str, &T, &T) -> T,
    {
        match (left, right) {
            (Some(l), None) => {
                self.record(key, "chose only available value", Some(l), None, l);
                Some(l.clone())
            }
            (None, Some(r)) => {
                self.record(key, "chose only available value", None, Some(r), r);
                Some(r.clone())
            }
            (None, None) => None,
            (Some(l), Some(r)) => Some(merge_fn(self, key, l, r)),
        }
    }

    /// Prefer the non-empty side; when both (or neither) are non-empty keep `x`.
    pub fn default_merger<T>(&mut self, key: &str, x: &T, y: &T) -> T
    where
        T: Presence + Clone + Serialize,
    {
        let (chosen, description) = match (x.is_blank(), y.is_blank()) {
            (false, true) => (x, "chose non-empty left value"),
            (true, false) => (y, "chose non-empty right value"),
            (false, false) => (x, "both values present, kept left value"),
            (true, true) => (x, "both values empty, kept left value"),
        };
        self.record(key, description, Some(x), Some(y), chosen);
        chosen.clone()
    }

    /// Keep the larger of two values (e.g. remaining upload counts).
    pub fn max_merger<T>(&mut self, key: &str, x: &T, y: &T) -> T
    where
        T: PartialOrd + Clone + Serialize,
    {
        let chosen = if y > x { y } else { x };
        self.record(key, "chose maximum value", Some(x), Some(y), chosen);
        chosen.clone()
    }

    /// Concatenate provenance: `"<left>¬<right>"`, never an overwrite.
    pub fn source_id_merger(&mut self, key: &str, x: &String, y: &String) -> String {
        let merged = concat_source_ids(x, y);
        self.record(key, "concatenated originating source ids", Some(x), Some(y), &merged);
        merged
    }

    /// Union of two id sets (e.g. linked tag ids).
    pub fn union_merger(
        &mut self,
        key: &str,
        x: &BTreeSet<String>,
        y: &BTreeSet<String>,
    ) -> BTreeSet<String> {
        let merged: BTreeSet<String> = x.union(y).cloned().collect();
        self.record(key, "took union of both sets", Some(x), Some(y), &merged);
        merged
    }

    /// Merge two child collections with the list merger.
    ///
    /// The child table is located under this merger's location; its audit
    /// records are appended to this merger's log.
    pub fn list_merger<T, M>(&mut self, table: &str, x: &[T], y: &[T], merge_item: M) -> Vec<T>
    where
        T: Matchable + Clone + Serialize,
        M: Fn(&str, &T, &T, MergeOptions) -> (T, Vec<ChangeSummary>),
    {
        let table_location = self.child_location(table);
        let options = self.options;
        let matcher = options.matcher();
        let merged = merge_lists(
            &table_location,
            &table_location,
            x,
            y,
            |item, current| matcher.find_index(item, current),
            |existing, incoming| merge_item(&table_location, existing, incoming, options),
            options.labeling(),
        );
        self.changes.extend(merged.changes);
        merged.result
    }

    /// Consume the merger and return its audit log.
    pub fn finish(self) -> Vec<ChangeSummary> {
        self.changes
    }
}
