//! Generic list merge: combine two collections of descriptors.

use serde::Serialize;

use crate::change::{audit_value, ChangeSummary, ChangeType};

/// How result entries that were never matched are reported.
///
/// `AllUnmatched` reproduces the long-standing behaviour: base entries that no
/// incoming item touched are logged as "inserted unmatched" too, so the audit
/// count conflates "unchanged" with "new". Consumers depend on that count, so
/// it stays the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedLabeling {
    /// Every unmatched result index, base entries included
    AllUnmatched,
    /// Only entries appended from `incoming`
    AppendedOnly,
}

/// Merged list plus the audit records produced while merging it
#[derive(Debug, Clone, PartialEq)]
pub struct ListMergeResult<T> {
    pub result: Vec<T>,
    pub changes: Vec<ChangeSummary>,
}

/// Merge `incoming` into a copy of `base`.
///
/// For each incoming item a match is searched in the *current* result (so
/// items appended earlier in this call can absorb later ones). A match is
/// replaced by `merge_item(existing, incoming)`; otherwise the item is appended.
pub fn merge_lists<T, F, M>(
    table_name: &str,
    inserted_label: &str,
    base: &[T],
    incoming: &[T],
    find_match: F,
    mut merge_item: M,
    labeling: UnmatchedLabeling,
) -> ListMergeResult<T>
where
    T: Clone + Serialize,
    F: Fn(&T, &[T]) -> Option<usize>,
    M: FnMut(&T, &T) -> (T, Vec<ChangeSummary>),
{
    let mut result: Vec<T> = base.to_vec();
    let mut matched = vec![false; result.len()];
    let mut changes = Vec::new();

    for item in incoming {
        match find_match(item, &result) {
            Some(index) => {
                let (merged, item_changes) = merge_item(&result[index], item);
                changes.extend(item_changes);
                changes.push(
                    ChangeSummary::new(table_name, ChangeType::MergeImported, "merged imported entity")
                        .with_original(audit_value(&result[index]))
                        .with_import(vec![audit_value(item)])
                        .with_new(audit_value(&merged)),
                );
                result[index] = merged;
                matched[index] = true;
            }
            None => {
                result.push(item.clone());
                matched.push(false);
            }
        }
    }

    let first_reported = match labeling {
        UnmatchedLabeling::AllUnmatched => 0,
        UnmatchedLabeling::AppendedOnly => base.len(),
    };
    for (index, item) in result.iter().enumerate().skip(first_reported) {
        if !matched[index] {
            changes.push(
                ChangeSummary::new(inserted_label, ChangeType::Insert, "inserted unmatched")
                    .with_new(audit_value(item)),
            );
        }
    }

    ListMergeResult { result, changes }
}
