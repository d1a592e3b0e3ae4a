//! Human-readable renderers for merge audit logs and save plans.

use std::collections::BTreeMap;

use crate::change::ChangeSummary;
use crate::diff::model::{EntityDiff, GroupUpdatePlan, SavePlan};

/// Render a text summary of a merge audit log.
///
/// Informational only: counts per location and per change type.
pub fn render_change_report(changes: &[ChangeSummary]) -> String {
    let mut out = String::new();

    out.push_str("## Import Changes\n\n");
    out.push_str(&format!("{} changes detected\n", changes.len()));

    if changes.is_empty() {
        return out;
    }

    let mut by_location: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for change in changes {
        *by_location.entry(change.location.as_str()).or_default() += 1;
        *by_type.entry(change.change_type.as_str()).or_default() += 1;
    }

    out.push_str("\n### By Type\n\n");
    for (change_type, count) in &by_type {
        out.push_str(&format!("- {change_type}: {count}\n"));
    }

    out.push_str("\n### By Location\n\n");
    for (location, count) in &by_location {
        out.push_str(&format!("- `{location}`: {count}\n"));
    }

    out
}

/// Render a text summary of a [`SavePlan`] for dry runs.
pub fn render_save_plan(plan: &SavePlan) -> String {
    let mut out = String::new();

    out.push_str("## Save Plan\n\n");

    if plan.is_empty() {
        out.push_str("_Nothing to save._\n");
        return out;
    }

    out.push_str(&kind_line("Tags", &plan.tags));
    out.push_str(&kind_line("Originating data", &plan.originating_datas));
    out.push_str(&kind_line("People", &plan.people));
    out.push_str(&kind_line("Exhibitions", &plan.exhibitions));
    out.push_str(&format!(
        "- **Groups**: {} new, {} updated, {} deleted{}\n",
        plan.new_groups.len(),
        plan.updated_groups.len(),
        plan.deleted_groups.len(),
        rejected_suffix(plan.rejected_groups.len())
    ));

    let changed: Vec<&GroupUpdatePlan> =
        plan.updated_groups.iter().filter(|g| !g.is_noop()).collect();
    if !changed.is_empty() {
        out.push_str("\n### Group Updates\n\n");
        for group in changed {
            out.push_str(&group_line(group));
        }
    }

    out
}

fn kind_line<T>(label: &str, diff: &EntityDiff<T>) -> String {
    format!(
        "- **{label}**: {} new, {} updated, {} deleted{}\n",
        diff.new.len(),
        diff.updated.len(),
        diff.deleted.len(),
        rejected_suffix(diff.rejected.len())
    )
}

fn rejected_suffix(count: usize) -> String {
    if count == 0 {
        String::new()
    } else {
        format!(", {count} rejected")
    }
}

fn group_line(group: &GroupUpdatePlan) -> String {
    let mut parts = Vec::new();
    if let Some(serde_json::Value::Object(patch)) = &group.patch {
        let fields: Vec<&str> = patch.keys().map(String::as_str).collect();
        parts.push(format!("fields [{}]", fields.join(", ")));
    }
    for (label, counts) in [
        ("elements", child_counts(&group.elements)),
        ("required items", child_counts(&group.required_items)),
        ("people", child_counts(&group.people)),
        ("exhibitions", child_counts(&group.exhibitions)),
    ] {
        if let Some(counts) = counts {
            parts.push(format!("{label} {counts}"));
        }
    }
    if !group.tags.is_empty() {
        parts.push(format!(
            "tags +{} -{}",
            group.tags.added.len(),
            group.tags.removed.len()
        ));
    }
    format!("- `{}`: {}\n", group.id, parts.join("; "))
}

fn child_counts<T>(diff: &EntityDiff<T>) -> Option<String> {
    (!diff.is_empty()).then(|| {
        format!(
            "+{} ~{} -{}",
            diff.new.len(),
            diff.updated.len(),
            diff.deleted.len()
        )
    })
}
