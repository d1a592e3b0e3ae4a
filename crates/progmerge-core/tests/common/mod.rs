use progmerge_core::model::{Group, ImportPayload, IntermediaryData, Snapshot};
use progmerge_core::{ChangeSummary, ChangeType};

/// Build a group descriptor with optional id and provenance
#[allow(dead_code)]
pub fn group(id: Option<&str>, title: &str, source: Option<&str>) -> Group {
    Group {
        id: id.map(str::to_string),
        title: Some(title.to_string()),
        originating_data_source_id: source.map(str::to_string),
        ..Group::default()
    }
}

/// Snapshot holding the given persisted groups, keyed by their ids
///
/// # Panics
///
/// Panics if a group has no id.
#[allow(dead_code)]
pub fn snapshot_with_groups(groups: Vec<Group>) -> Snapshot {
    let mut snapshot = Snapshot::new();
    for group in groups {
        let id = group.id.clone().expect("persisted groups carry an id");
        snapshot.groups.insert(id, group);
    }
    snapshot
}

/// Import source delivering only groups
#[allow(dead_code)]
pub fn groups_source(groups: Vec<Group>) -> IntermediaryData {
    IntermediaryData {
        groups: Some(groups),
        ..IntermediaryData::default()
    }
}

/// Payload from `(source name, data)` pairs
#[allow(dead_code)]
pub fn payload(sources: Vec<(&str, IntermediaryData)>) -> ImportPayload {
    sources
        .into_iter()
        .map(|(name, data)| (name.to_string(), data))
        .collect()
}

/// Number of change summaries at `location` with `change_type`
#[allow(dead_code)]
pub fn count_changes(changes: &[ChangeSummary], location: &str, change_type: ChangeType) -> usize {
    changes
        .iter()
        .filter(|c| c.location == location && c.change_type == change_type)
        .count()
}
