use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::catalog::{Exhibition, OriginatingData, Person, Tag};
use super::entity::Entity;
use super::group::Group;
use crate::errors::{MergeError, Result};

/// Persisted state of one conference, as returned by the read collaborator.
///
/// Maps are keyed by entity id; `BTreeMap` keeps iteration (and therefore
/// merge and save ordering) deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub groups: BTreeMap<String, Group>,
    #[serde(default)]
    pub people: BTreeMap<String, Person>,
    #[serde(default)]
    pub tags: BTreeMap<String, Tag>,
    #[serde(default)]
    pub exhibitions: BTreeMap<String, Exhibition>,
    #[serde(default)]
    pub originating_datas: BTreeMap<String, OriginatingData>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of top-level entities across all kinds
    pub fn len(&self) -> usize {
        self.groups.len()
            + self.people.len()
            + self.tags.len()
            + self.exhibitions.len()
            + self.originating_datas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that every map key equals the id carried by its entity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescriptor` naming the first offending table and key.
    pub fn validate_keys(&self) -> Result<()> {
        check_keys(&self.groups)?;
        check_keys(&self.people)?;
        check_keys(&self.tags)?;
        check_keys(&self.exhibitions)?;
        check_keys(&self.originating_datas)
    }
}

fn check_keys<T: Entity>(map: &BTreeMap<String, T>) -> Result<()> {
    for (key, entity) in map {
        if entity.id() != Some(key.as_str()) {
            return Err(MergeError::InvalidDescriptor {
                location: T::KIND.location().to_string(),
                reason: format!(
                    "map key `{}` does not match entity id {:?}",
                    key,
                    entity.id()
                ),
            });
        }
    }
    Ok(())
}

/// Keys the caller considers changed since the last load, per entity kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirtyKeys {
    #[serde(default)]
    pub groups: BTreeSet<String>,
    #[serde(default)]
    pub people: BTreeSet<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub exhibitions: BTreeSet<String>,
    #[serde(default)]
    pub originating_datas: BTreeSet<String>,
}

impl DirtyKeys {
    /// Total number of dirty keys across all kinds
    pub fn len(&self) -> usize {
        self.groups.len()
            + self.people.len()
            + self.tags.len()
            + self.exhibitions.len()
            + self.originating_datas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
            && self.people.is_empty()
            && self.tags.is_empty()
            && self.exhibitions.is_empty()
            && self.originating_datas.is_empty()
    }

    /// Derive dirty keys by comparing two snapshots.
    ///
    /// A key is dirty when it exists on only one side or the entities differ.
    /// Callers without UI-level change tracking (e.g. a batch import) use this
    /// instead of hand-maintained sets.
    pub fn between(original: &Snapshot, edited: &Snapshot) -> Self {
        Self {
            groups: changed_keys(&original.groups, &edited.groups),
            people: changed_keys(&original.people, &edited.people),
            tags: changed_keys(&original.tags, &edited.tags),
            exhibitions: changed_keys(&original.exhibitions, &edited.exhibitions),
            originating_datas: changed_keys(
                &original.originating_datas,
                &edited.originating_datas,
            ),
        }
    }
}

fn changed_keys<T: PartialEq>(
    original: &BTreeMap<String, T>,
    edited: &BTreeMap<String, T>,
) -> BTreeSet<String> {
    let removed = original.keys().filter(|k| !edited.contains_key(*k));
    let added_or_changed = edited
        .iter()
        .filter(|(k, v)| original.get(*k) != Some(*v))
        .map(|(k, _)| k);
    removed.chain(added_or_changed).cloned().collect()
}
