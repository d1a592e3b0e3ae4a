//! Dirty-key classification and save planning.
//!
//! The entry point is [`SavePlan::build`]. Everything here is pure: the plan is
//! computed from the original and edited snapshots without touching storage.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::diff::model::{EntityDiff, GroupUpdatePlan, Keyed, LinkDiff, SavePlan};
use crate::errors::Result;
use crate::model::{DirtyKeys, Entity, Group, Snapshot};

/// Field carrying the client-only lifecycle flag; never persisted.
const IS_NEW_FIELD: &str = "isNew";

/// Fields a group patch never carries.
const PATCH_EXCLUDED_FIELDS: &[&str] = &["id", IS_NEW_FIELD];

/// Classify dirty keys of one kind.
///
/// A key that resolves in `edited` to an entity marked new is *new*; one that
/// resolves to a persisted entity is *updated*; one that no longer resolves
/// is *deleted*. Every classified entity keeps the dirty key it was found
/// under. An entity without an id takes its key as id; one whose id differs
/// from its key is *rejected* and never reaches storage.
pub fn classify<T: Entity + Clone>(
    dirty: &BTreeSet<String>,
    edited: &BTreeMap<String, T>,
) -> EntityDiff<Keyed<T>> {
    let mut diff = EntityDiff::default();
    for key in dirty {
        let Some(entity) = edited.get(key) else {
            diff.deleted.push(key.clone());
            continue;
        };
        if entity.id().is_some_and(|id| id != key.as_str()) {
            diff.rejected.push(key.clone());
            continue;
        }
        let mut entity = entity.clone();
        entity.fill_id(key);
        if entity.is_new() {
            diff.new.push(Keyed::new(key.as_str(), entity));
        } else {
            diff.updated.push(Keyed::new(key.as_str(), entity));
        }
    }
    diff
}

/// Minimal diff of a nested child collection.
///
/// Children present only in `edited` (or marked new) are new, children whose
/// content changed are updated, and ids missing from `edited` are deleted.
/// Unchanged children produce nothing.
pub fn diff_children<T: Entity + Clone + PartialEq>(original: &[T], edited: &[T]) -> EntityDiff<T> {
    let before: BTreeMap<&str, &T> = original
        .iter()
        .filter_map(|item| item.id().map(|id| (id, item)))
        .collect();

    let mut diff = EntityDiff::default();
    let mut kept = BTreeSet::new();
    for item in edited {
        let existing = item.id().and_then(|id| before.get(id).copied());
        match existing {
            Some(prior) if !item.is_new() => {
                kept.extend(item.id());
                if prior != item {
                    diff.updated.push(item.clone());
                }
            }
            _ => diff.new.push(item.clone()),
        }
    }
    diff.deleted = before
        .keys()
        .filter(|id| !kept.contains(*id))
        .map(|id| id.to_string())
        .collect();
    diff
}

/// Link delta between two id sets
pub fn diff_links(original: Option<&BTreeSet<String>>, edited: &BTreeSet<String>) -> LinkDiff {
    let empty = BTreeSet::new();
    let original = original.unwrap_or(&empty);
    LinkDiff {
        added: edited.difference(original).cloned().collect(),
        removed: original.difference(edited).cloned().collect(),
    }
}

/// Changed, present scalar fields of `edited` relative to `original`.
///
/// Fields absent from `edited` are left out so they never clobber stored
/// values. Returns `None` when nothing changed.
pub fn group_patch(original: &Group, edited: &Group) -> Result<Option<Value>> {
    let before = serde_json::to_value(original.scalar_fields())?;
    let after = serde_json::to_value(edited.scalar_fields())?;

    let (Value::Object(before), Value::Object(after)) = (before, after) else {
        return Ok(None);
    };

    let patch: Map<String, Value> = after
        .into_iter()
        .filter(|(key, _)| !PATCH_EXCLUDED_FIELDS.contains(&key.as_str()))
        .filter(|(key, value)| before.get(key) != Some(value))
        .collect();

    Ok((!patch.is_empty()).then_some(Value::Object(patch)))
}

/// Serialize an entity for persistence, dropping the client-only `isNew` flag at every depth.
pub fn persist_payload<T: Serialize>(entity: &T) -> Result<Value> {
    let mut value = serde_json::to_value(entity)?;
    strip_field(&mut value, IS_NEW_FIELD);
    Ok(value)
}

fn strip_field(value: &mut Value, field: &str) {
    match value {
        Value::Object(map) => {
            map.remove(field);
            for nested in map.values_mut() {
                strip_field(nested, field);
            }
        }
        Value::Array(items) => {
            for nested in items {
                strip_field(nested, field);
            }
        }
        _ => {}
    }
}

impl GroupUpdatePlan {
    /// Diff one persisted group, stored under `key`, against its edited state.
    ///
    /// A child collection absent from `edited` is treated as untouched.
    pub fn between(key: &str, original: &Group, edited: &Group) -> Result<Self> {
        fn children<T: Entity + Clone + PartialEq>(
            original: &Option<Vec<T>>,
            edited: &Option<Vec<T>>,
        ) -> EntityDiff<T> {
            match edited {
                Some(edited) => diff_children(original.as_deref().unwrap_or_default(), edited),
                None => EntityDiff::default(),
            }
        }

        Ok(Self {
            id: key.to_string(),
            patch: group_patch(original, edited)?,
            elements: children(&original.elements, &edited.elements),
            required_items: children(&original.required_items, &edited.required_items),
            people: children(&original.people, &edited.people),
            exhibitions: children(&original.exhibitions, &edited.exhibitions),
            tags: edited
                .tag_ids
                .as_ref()
                .map(|ids| diff_links(original.tag_ids.as_ref(), ids))
                .unwrap_or_default(),
        })
    }
}

impl SavePlan {
    /// Classify every dirty key against the original snapshot.
    ///
    /// # Errors
    ///
    /// `Serialization` if a group's fields cannot be rendered as a patch.
    pub fn build(original: &Snapshot, edited: &Snapshot, dirty: &DirtyKeys) -> Result<Self> {
        let groups = classify(&dirty.groups, &edited.groups);
        let fallback = Group::default();

        let updated_groups = groups
            .updated
            .iter()
            .map(|group| {
                let before = original.groups.get(&group.key).unwrap_or(&fallback);
                GroupUpdatePlan::between(&group.key, before, &group.entity)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            tags: classify(&dirty.tags, &edited.tags),
            originating_datas: classify(&dirty.originating_datas, &edited.originating_datas),
            people: classify(&dirty.people, &edited.people),
            exhibitions: classify(&dirty.exhibitions, &edited.exhibitions),
            new_groups: groups.new,
            deleted_groups: groups.deleted,
            updated_groups,
            rejected_groups: groups.rejected,
        })
    }
}
