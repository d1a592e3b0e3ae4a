//! Save-plan types.
//!
//! All types implement `Debug, Clone, Serialize, PartialEq`.
//! Collections are ordered by key so a plan serializes deterministically.

use serde::Serialize;

use crate::model::{
    Element, Exhibition, Group, GroupExhibition, GroupPerson, OriginatingData, Person,
    RequiredItem, Tag,
};

/// A dirty entity together with the snapshot key it was classified under.
///
/// The key, not the entity's own `id` field, names the entity in the save
/// result and in gateway calls.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Keyed<T> {
    pub key: String,
    #[serde(flatten)]
    pub entity: T,
}

impl<T> Keyed<T> {
    pub fn new(key: impl Into<String>, entity: T) -> Self {
        Self {
            key: key.into(),
            entity,
        }
    }
}

/// Entities of one kind, classified against the original state.
///
/// Top-level kinds carry [`Keyed`] items; nested children carry bare entities.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EntityDiff<T> {
    /// Client-only entities to insert
    pub new: Vec<T>,
    /// Persisted entities whose stored state must be updated
    pub updated: Vec<T>,
    /// Keys that no longer resolve in the edited snapshot
    pub deleted: Vec<String>,
    /// Dirty keys whose edited entity carries a different id; never sent
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<String>,
}

impl<T> Default for EntityDiff<T> {
    fn default() -> Self {
        Self {
            new: Vec::new(),
            updated: Vec::new(),
            deleted: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl<T> EntityDiff<T> {
    pub fn is_empty(&self) -> bool {
        self.new.is_empty()
            && self.updated.is_empty()
            && self.deleted.is_empty()
            && self.rejected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.new.len() + self.updated.len() + self.deleted.len() + self.rejected.len()
    }
}

/// Added and removed group-tag links
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct LinkDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl LinkDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Everything needed to bring one persisted group up to date.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupUpdatePlan {
    /// Dirty key of the group
    pub id: String,
    /// Changed scalar fields only; `None` when the group's own fields are unchanged
    pub patch: Option<serde_json::Value>,
    pub elements: EntityDiff<Element>,
    pub required_items: EntityDiff<RequiredItem>,
    pub people: EntityDiff<GroupPerson>,
    pub exhibitions: EntityDiff<GroupExhibition>,
    pub tags: LinkDiff,
}

impl GroupUpdatePlan {
    /// True when no mutation call is needed for this group
    pub fn is_noop(&self) -> bool {
        self.patch.is_none()
            && self.elements.is_empty()
            && self.required_items.is_empty()
            && self.people.is_empty()
            && self.exhibitions.is_empty()
            && self.tags.is_empty()
    }
}

/// Classified save, ready for execution or inspection.
///
/// Tier 1 kinds (`tags`, `originating_datas`, `people`, `exhibitions`) are
/// persisted before groups; their deletions are deferred until groups are done.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SavePlan {
    pub tags: EntityDiff<Keyed<Tag>>,
    pub originating_datas: EntityDiff<Keyed<OriginatingData>>,
    pub people: EntityDiff<Keyed<Person>>,
    pub exhibitions: EntityDiff<Keyed<Exhibition>>,
    pub new_groups: Vec<Keyed<Group>>,
    pub deleted_groups: Vec<String>,
    pub updated_groups: Vec<GroupUpdatePlan>,
    /// Dirty group keys whose edited group carries a different id
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected_groups: Vec<String>,
}

impl SavePlan {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
            && self.originating_datas.is_empty()
            && self.people.is_empty()
            && self.exhibitions.is_empty()
            && self.new_groups.is_empty()
            && self.deleted_groups.is_empty()
            && self.updated_groups.is_empty()
            && self.rejected_groups.is_empty()
    }
}
