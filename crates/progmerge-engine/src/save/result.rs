use progmerge_core::model::{DirtyKeys, EntityKind};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Per-key outcome of a save: `true` when every call touching the key succeeded.
///
/// Child kinds of a group report under the group's key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResult {
    pub groups: BTreeMap<String, bool>,
    pub people: BTreeMap<String, bool>,
    pub tags: BTreeMap<String, bool>,
    pub exhibitions: BTreeMap<String, bool>,
    pub originating_datas: BTreeMap<String, bool>,
}

impl SaveResult {
    /// Every dirty key with the same outcome
    pub fn uniform(dirty: &DirtyKeys, ok: bool) -> Self {
        fn all(keys: &BTreeSet<String>, ok: bool) -> BTreeMap<String, bool> {
            keys.iter().map(|k| (k.clone(), ok)).collect()
        }
        Self {
            groups: all(&dirty.groups, ok),
            people: all(&dirty.people, ok),
            tags: all(&dirty.tags, ok),
            exhibitions: all(&dirty.exhibitions, ok),
            originating_datas: all(&dirty.originating_datas, ok),
        }
    }

    fn table_mut(&mut self, kind: EntityKind) -> &mut BTreeMap<String, bool> {
        match kind {
            EntityKind::Person => &mut self.people,
            EntityKind::Tag => &mut self.tags,
            EntityKind::Exhibition => &mut self.exhibitions,
            EntityKind::OriginatingData => &mut self.originating_datas,
            _ => &mut self.groups,
        }
    }

    /// Record an outcome; a key that already failed stays failed.
    pub fn record<I>(&mut self, kind: EntityKind, keys: I, ok: bool)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let table = self.table_mut(kind);
        for key in keys {
            table
                .entry(key.into())
                .and_modify(|v| *v &= ok)
                .or_insert(ok);
        }
    }

    /// Fold another partial result into this one
    pub fn absorb(&mut self, other: SaveResult) {
        for (kind, table) in [
            (EntityKind::Group, other.groups),
            (EntityKind::Person, other.people),
            (EntityKind::Tag, other.tags),
            (EntityKind::Exhibition, other.exhibitions),
            (EntityKind::OriginatingData, other.originating_datas),
        ] {
            for (key, ok) in table {
                self.record(kind, [key], ok);
            }
        }
    }

    fn tables(&self) -> [(EntityKind, &BTreeMap<String, bool>); 5] {
        [
            (EntityKind::Group, &self.groups),
            (EntityKind::Person, &self.people),
            (EntityKind::Tag, &self.tags),
            (EntityKind::Exhibition, &self.exhibitions),
            (EntityKind::OriginatingData, &self.originating_datas),
        ]
    }

    pub fn is_success(&self) -> bool {
        self.tables()
            .iter()
            .all(|(_, table)| table.values().all(|ok| *ok))
    }

    /// Keys whose save failed, by kind
    pub fn failed_keys(&self) -> Vec<(EntityKind, String)> {
        self.tables()
            .iter()
            .flat_map(|(kind, table)| {
                table
                    .iter()
                    .filter(|(_, ok)| !**ok)
                    .map(move |(key, _)| (*kind, key.clone()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tables().iter().map(|(_, table)| table.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
