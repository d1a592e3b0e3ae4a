//! Resolve names carried by import descriptors into entity ids.
//!
//! Imports name tags, people and exhibitions instead of referencing their ids.
//! After the graph merge each name is matched against the merged collection;
//! a name nobody matches creates a new entity.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::change::{audit_value, ChangeSummary, ChangeType};
use crate::matching::{EntityMatcher, Matchable};
use crate::model::{Entity, Exhibition, Person, Snapshot, Tag};

struct Pool<T> {
    items: Vec<T>,
}

impl<T> Pool<T>
where
    T: Entity + Matchable + Clone + Serialize,
{
    fn from_map(map: &BTreeMap<String, T>) -> Self {
        Self {
            items: map.values().cloned().collect(),
        }
    }

    fn resolve(
        &mut self,
        name: &str,
        matcher: EntityMatcher,
        changes: &mut Vec<ChangeSummary>,
        make: impl FnOnce(&str) -> T,
    ) -> Option<String> {
        if name.trim().is_empty() {
            return None;
        }
        let mut candidate = make(name);
        if let Some(index) = matcher.find_index(&candidate, &self.items) {
            return self.items[index].id().map(str::to_string);
        }

        candidate.ensure_identity();
        changes.push(
            ChangeSummary::new(T::KIND.location(), ChangeType::Insert, "created from referenced name")
                .with_new(audit_value(&candidate)),
        );
        let id = candidate.id().map(str::to_string);
        self.items.push(candidate);
        id
    }

    fn into_map(self) -> BTreeMap<String, T> {
        self.items
            .into_iter()
            .filter_map(|item| {
                let id = item.id()?.to_string();
                Some((id, item))
            })
            .collect()
    }
}

pub(super) fn resolve_references(
    snapshot: &mut Snapshot,
    matcher: EntityMatcher,
    changes: &mut Vec<ChangeSummary>,
) {
    let mut tags = Pool::from_map(&snapshot.tags);
    let mut people = Pool::from_map(&snapshot.people);
    let mut exhibitions = Pool::from_map(&snapshot.exhibitions);

    for group in snapshot.groups.values_mut() {
        if let Some(names) = group.tag_names.take() {
            let ids = group.tag_ids.get_or_insert_with(BTreeSet::new);
            for name in names {
                let resolved = tags.resolve(&name, matcher, changes, |n| Tag {
                    name: Some(n.to_string()),
                    ..Tag::default()
                });
                ids.extend(resolved);
            }
        }

        for link in group.people.iter_mut().flatten() {
            if link.person_id.is_some() {
                continue;
            }
            if let Some(name) = link.person_name.as_deref() {
                link.person_id = people.resolve(name, matcher, changes, |n| Person {
                    name: Some(n.to_string()),
                    ..Person::default()
                });
            }
        }

        for link in group.exhibitions.iter_mut().flatten() {
            if link.exhibition_id.is_some() {
                continue;
            }
            if let Some(name) = link.exhibition_name.as_deref() {
                link.exhibition_id = exhibitions.resolve(name, matcher, changes, |n| Exhibition {
                    name: Some(n.to_string()),
                    ..Exhibition::default()
                });
            }
        }
    }

    snapshot.tags = tags.into_map();
    snapshot.people = people.into_map();
    snapshot.exhibitions = exhibitions.into_map();
}
