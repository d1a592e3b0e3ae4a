//! Recursive merge over the entity graph.
//!
//! Children are merged before their parents (uploaders inside required items,
//! then a group's child collections, then the group's own fields), so every
//! parent's audit trail already contains its children's decisions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use super::field::FieldMerger;
use super::resolve::resolve_references;
use super::MergeOptions;
use crate::change::ChangeSummary;
use crate::errors::{MergeError, Result};
use crate::model::{
    Element, Entity, EntityKind, Group, GroupExhibition, GroupPerson, Hallway, ImportPayload,
    IntermediaryData, OriginatingData, Person, RequiredItem, Snapshot, Uploader,
};
use crate::{log_op_end, log_op_error, log_op_start};

/// Result of [`merge_import`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    /// Merged snapshot; every entity carries an id and an accurate `is_new`
    pub snapshot: Snapshot,
    /// Hallways are not part of the persisted snapshot and are returned alongside it
    pub hallways: Vec<Hallway>,
    /// Audit log in decision order
    pub changes: Vec<ChangeSummary>,
    pub merged_at: DateTime<Utc>,
}

/// Merge import sources into the last-loaded snapshot.
///
/// Sources are first folded into one another, then the fold result is merged
/// into `original` (the original is the left, base side of every decision).
///
/// # Errors
///
/// - `ImportDataEmpty` when `imports` has no sources
/// - `InvalidDescriptor` when a snapshot map key disagrees with its entity id
pub fn merge_import(
    original: &Snapshot,
    imports: &ImportPayload,
    options: MergeOptions,
) -> Result<MergeOutcome> {
    log_op_start!("merge_import", source_count = imports.len());
    let start = Instant::now();

    let outcome = merge_import_impl(original, imports, options).map_err(|e| {
        log_op_error!(
            "merge_import",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "merge_import",
        duration_ms = start.elapsed().as_millis() as u64,
        change_count = outcome.changes.len()
    );

    Ok(outcome)
}

fn merge_import_impl(
    original: &Snapshot,
    imports: &ImportPayload,
    options: MergeOptions,
) -> Result<MergeOutcome> {
    let (folded, mut changes) = fold_sources(imports, options)?;
    original.validate_keys()?;

    let (merged, merge_changes) =
        merge_intermediary(&snapshot_as_source(original), &folded, options);
    changes.extend(merge_changes);

    let known = KnownIds::collect(original);

    let mut groups = merged.groups.unwrap_or_default();
    for group in &mut groups {
        known.settle_group(group);
    }
    let mut people = merged.people.unwrap_or_default();
    for person in &mut people {
        settle(person, &known.people);
    }
    let mut originating_datas = merged.originating_datas.unwrap_or_default();
    for data in &mut originating_datas {
        settle(data, &known.originating_datas);
    }
    let mut hallways = merged.hallways.unwrap_or_default();
    for hallway in &mut hallways {
        hallway.ensure_identity();
    }

    let mut snapshot = Snapshot {
        groups: into_map(groups),
        people: into_map(people),
        tags: original.tags.clone(),
        exhibitions: original.exhibitions.clone(),
        originating_datas: into_map(originating_datas),
    };
    resolve_references(&mut snapshot, options.matcher(), &mut changes);

    Ok(MergeOutcome {
        snapshot,
        hallways,
        changes,
        merged_at: Utc::now(),
    })
}

/// Fold every import source into one.
///
/// The first source in key order is the accumulator; the others are merged
/// into it one at a time. With more than two sources the result can depend on
/// that order when sources disagree on a field the first source lacks.
///
/// # Errors
///
/// `ImportDataEmpty` when there is no source at all.
pub fn fold_sources(
    imports: &ImportPayload,
    options: MergeOptions,
) -> Result<(IntermediaryData, Vec<ChangeSummary>)> {
    let mut sources = imports.values();
    let first = sources.next().ok_or(MergeError::ImportDataEmpty)?;

    let mut changes = Vec::new();
    let folded = sources.fold(first.clone(), |acc, next| {
        let (merged, step) = merge_intermediary(&acc, next, options);
        changes.extend(step);
        merged
    });
    Ok((folded, changes))
}

/// Merge two sets of top-level collections. Each collection merges independently.
pub fn merge_intermediary(
    left: &IntermediaryData,
    right: &IntermediaryData,
    options: MergeOptions,
) -> (IntermediaryData, Vec<ChangeSummary>) {
    let mut fm = FieldMerger::new("", options);
    let merged = IntermediaryData {
        groups: fm.merge_field("groups", left.groups.as_ref(), right.groups.as_ref(), |fm, _, x, y| {
            fm.list_merger(EntityKind::Group.location(), x, y, merge_group)
        }),
        hallways: fm.merge_field(
            "hallways",
            left.hallways.as_ref(),
            right.hallways.as_ref(),
            |fm, _, x, y| fm.list_merger(EntityKind::Hallway.location(), x, y, merge_hallway),
        ),
        people: fm.merge_field("people", left.people.as_ref(), right.people.as_ref(), |fm, _, x, y| {
            fm.list_merger(EntityKind::Person.location(), x, y, merge_person)
        }),
        originating_datas: fm.merge_field(
            "originatingDatas",
            left.originating_datas.as_ref(),
            right.originating_datas.as_ref(),
            |fm, _, x, y| {
                fm.list_merger(
                    EntityKind::OriginatingData.location(),
                    x,
                    y,
                    merge_originating_data,
                )
            },
        ),
    };
    (merged, fm.finish())
}

pub(crate) fn merge_group(
    location: &str,
    a: &Group,
    b: &Group,
    options: MergeOptions,
) -> (Group, Vec<ChangeSummary>) {
    let mut fm = FieldMerger::new(location, options);
    // children first
    let elements = fm.merge_field("elements", a.elements.as_ref(), b.elements.as_ref(), |fm, _, x, y| {
        fm.list_merger(EntityKind::Element.location(), x, y, merge_element)
    });
    let required_items = fm.merge_field(
        "requiredItems",
        a.required_items.as_ref(),
        b.required_items.as_ref(),
        |fm, _, x, y| fm.list_merger(EntityKind::RequiredItem.location(), x, y, merge_required_item),
    );
    let tag_names = fm.merge_field(
        "tagNames",
        a.tag_names.as_ref(),
        b.tag_names.as_ref(),
        |fm, _, x, y| fm.list_merger("TagName", x, y, merge_tag_name),
    );
    let people = fm.merge_field("people", a.people.as_ref(), b.people.as_ref(), |fm, _, x, y| {
        fm.list_merger(EntityKind::GroupPerson.location(), x, y, merge_group_person)
    });
    let exhibitions = fm.merge_field(
        "exhibitions",
        a.exhibitions.as_ref(),
        b.exhibitions.as_ref(),
        |fm, _, x, y| {
            fm.list_merger(
                EntityKind::GroupExhibition.location(),
                x,
                y,
                merge_group_exhibition,
            )
        },
    );

    let merged = Group {
        id: fm.merge_field("id", a.id.as_ref(), b.id.as_ref(), FieldMerger::default_merger),
        is_new: a.is_new && b.is_new,
        title: fm.merge_field("title", a.title.as_ref(), b.title.as_ref(), FieldMerger::default_merger),
        short_title: fm.merge_field(
            "shortTitle",
            a.short_title.as_ref(),
            b.short_title.as_ref(),
            FieldMerger::default_merger,
        ),
        type_name: fm.merge_field(
            "typeName",
            a.type_name.as_ref(),
            b.type_name.as_ref(),
            FieldMerger::default_merger,
        ),
        description: fm.merge_field(
            "description",
            a.description.as_ref(),
            b.description.as_ref(),
            FieldMerger::default_merger,
        ),
        originating_data_source_id: fm.merge_field(
            "originatingDataSourceId",
            a.originating_data_source_id.as_ref(),
            b.originating_data_source_id.as_ref(),
            FieldMerger::source_id_merger,
        ),
        tag_ids: fm.merge_field(
            "tagIds",
            a.tag_ids.as_ref(),
            b.tag_ids.as_ref(),
            FieldMerger::union_merger,
        ),
        tag_names,
        elements,
        required_items,
        people,
        exhibitions,
    };
    (merged, fm.finish())
}

fn merge_element(
    location: &str,
    a: &Element,
    b: &Element,
    options: MergeOptions,
) -> (Element, Vec<ChangeSummary>) {
    let mut fm = FieldMerger::new(location, options);
    let merged = Element {
        id: fm.merge_field("id", a.id.as_ref(), b.id.as_ref(), FieldMerger::default_merger),
        is_new: a.is_new && b.is_new,
        name: fm.merge_field("name", a.name.as_ref(), b.name.as_ref(), FieldMerger::default_merger),
        type_name: fm.merge_field(
            "typeName",
            a.type_name.as_ref(),
            b.type_name.as_ref(),
            FieldMerger::default_merger,
        ),
        data: fm.merge_field("data", a.data.as_ref(), b.data.as_ref(), FieldMerger::default_merger),
        is_hidden: fm.merge_field(
            "isHidden",
            a.is_hidden.as_ref(),
            b.is_hidden.as_ref(),
            FieldMerger::default_merger,
        ),
        originating_data_source_id: fm.merge_field(
            "originatingDataSourceId",
            a.originating_data_source_id.as_ref(),
            b.originating_data_source_id.as_ref(),
            FieldMerger::source_id_merger,
        ),
    };
    (merged, fm.finish())
}

fn merge_required_item(
    location: &str,
    a: &RequiredItem,
    b: &RequiredItem,
    options: MergeOptions,
) -> (RequiredItem, Vec<ChangeSummary>) {
    let mut fm = FieldMerger::new(location, options);
    let uploaders = fm.merge_field(
        "uploaders",
        a.uploaders.as_ref(),
        b.uploaders.as_ref(),
        |fm, _, x, y| fm.list_merger(EntityKind::Uploader.location(), x, y, merge_uploader),
    );
    let merged = RequiredItem {
        id: fm.merge_field("id", a.id.as_ref(), b.id.as_ref(), FieldMerger::default_merger),
        is_new: a.is_new && b.is_new,
        name: fm.merge_field("name", a.name.as_ref(), b.name.as_ref(), FieldMerger::default_merger),
        type_name: fm.merge_field(
            "typeName",
            a.type_name.as_ref(),
            b.type_name.as_ref(),
            FieldMerger::default_merger,
        ),
        uploads_remaining: fm.merge_field(
            "uploadsRemaining",
            a.uploads_remaining.as_ref(),
            b.uploads_remaining.as_ref(),
            FieldMerger::max_merger,
        ),
        uploaders,
        originating_data_source_id: fm.merge_field(
            "originatingDataSourceId",
            a.originating_data_source_id.as_ref(),
            b.originating_data_source_id.as_ref(),
            FieldMerger::source_id_merger,
        ),
    };
    (merged, fm.finish())
}

fn merge_uploader(
    location: &str,
    a: &Uploader,
    b: &Uploader,
    options: MergeOptions,
) -> (Uploader, Vec<ChangeSummary>) {
    let mut fm = FieldMerger::new(location, options);
    let merged = Uploader {
        id: fm.merge_field("id", a.id.as_ref(), b.id.as_ref(), FieldMerger::default_merger),
        is_new: a.is_new && b.is_new,
        name: fm.merge_field("name", a.name.as_ref(), b.name.as_ref(), FieldMerger::default_merger),
        email: fm.merge_field("email", a.email.as_ref(), b.email.as_ref(), FieldMerger::default_merger),
        emails_sent_count: fm.merge_field(
            "emailsSentCount",
            a.emails_sent_count.as_ref(),
            b.emails_sent_count.as_ref(),
            FieldMerger::max_merger,
        ),
    };
    (merged, fm.finish())
}

#[allow(clippy::ptr_arg)]
fn merge_tag_name(
    _location: &str,
    a: &String,
    _b: &String,
    _options: MergeOptions,
) -> (String, Vec<ChangeSummary>) {
    (a.clone(), Vec::new())
}

fn merge_group_person(
    location: &str,
    a: &GroupPerson,
    b: &GroupPerson,
    options: MergeOptions,
) -> (GroupPerson, Vec<ChangeSummary>) {
    let mut fm = FieldMerger::new(location, options);
    let merged = GroupPerson {
        id: fm.merge_field("id", a.id.as_ref(), b.id.as_ref(), FieldMerger::default_merger),
        is_new: a.is_new && b.is_new,
        person_id: fm.merge_field(
            "personId",
            a.person_id.as_ref(),
            b.person_id.as_ref(),
            FieldMerger::default_merger,
        ),
        person_name: fm.merge_field(
            "personName",
            a.person_name.as_ref(),
            b.person_name.as_ref(),
            FieldMerger::default_merger,
        ),
        role_name: fm.merge_field(
            "roleName",
            a.role_name.as_ref(),
            b.role_name.as_ref(),
            FieldMerger::default_merger,
        ),
        priority: fm.merge_field(
            "priority",
            a.priority.as_ref(),
            b.priority.as_ref(),
            FieldMerger::default_merger,
        ),
    };
    (merged, fm.finish())
}

fn merge_group_exhibition(
    location: &str,
    a: &GroupExhibition,
    b: &GroupExhibition,
    options: MergeOptions,
) -> (GroupExhibition, Vec<ChangeSummary>) {
    let mut fm = FieldMerger::new(location, options);
    let merged = GroupExhibition {
        id: fm.merge_field("id", a.id.as_ref(), b.id.as_ref(), FieldMerger::default_merger),
        is_new: a.is_new && b.is_new,
        exhibition_id: fm.merge_field(
            "exhibitionId",
            a.exhibition_id.as_ref(),
            b.exhibition_id.as_ref(),
            FieldMerger::default_merger,
        ),
        exhibition_name: fm.merge_field(
            "exhibitionName",
            a.exhibition_name.as_ref(),
            b.exhibition_name.as_ref(),
            FieldMerger::default_merger,
        ),
        priority: fm.merge_field(
            "priority",
            a.priority.as_ref(),
            b.priority.as_ref(),
            FieldMerger::default_merger,
        ),
    };
    (merged, fm.finish())
}

fn merge_person(
    location: &str,
    a: &Person,
    b: &Person,
    options: MergeOptions,
) -> (Person, Vec<ChangeSummary>) {
    let mut fm = FieldMerger::new(location, options);
    let merged = Person {
        id: fm.merge_field("id", a.id.as_ref(), b.id.as_ref(), FieldMerger::default_merger),
        is_new: a.is_new && b.is_new,
        name: fm.merge_field("name", a.name.as_ref(), b.name.as_ref(), FieldMerger::default_merger),
        affiliation: fm.merge_field(
            "affiliation",
            a.affiliation.as_ref(),
            b.affiliation.as_ref(),
            FieldMerger::default_merger,
        ),
        email: fm.merge_field("email", a.email.as_ref(), b.email.as_ref(), FieldMerger::default_merger),
        registrant_id: fm.merge_field(
            "registrantId",
            a.registrant_id.as_ref(),
            b.registrant_id.as_ref(),
            FieldMerger::default_merger,
        ),
        originating_data_source_id: fm.merge_field(
            "originatingDataSourceId",
            a.originating_data_source_id.as_ref(),
            b.originating_data_source_id.as_ref(),
            FieldMerger::source_id_merger,
        ),
    };
    (merged, fm.finish())
}

fn merge_originating_data(
    location: &str,
    a: &OriginatingData,
    b: &OriginatingData,
    options: MergeOptions,
) -> (OriginatingData, Vec<ChangeSummary>) {
    let mut fm = FieldMerger::new(location, options);
    let merged = OriginatingData {
        id: fm.merge_field("id", a.id.as_ref(), b.id.as_ref(), FieldMerger::default_merger),
        is_new: a.is_new && b.is_new,
        // the source id is this record's key, so it is kept, not concatenated
        source_id: fm.merge_field(
            "sourceId",
            a.source_id.as_ref(),
            b.source_id.as_ref(),
            FieldMerger::default_merger,
        ),
        data: fm.merge_field("data", a.data.as_ref(), b.data.as_ref(), FieldMerger::default_merger),
    };
    (merged, fm.finish())
}

fn merge_hallway(
    location: &str,
    a: &Hallway,
    b: &Hallway,
    options: MergeOptions,
) -> (Hallway, Vec<ChangeSummary>) {
    let mut fm = FieldMerger::new(location, options);
    let merged = Hallway {
        id: fm.merge_field("id", a.id.as_ref(), b.id.as_ref(), FieldMerger::default_merger),
        is_new: a.is_new && b.is_new,
        name: fm.merge_field("name", a.name.as_ref(), b.name.as_ref(), FieldMerger::default_merger),
        colour: fm.merge_field("colour", a.colour.as_ref(), b.colour.as_ref(), FieldMerger::default_merger),
        priority: fm.merge_field(
            "priority",
            a.priority.as_ref(),
            b.priority.as_ref(),
            FieldMerger::default_merger,
        ),
    };
    (merged, fm.finish())
}

fn snapshot_as_source(original: &Snapshot) -> IntermediaryData {
    IntermediaryData {
        groups: Some(original.groups.values().cloned().collect()),
        hallways: None,
        people: Some(original.people.values().cloned().collect()),
        originating_datas: Some(original.originating_datas.values().cloned().collect()),
    }
}

fn into_map<T: Entity>(items: Vec<T>) -> BTreeMap<String, T> {
    items
        .into_iter()
        .filter_map(|item| {
            let id = item.id()?.to_string();
            Some((id, item))
        })
        .collect()
}

/// Give `entity` an id if it has none; otherwise mark it new unless `known` has it.
fn settle<T: Entity>(entity: &mut T, known: &BTreeSet<String>) {
    if !entity.ensure_identity() {
        let persisted = entity.id().is_some_and(|id| known.contains(id));
        entity.set_new(!persisted);
    }
}

/// Ids present in the original snapshot, per kind
#[derive(Debug, Default)]
struct KnownIds {
    groups: BTreeSet<String>,
    elements: BTreeSet<String>,
    required_items: BTreeSet<String>,
    uploaders: BTreeSet<String>,
    group_people: BTreeSet<String>,
    group_exhibitions: BTreeSet<String>,
    people: BTreeSet<String>,
    originating_datas: BTreeSet<String>,
}

fn collect_ids<'a, T: Entity + 'a>(
    target: &mut BTreeSet<String>,
    items: impl IntoIterator<Item = &'a T>,
) {
    target.extend(items.into_iter().filter_map(|i| i.id().map(str::to_string)));
}

impl KnownIds {
    fn collect(snapshot: &Snapshot) -> Self {
        let mut known = KnownIds::default();
        collect_ids(&mut known.groups, snapshot.groups.values());
        collect_ids(&mut known.people, snapshot.people.values());
        collect_ids(&mut known.originating_datas, snapshot.originating_datas.values());
        for group in snapshot.groups.values() {
            collect_ids(&mut known.elements, group.elements.iter().flatten());
            collect_ids(&mut known.required_items, group.required_items.iter().flatten());
            collect_ids(&mut known.group_people, group.people.iter().flatten());
            collect_ids(&mut known.group_exhibitions, group.exhibitions.iter().flatten());
            for item in group.required_items.iter().flatten() {
                collect_ids(&mut known.uploaders, item.uploaders.iter().flatten());
            }
        }
        known
    }

    fn settle_group(&self, group: &mut Group) {
        settle(group, &self.groups);
        for element in group.elements.iter_mut().flatten() {
            settle(element, &self.elements);
        }
        for item in group.required_items.iter_mut().flatten() {
            settle(item, &self.required_items);
            for uploader in item.uploaders.iter_mut().flatten() {
                settle(uploader, &self.uploaders);
            }
        }
        for person in group.people.iter_mut().flatten() {
            settle(person, &self.group_people);
        }
        for exhibition in group.exhibitions.iter_mut().flatten() {
            settle(exhibition, &self.group_exhibitions);
        }
    }
}
