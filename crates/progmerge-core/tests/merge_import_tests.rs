#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{count_changes, group, groups_source, payload, snapshot_with_groups};
use progmerge_core::model::{Element, GroupPerson, Person, Snapshot};
use progmerge_core::{merge_import, ChangeType, MergeError, MergeOptions};

#[test]
fn test_two_sources_same_keynote_merge_into_one_group() {
    // GIVEN two sources naming the same session with trivially different titles
    let imports = payload(vec![
        ("a", groups_source(vec![group(None, "Keynote", Some("src-a-1"))])),
        ("b", groups_source(vec![group(None, "Keynote ", Some("src-b-7"))])),
    ]);

    // WHEN merged into an empty conference
    let outcome = merge_import(&Snapshot::new(), &imports, MergeOptions::default()).unwrap();

    // THEN exactly one group exists, carrying both provenances in source order
    assert_eq!(outcome.snapshot.groups.len(), 1);
    let merged = outcome.snapshot.groups.values().next().unwrap();
    assert_eq!(
        merged.originating_data_source_id.as_deref(),
        Some("src-a-1¬src-b-7")
    );
    assert!(merged.is_new);

    // AND the audit log holds one group-level merge record
    assert_eq!(
        count_changes(&outcome.changes, "ContentGroup", ChangeType::MergeImported),
        1
    );
}

#[test]
fn test_id_match_wins_over_fuzzy_name_match() {
    let original = snapshot_with_groups(vec![
        group(Some("g-wrong"), "Symposium Aa", None),
        group(Some("g-right"), "Totally Unrelated Title", None),
    ]);
    let mut incoming = group(Some("g-right"), "Symposium A", None);
    incoming.description = Some("moved to hall B".into());

    let outcome = merge_import(
        &original,
        &payload(vec![("a", groups_source(vec![incoming]))]),
        MergeOptions::default(),
    )
    .unwrap();

    let groups = &outcome.snapshot.groups;
    assert_eq!(groups.len(), 2);
    assert_eq!(
        groups["g-right"].description.as_deref(),
        Some("moved to hall B")
    );
    assert!(groups["g-wrong"].description.is_none());
}

#[test]
fn test_fuzzy_threshold() {
    let cases = [
        ("Tea", "Sea", 2),
        ("Symposium A", "Symposium Aa", 1),
        ("Symposium A", "Completely Different", 2),
    ];
    for (existing, incoming, expected_groups) in cases {
        let original = snapshot_with_groups(vec![group(Some("g1"), existing, None)]);
        let outcome = merge_import(
            &original,
            &payload(vec![("a", groups_source(vec![group(None, incoming, None)]))]),
            MergeOptions::default(),
        )
        .unwrap();
        assert_eq!(
            outcome.snapshot.groups.len(),
            expected_groups,
            "{existing:?} vs {incoming:?}"
        );
    }
}

#[test]
fn test_fuzzy_matching_can_be_switched_off() {
    let original = snapshot_with_groups(vec![group(Some("g1"), "Symposium A", None)]);
    let options = MergeOptions {
        fuzzy_matching: false,
        ..MergeOptions::default()
    };
    let outcome = merge_import(
        &original,
        &payload(vec![("a", groups_source(vec![group(None, "Symposium Aa", None)]))]),
        options,
    )
    .unwrap();
    assert_eq!(outcome.snapshot.groups.len(), 2);
}

#[test]
fn test_provenance_is_concatenated_not_overwritten() {
    let original = snapshot_with_groups(vec![group(Some("g1"), "Poster Session", Some("A"))]);
    let outcome = merge_import(
        &original,
        &payload(vec![(
            "a",
            groups_source(vec![group(Some("g1"), "Poster Session", Some("B"))]),
        )]),
        MergeOptions::default(),
    )
    .unwrap();

    assert_eq!(
        outcome.snapshot.groups["g1"]
            .originating_data_source_id
            .as_deref(),
        Some("A¬B")
    );
}

#[test]
fn test_field_presence_is_preserved() {
    let original = snapshot_with_groups(vec![group(Some("g1"), "X", None)]);
    let mut incoming = group(Some("g1"), "ignored", None);
    incoming.title = None;

    let outcome = merge_import(
        &original,
        &payload(vec![("a", groups_source(vec![incoming]))]),
        MergeOptions::default(),
    )
    .unwrap();

    let merged = &outcome.snapshot.groups["g1"];
    assert_eq!(merged.title.as_deref(), Some("X"));

    // absent on both sides stays absent, not null or empty
    let value = serde_json::to_value(merged).unwrap();
    assert!(value.get("description").is_none());
    assert!(value.get("shortTitle").is_none());
}

#[test]
fn test_unmatched_labeling_flag() {
    let original = snapshot_with_groups(vec![
        group(Some("g1"), "Keynote", None),
        group(Some("g2"), "Lunch Break Social", None),
    ]);
    let imports = payload(vec![("a", groups_source(vec![group(None, "Keynote", None)]))]);

    let legacy = merge_import(&original, &imports, MergeOptions::default()).unwrap();
    assert_eq!(
        count_changes(&legacy.changes, "ContentGroup", ChangeType::Insert),
        1,
        "untouched g2 is reported as inserted unmatched"
    );

    let strict = merge_import(
        &original,
        &imports,
        MergeOptions {
            legacy_unmatched_labeling: false,
            ..MergeOptions::default()
        },
    )
    .unwrap();
    assert_eq!(
        count_changes(&strict.changes, "ContentGroup", ChangeType::Insert),
        0
    );
    // the flag changes only the audit log
    assert_eq!(legacy.snapshot, strict.snapshot);
}

#[test]
fn test_sources_fold_in_key_order() {
    let mut first = group(None, "Panel Discussion", None);
    first.description = None;
    let mut second = group(None, "Panel Discussion", None);
    second.description = Some("from b".into());
    let mut third = group(None, "Panel Discussion", None);
    third.description = Some("from c".into());

    let imports = payload(vec![
        ("c", groups_source(vec![third])),
        ("a", groups_source(vec![first])),
        ("b", groups_source(vec![second])),
    ]);
    let outcome = merge_import(&Snapshot::new(), &imports, MergeOptions::default()).unwrap();

    let merged = outcome.snapshot.groups.values().next().unwrap();
    assert_eq!(merged.description.as_deref(), Some("from b"));
}

#[test]
fn test_names_resolve_to_catalog_entities() {
    let mut original = Snapshot::new();
    original.people.insert(
        "p1".into(),
        Person {
            id: Some("p1".into()),
            name: Some("Ada Lovelace".into()),
            ..Person::default()
        },
    );

    let mut incoming = group(None, "Analytical Engines", None);
    incoming.tag_names = Some(vec!["History of Computing".into()]);
    incoming.people = Some(vec![GroupPerson {
        person_name: Some("ada lovelace".into()),
        role_name: Some("Chair".into()),
        ..GroupPerson::default()
    }]);

    let outcome = merge_import(
        &original,
        &payload(vec![("a", groups_source(vec![incoming]))]),
        MergeOptions::default(),
    )
    .unwrap();

    let merged = outcome.snapshot.groups.values().next().unwrap();
    assert_eq!(
        merged.people.as_ref().unwrap()[0].person_id.as_deref(),
        Some("p1")
    );
    assert!(merged.tag_names.is_none());
    assert_eq!(merged.tag_ids.as_ref().map(|ids| ids.len()), Some(1));
    assert_eq!(outcome.snapshot.tags.len(), 1);
    assert_eq!(outcome.snapshot.people.len(), 1);
    assert_eq!(count_changes(&outcome.changes, "Tag", ChangeType::Insert), 1);
}

#[test]
fn test_existing_children_keep_ids_and_new_children_get_them() {
    let mut persisted = group(Some("g1"), "Rust Workshop", None);
    persisted.elements = Some(vec![Element {
        id: Some("e1".into()),
        name: Some("Abstract".into()),
        ..Element::default()
    }]);
    let original = snapshot_with_groups(vec![persisted]);

    let mut incoming = group(None, "Rust Workshop", None);
    incoming.elements = Some(vec![Element {
        name: Some("Slides".into()),
        ..Element::default()
    }]);

    let outcome = merge_import(
        &original,
        &payload(vec![("a", groups_source(vec![incoming]))]),
        MergeOptions::default(),
    )
    .unwrap();

    let merged = &outcome.snapshot.groups["g1"];
    assert!(!merged.is_new);
    let elements = merged.elements.as_ref().unwrap();
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].id.as_deref(), Some("e1"));
    assert!(!elements[0].is_new);
    assert!(elements[1].is_new);
    assert!(elements[1].id.is_some());
}

#[test]
fn test_empty_payload_aborts() {
    let err = merge_import(
        &Snapshot::new(),
        &payload(Vec::new()),
        MergeOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err, MergeError::ImportDataEmpty);
}

#[test]
fn test_snapshot_with_mismatched_key_is_rejected() {
    let mut original = Snapshot::new();
    original
        .groups
        .insert("g1".into(), group(Some("other"), "Keynote", None));

    let err = merge_import(
        &original,
        &payload(vec![("a", groups_source(vec![group(None, "Keynote", None)]))]),
        MergeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, MergeError::InvalidDescriptor { .. }));
}
