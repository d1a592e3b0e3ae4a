#![allow(clippy::unwrap_used, clippy::expect_used)]

use progmerge_core::errors::MergeError;
use progmerge_core::logging_facility::test_capture::init_test_capture;
use progmerge_core::model::{Group, IntermediaryData, Snapshot};
use progmerge_core::{log_op_end, log_op_error, log_op_start, merge_import, MergeOptions};
use progmerge_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    let events = capture.events();
    let start_events: Vec<_> = events
        .iter()
        .filter(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_START))
        .collect();

    assert!(
        !start_events.is_empty(),
        "Should have captured at least one start event"
    );
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let end_events = capture.events_for_op(op_name);
    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].event.as_deref(), Some(EVENT_END));
    assert_eq!(end_events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    log_op_error!(op_name, MergeError::ImportDataEmpty, duration_ms = 10);

    let error_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();

    assert_eq!(error_events.len(), 1, "Should have exactly one error event");
    assert_eq!(error_events[0].field("err.code"), Some("ERR_IMPORT_DATA_EMPTY"));
}

#[test]
fn test_merge_import_emits_start_end_and_error_events() {
    let capture = init_test_capture();
    let before = capture.count_events(|e| e.op.as_deref() == Some("merge_import"));

    let mut imports = progmerge_core::ImportPayload::new();
    imports.insert(
        "a".to_string(),
        IntermediaryData {
            groups: Some(vec![Group::titled("Keynote")]),
            ..IntermediaryData::default()
        },
    );
    merge_import(&Snapshot::new(), &imports, MergeOptions::default()).unwrap();
    merge_import(
        &Snapshot::new(),
        &progmerge_core::ImportPayload::new(),
        MergeOptions::default(),
    )
    .unwrap_err();

    capture.assert_event_exists("merge_import", EVENT_START);
    capture.assert_event_exists("merge_import", EVENT_END);
    capture.assert_event_exists("merge_import", EVENT_END_ERROR);

    let after = capture.count_events(|e| e.op.as_deref() == Some("merge_import"));
    // two starts, one end, one error
    assert!(after - before >= 4);

    let end = capture
        .events_for_op("merge_import")
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END))
        .unwrap();
    assert!(end.field("change_count").is_some());
    assert!(end.field("duration_ms").is_some());
}
