use progmerge_core::errors::{ExError, ExErrorKind, MergeError};

#[test]
fn test_import_data_empty_verifiable_by_kind() {
    let ex_err: ExError = MergeError::ImportDataEmpty.into();

    assert_eq!(ex_err.kind(), ExErrorKind::ImportDataEmpty);
    assert_eq!(ex_err.code(), "ERR_IMPORT_DATA_EMPTY");
    assert_eq!(ex_err.op(), Some("merge_import"));
}

#[test]
fn test_invalid_descriptor_structured_fields() {
    let err = MergeError::InvalidDescriptor {
        location: "ContentGroup".to_string(),
        reason: "map key `g1` does not match entity id None".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(ex_err.code(), "ERR_INVALID_INPUT");
    assert_eq!(ex_err.entity_kind(), Some("ContentGroup"));
    assert!(ex_err.message().contains("Invalid descriptor"));
}

#[test]
fn test_serde_errors_become_serialization_kind() {
    let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let ex_err: ExError = parse_err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::Serialization);
}

#[test]
fn test_error_kind_code_mapping() {
    // Each kind has a stable, unique code
    let kinds = vec![
        (ExErrorKind::ImportDataEmpty, "ERR_IMPORT_DATA_EMPTY"),
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
        (ExErrorKind::ExternalService, "ERR_EXTERNAL_SERVICE"),
        (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        (ExErrorKind::Concurrency, "ERR_CONCURRENCY"),
        (ExErrorKind::Config, "ERR_CONFIG"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    let mut codes = std::collections::HashSet::new();
    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
        assert!(codes.insert(expected_code), "duplicate code {expected_code}");
    }
}

#[test]
fn test_persistence_error_display() {
    let err = ExError::new(ExErrorKind::Persistence)
        .with_op("insert")
        .with_entity_kind("Tag")
        .with_message("HTTP 503");

    assert_eq!(
        err.to_string(),
        "[ERR_PERSISTENCE] in operation 'insert': HTTP 503 (entity_kind: Tag)"
    );
}
