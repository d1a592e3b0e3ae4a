//! Canonical schema constants for structured logging and events
//!
//! These constants keep field keys consistent across the merge and save phases.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Entity identifiers
pub const FIELD_ENTITY_KIND: &str = "entity_kind";
pub const FIELD_ENTITY_ID: &str = "entity_id";
pub const FIELD_LOCATION: &str = "location";
pub const FIELD_CONFERENCE_ID: &str = "conference_id";

// Collection sizes
pub const FIELD_SOURCE_COUNT: &str = "source_count";
pub const FIELD_CHANGE_COUNT: &str = "change_count";
pub const FIELD_KEY_COUNT: &str = "key_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
