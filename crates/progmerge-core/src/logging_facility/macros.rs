//! Operation boundary macros.
//!
//! Every merge or save operation emits a `start` event, then exactly one of
//! `end` or `end_error`. Extra `key = value` fields are passed straight to
//! `tracing`.

/// Emit the `start` event of an operation.
///
/// ```
/// # use progmerge_core::log_op_start;
/// log_op_start!("merge_import", source_count = 2);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = progmerge_core_types::schema::EVENT_START,
            $($($field)+)?
        )
    };
}

/// Emit the `end` event of an operation; `duration_ms` is mandatory.
///
/// ```
/// # use progmerge_core::log_op_end;
/// log_op_end!("merge_import", duration_ms = 42, change_count = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = progmerge_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)+)?
        )
    };
}

/// Emit the `end_error` event of an operation.
///
/// `$err` is anything convertible into [`ExError`](crate::errors::ExError),
/// so the event always carries a stable `err.code`.
///
/// ```
/// # use progmerge_core::{log_op_error, errors::MergeError};
/// log_op_error!("merge_import", MergeError::ImportDataEmpty, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = progmerge_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = ex_err.message(),
            err.request_id = ex_err.request_id().map(|id| id.as_str()),
            $($($field)+)?
        );
    }};
}
