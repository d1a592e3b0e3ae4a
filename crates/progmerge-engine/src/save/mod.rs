//! Save phase: persist an edited snapshot.

mod executor;
mod result;

pub use result::SaveResult;

use progmerge_core::diff::SavePlan;
use progmerge_core::model::{DirtyKeys, Snapshot};
use progmerge_core::errors::ExError;
use progmerge_core::{log_op_end, log_op_error, log_op_start};
use progmerge_core_types::RequestId;
use std::time::Instant;

use crate::concurrency::ConcurrencyLimiter;
use crate::config::SaveConfig;
use crate::gateway::{MutationGateway, SnapshotReader};
use executor::SaveExecutor;

/// Persist the dirty part of `edited`.
///
/// The last persisted snapshot is re-read first and every dirty key is
/// classified against it. The returned map holds one entry per dirty key;
/// persistence errors are logged and reported there, never returned.
/// If the original snapshot cannot be read, every dirty key is `false` and no
/// mutation is attempted.
///
/// Every log event of one save carries the same `request_id`.
pub async fn save_changes(
    reader: &dyn SnapshotReader,
    gateway: &dyn MutationGateway,
    conference_id: &str,
    edited: &Snapshot,
    dirty: &DirtyKeys,
    config: &SaveConfig,
) -> SaveResult {
    let id = RequestId::new();
    let request_id = id.as_str();
    let key_count = dirty.len();
    log_op_start!(
        "save_changes",
        request_id = request_id,
        conference_id = conference_id,
        key_count = key_count
    );
    let start = Instant::now();

    let original = match reader.load_snapshot(conference_id).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            log_op_error!(
                "save_changes",
                err.with_request_id(id.clone()),
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = request_id,
                conference_id = conference_id
            );
            return SaveResult::uniform(dirty, false);
        }
    };

    let plan = match SavePlan::build(&original, edited, dirty) {
        Ok(plan) => plan,
        Err(err) => {
            log_op_error!(
                "save_changes",
                ExError::from(err).with_request_id(id.clone()),
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = request_id,
                conference_id = conference_id
            );
            return SaveResult::uniform(dirty, false);
        }
    };

    let executor = SaveExecutor::new(gateway, ConcurrencyLimiter::new(config), id.clone());
    let result = executor.run(&plan).await;

    log_op_end!(
        "save_changes",
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = request_id,
        conference_id = conference_id,
        key_count = result.len(),
        failed_count = result.failed_keys().len()
    );
    result
}

/// Execute an already-built plan against the gateway.
pub async fn execute_plan(
    gateway: &dyn MutationGateway,
    plan: &SavePlan,
    config: &SaveConfig,
) -> SaveResult {
    SaveExecutor::new(gateway, ConcurrencyLimiter::new(config), RequestId::new())
        .run(plan)
        .await
}
