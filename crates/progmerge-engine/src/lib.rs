//! Progmerge Engine - persistence phase of the program merge
//!
//! Executes a [`SavePlan`](progmerge_core::SavePlan) against the storage
//! collaborators in dependency order:
//!
//! 1. Tags, originating data, people, exhibitions (inserts and updates)
//! 2. Groups (one bulk insert+delete, then concurrent per-group updates)
//! 3. Deferred deletions of the tier 1 kinds
//!
//! Failures are isolated per mutation call and reported per key in a
//! [`SaveResult`]; nothing in this crate returns a persistence error to the caller.

pub mod concurrency;
pub mod config;
pub mod gateway;
pub mod save;

pub use concurrency::{ConcurrencyLimiter, ConcurrencyStats};
pub use config::SaveConfig;
pub use gateway::{MutationGateway, SnapshotReader};
pub use save::{execute_plan, save_changes, SaveResult};
