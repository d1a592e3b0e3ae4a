//! Progmerge Core - conference program merge kernel
//!
//! This crate provides the pure, synchronous half of the program merge engine:
//! - Descriptor model for groups, their children, and conference-wide entities
//! - Cascading entity matching (id, cross-reference, exact name, fuzzy name)
//! - Field, list and hierarchical merging with a full audit log
//! - Save planning: dirty-key classification and minimal child sub-diffs
//! - Error and structured-logging facilities shared by the workspace
//!
//! Persistence (executing a save plan) lives in `progmerge-engine`.

pub mod change;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod matching;
pub mod merge;
pub mod model;

// Re-export commonly used types
pub use change::{ChangeSummary, ChangeType};
pub use diff::{render_change_report, SavePlan};
pub use errors::{ExError, ExErrorKind, MergeError, Result};
pub use matching::EntityMatcher;
pub use merge::{merge_import, MergeOptions, MergeOutcome};
pub use model::{DirtyKeys, ImportPayload, IntermediaryData, Snapshot};
