//! Import merge engine.
//!
//! Layers, innermost first:
//! - [`field`]: per-field conflict resolution with an audit record per decision
//! - [`list`]: match-or-append merge of two collections
//! - [`hierarchy`]: recursive composition over the whole entity graph, the
//!   multi-source fold, and the public [`merge_import`] entry point

pub mod field;
pub mod hierarchy;
pub mod list;
mod resolve;

pub use field::{concat_source_ids, FieldMerger, Presence};
pub use hierarchy::{fold_sources, merge_import, merge_intermediary, MergeOutcome};
pub use list::{merge_lists, ListMergeResult, UnmatchedLabeling};

use serde::{Deserialize, Serialize};

use crate::matching::EntityMatcher;

/// Knobs for a merge run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Log untouched base entries as "inserted unmatched" (historic audit behaviour)
    pub legacy_unmatched_labeling: bool,
    /// Enable the fuzzy-name matching strategy
    pub fuzzy_matching: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            legacy_unmatched_labeling: true,
            fuzzy_matching: true,
        }
    }
}

impl MergeOptions {
    pub fn matcher(&self) -> EntityMatcher {
        EntityMatcher::with_fuzzy(self.fuzzy_matching)
    }

    pub fn labeling(&self) -> UnmatchedLabeling {
        if self.legacy_unmatched_labeling {
            UnmatchedLabeling::AllUnmatched
        } else {
            UnmatchedLabeling::AppendedOnly
        }
    }
}
