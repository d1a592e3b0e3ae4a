//! Save diff engine.
//!
//! Classifies the caller's dirty keys against the last-loaded snapshot and
//! produces a [`SavePlan`]: what to insert, update and delete, per kind, with
//! minimal sub-diffs for the nested collections of updated groups.
//!
//! ## Entry point
//!
//! ```ignore
//! use progmerge_core::diff::SavePlan;
//!
//! let plan = SavePlan::build(&original, &edited, &dirty)?;
//! println!("{}", progmerge_core::diff::render_save_plan(&plan));
//! ```
//!
//! Execution of a plan against storage lives in the engine crate.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::{classify, diff_children, diff_links, group_patch, persist_payload};
pub use human_summary::{render_change_report, render_save_plan};
pub use model::{EntityDiff, GroupUpdatePlan, Keyed, LinkDiff, SavePlan};
