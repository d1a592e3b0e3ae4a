//! Plan command
//!
//! Usage: progmerge plan --original <FILE> --edited <FILE> [--dirty <FILE>] [--json]

use anyhow::Context;
use clap::Args;
use progmerge_core::diff::render_save_plan;
use progmerge_core::{DirtyKeys, SavePlan, Snapshot};
use std::path::PathBuf;

use super::{emit, read_json};

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Last persisted snapshot
    #[arg(long)]
    pub original: PathBuf,

    /// Edited snapshot to be saved
    #[arg(long)]
    pub edited: PathBuf,

    /// Dirty keys per kind (default: every key that differs between the snapshots)
    #[arg(long)]
    pub dirty: Option<PathBuf>,

    /// Emit the plan as JSON instead of Markdown
    #[arg(long)]
    pub json: bool,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn execute(args: PlanArgs) -> anyhow::Result<()> {
    let original: Snapshot = read_json(&args.original)?;
    let edited: Snapshot = read_json(&args.edited)?;
    let dirty = match &args.dirty {
        Some(path) => read_json(path)?,
        None => DirtyKeys::between(&original, &edited),
    };

    let plan = SavePlan::build(&original, &edited, &dirty).context("cannot build save plan")?;

    let text = if args.json {
        serde_json::to_string_pretty(&plan)?
    } else {
        render_save_plan(&plan)
    };
    emit(args.output.as_deref(), &text)
}
