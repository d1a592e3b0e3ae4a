//! Merge command
//!
//! Usage: progmerge merge --import <FILE> [--original <FILE>] [--output <FILE>]

use anyhow::Context;
use clap::Args;
use progmerge_core::{merge_import, render_change_report, ImportPayload, MergeOptions, Snapshot};
use std::path::PathBuf;

use super::{emit, read_json};

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Import payload: JSON object of source name to intermediary data
    #[arg(long)]
    pub import: PathBuf,

    /// Last persisted snapshot (default: empty conference)
    #[arg(long)]
    pub original: Option<PathBuf>,

    /// Output file for the merge outcome JSON (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Disable fuzzy name matching
    #[arg(long)]
    pub no_fuzzy: bool,

    /// Log only appended entries as inserted
    #[arg(long)]
    pub strict_labeling: bool,

    /// Print the change report instead of the outcome JSON
    #[arg(long, conflicts_with = "output")]
    pub report: bool,
}

pub fn execute(args: MergeArgs) -> anyhow::Result<()> {
    let imports: ImportPayload = read_json(&args.import)?;
    let original: Snapshot = match &args.original {
        Some(path) => read_json(path)?,
        None => Snapshot::default(),
    };

    let options = MergeOptions {
        fuzzy_matching: !args.no_fuzzy,
        legacy_unmatched_labeling: !args.strict_labeling,
    };

    let outcome = merge_import(&original, &imports, options).context("merge failed")?;

    if args.report {
        print!("{}", render_change_report(&outcome.changes));
        return Ok(());
    }

    let json = serde_json::to_string_pretty(&outcome)?;
    emit(args.output.as_deref(), &json)?;
    if args.output.is_some() {
        print!("{}", render_change_report(&outcome.changes));
    }
    Ok(())
}
