//! Progmerge CLI
//!
//! Command-line interface over JSON documents for the program merge engine

use clap::{Parser, Subcommand};
use progmerge_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "progmerge")]
#[command(about = "Progmerge - merge imported conference programs and plan saves", long_about = None)]
struct Cli {
    /// Logging profile: development, production or test
    #[arg(long, global = true, default_value = "development")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Merge an import payload into an original snapshot
    Merge(commands::merge::MergeArgs),
    /// Show what a save of an edited snapshot would do (dry run)
    Plan(commands::plan::PlanArgs),
}

fn main() {
    let cli = Cli::parse();
    init(Profile::parse(&cli.log));

    let result = match cli.command {
        Commands::Merge(args) => commands::merge::execute(args),
        Commands::Plan(args) => commands::plan::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
