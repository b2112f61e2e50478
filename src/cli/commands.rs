//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - flatten: redistribute overdue/overloaded reviews under a per-day cap
//! - load: show the upcoming due-day load
//! - undo: revert the most recent flatten run

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// flatr - flatten spaced-repetition review load across future days
#[derive(Parser, Debug)]
#[command(name = "flatr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Optional collection database path (overrides config)
    #[arg(short = 'C', long, global = true)]
    pub collection: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Flatten the review load under a per-day limit
    Flatten {
        /// Maximum reviews per future day (defaults to the configured limit)
        #[arg(short, long)]
        limit: Option<i64>,

        /// Restrict the run to one deck and its subdecks
        #[arg(short, long)]
        deck: Option<String>,

        /// Compute the plan but commit nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the due-day load for the coming days
    Load {
        /// How many days ahead to show
        #[arg(short = 'n', long, default_value_t = 30)]
        days: i64,

        /// Restrict to one deck and its subdecks
        #[arg(short, long)]
        deck: Option<String>,
    },

    /// Undo the most recent flatten run
    Undo,
}
