//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Hierarchical allocation manager: budget trees, proportional distribution, and variance tracking
#[derive(Parser, Debug)]
#[command(name = "rsalloc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Allocation document (default: from config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show allocation table
    Show,

    /// Show hierarchy as tree
    Tree,

    /// Edit a node's allocation
    Edit {
        /// Target node id (interactive selection if omitted)
        #[arg(short, long)]
        node: Option<String>,

        /// Adjust current value by a percentage
        #[arg(short, long, conflicts_with = "set", allow_hyphen_values = true)]
        percent: Option<String>,

        /// Set an absolute value
        #[arg(short, long, conflicts_with = "percent", allow_hyphen_values = true)]
        set: Option<String>,

        /// Redistribute the new value across children proportionally
        #[arg(short, long)]
        distribute: bool,
    },

    /// Print grand total
    Total,

    /// Show document summary
    Info,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
