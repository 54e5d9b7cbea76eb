//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Follow a cursor-paginated endpoint to the end of its chain
#[derive(Parser, Debug)]
#[command(name = "chainfetch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Fetch every page, persist the records and print the report
    Run {
        /// Endpoint serving the first page
        #[arg(long)]
        base_url: Option<String>,

        /// Concurrent fetch workers
        #[arg(short, long)]
        workers: Option<usize>,

        /// Attempts per token before giving up
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Output file for the collected records
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the report for a previously persisted file
    Report {
        /// Persisted JSON array of records
        #[arg(short, long, default_value = "products.json")]
        input: PathBuf,
    },

    /// Print the effective configuration
    Config,
}
