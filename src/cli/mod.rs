// src/cli/mod.rs — CLI definition (clap derive)

pub mod progress;
pub mod run;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pulsewatch",
    about = "Adaptive sentiment anomaly monitor",
    version
)]
pub struct Cli {
    /// Keyword(s) to monitor; overrides the configured subjects
    #[arg(short, long, global = true)]
    pub keyword: Vec<String>,

    /// Suppress progress output (only emit the final report)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the monitoring loop until Ctrl+C (default)
    Run {
        /// Stop after N cycles per subject
        #[arg(long)]
        cycles: Option<u64>,
    },
    /// Run exactly one cycle per subject and print the report
    Once,
    /// Print a starter config.toml
    Config,
    /// Show the most recent events from the event log
    Tail {
        /// Number of events
        #[arg(short, default_value = "20")]
        n: usize,
    },
}
