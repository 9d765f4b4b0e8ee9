use clap::{Args, Parser, Subcommand};
use roomcalc_domain::Metric;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roomcalc")]
#[command(about = "Undoable room geometry commands with background statistics", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file (defaults to the platform config dir)
    #[arg(long, value_name = "FILE", env = "ROOMCALC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add rooms, optionally undo, and compute statistics on the worker pool
    Run(RunArgs),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Room dimensions; repeat for several rooms
    #[arg(
        long = "room",
        num_args = 3,
        value_names = ["LENGTH", "WIDTH", "HEIGHT"],
        action = clap::ArgAction::Append
    )]
    pub rooms: Vec<String>,

    /// Read dimensions as binary numbers
    #[arg(long)]
    pub binary: bool,

    /// Add all rooms as a single undoable step
    #[arg(long = "macro")]
    pub as_macro: bool,

    /// Number of commands to undo after adding
    #[arg(long, default_value_t = 0)]
    pub undo: usize,

    /// Metric to compute statistics for; repeatable
    #[arg(long = "stats", value_name = "METRIC")]
    pub stats: Vec<Metric>,

    /// Override the configured worker count
    #[arg(long)]
    pub workers: Option<usize>,

    /// Override the configured queue capacity (0 = unbounded)
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Override the configured shutdown grace period
    #[arg(long)]
    pub grace_ms: Option<u64>,
}
