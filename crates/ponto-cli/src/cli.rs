//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Workplace time clock.
///
/// Start, pause, resume and finish work sessions; finished sessions are
/// appended to a CSV record store.
#[derive(Debug, Parser)]
#[command(name = "ponto", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the record store if needed and show where it lives.
    Init,

    /// Read chat interactions from stdin, one per line (`<user>: <text>`).
    Run,
}
