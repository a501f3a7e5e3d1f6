use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Task board client for a REST task service.
/// Runs the interactive UI when no subcommand is given.
#[derive(Parser)]
#[command(name = "taskboard", version, about = "Task board with configurable form fields")]
pub struct Cli {
    /// Path to the config file (default: ~/.taskboard/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. http://localhost:7071.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Organization new tasks are filed under.
    #[arg(long = "org", global = true)]
    pub organization_id: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
