//! # taskboard
//!
//! A terminal client for a REST task service whose task shape is defined by
//! user-configurable form fields.
//!
//! ## Key Features
//!
//! - **Configurable Fields**: Define form fields (label, type, order); they drive both the
//!   task form and the table columns
//! - **Task Table**: Search, single-column sort, five-row pages, and per-session column reordering
//! - **Two Interfaces**: Interactive TUI plus a scriptable CLI over the same controllers
//! - **Stale-Response Guard**: Task lists that arrive after a newer request are discarded
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the TUI against the default backend (http://localhost:7071)
//! taskboard
//!
//! # Configure fields
//! taskboard fields add "Title"
//! taskboard fields add "Due Date" --type date
//!
//! # Add and list tasks
//! taskboard add --set title="Buy milk" --set duedate=tomorrow
//! taskboard list --search milk --sort duedate
//! ```
//!
//! Configuration lives in `~/.taskboard/config.toml`:
//!
//! ```toml
//! base-url = "http://localhost:7071"
//! organization-id = "demo-org"
//! ```

use clap::Parser;

pub mod api;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod confirm;
pub mod dates;
pub mod fields;
pub mod form;
pub mod logging;
pub mod shell;
pub mod table;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod settings;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::{default_config_path, ConfigFile, Overrides, Settings};

fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let file = match ConfigFile::load(&config_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    let settings = Settings::resolve(
        file,
        Overrides {
            base_url: cli.base_url.clone(),
            organization_id: cli.organization_id.clone(),
        },
    );

    let command = cli.command.unwrap_or(Commands::Ui);
    let log_guard = match command {
        Commands::Ui => logging::init_file(&settings.log_file),
        _ => {
            logging::init_stderr();
            None
        }
    };

    let result = match command {
        Commands::Ui => tui::run::run_tui(&settings),
        Commands::List { search, sort, desc, page, all } => cmd_list(&settings, search, sort, desc, page, all),
        Commands::Add { values } => cmd_add(&settings, values),
        Commands::Update { id, values } => cmd_update(&settings, id, values),
        Commands::Delete { id, yes } => cmd_delete(&settings, id, yes),
        Commands::Fields { action } => cmd_fields(&settings, action),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        drop(log_guard);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
