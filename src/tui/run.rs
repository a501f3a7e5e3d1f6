//! TUI entry point and terminal setup.

use std::io;

use anyhow::Context;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};

use crate::{api::HttpBackend, config::Settings, tui::app::App};

/// Initialise the terminal, run the task board until the user quits, and
/// restore the terminal.
pub fn run_tui(settings: &Settings) -> anyhow::Result<()> {
    let backend = HttpBackend::new(&settings.base_url).context("creating HTTP client")?;
    tracing::info!(base_url = %settings.base_url, organization = %settings.organization_id, "starting TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new(&backend, &settings.organization_id);
    app.load();
    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result.context("running the terminal UI")?;
    Ok(())
}
