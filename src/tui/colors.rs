//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Task list header and status bar
pub const TASKS_BLUE: Color = Color::Rgb(30, 70, 140);
/// Field settings header and status bar
pub const SETTINGS_GREEN: Color = Color::Rgb(0, 80, 0);
/// Focused input, sorted column and selected column
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Destructive confirmations
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Acknowledgement dialogs
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);
