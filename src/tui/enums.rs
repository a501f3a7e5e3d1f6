//! Enumerations for TUI state management.

use crate::task::Task;

/// Which overlay, if any, currently receives keys. The screen underneath is
/// chosen by the shell's route.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppState {
    Main,
    TaskForm,
    Help,
    Confirm,
    Ack,
}

/// Input mode for text entry fields.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum InputMode {
    None,
    Text,
}

/// A destructive action waiting on the confirmation dialog.
#[derive(Clone, Debug)]
pub enum PendingAction {
    DeleteTask(Task),
    DeleteField { id: String, label: String },
}

impl PendingAction {
    /// Text shown under "Are you sure you want to:".
    pub fn describe(&self) -> String {
        match self {
            PendingAction::DeleteTask(task) => format!("Delete task \"{}\"", task.display_name()),
            PendingAction::DeleteField { label, .. } => format!("Delete field \"{}\"", label),
        }
    }
}
