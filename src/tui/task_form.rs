//! Task form dialog for the terminal user interface.
//!
//! Wraps a [`TaskForm`] with one [`InputField`] per rendered control and
//! tracks which control has focus. Text is written back to the form when the
//! dialog is submitted, or when a date control resolves its input.

use chrono::NaiveDate;

use crate::{
    form::{ControlKind, FormError, TaskForm},
    tui::input::InputField,
};

/// One editable control of the dialog.
#[derive(Clone, Debug)]
pub struct FormInput {
    pub name: String,
    pub label: String,
    pub kind: ControlKind,
    pub input: InputField,
}

/// Add/edit dialog state.
pub struct FormDialog {
    pub form: TaskForm,
    pub inputs: Vec<FormInput>,
    pub current_field: usize,
}

impl FormDialog {
    pub fn new(form: TaskForm) -> Self {
        let inputs = form
            .controls()
            .into_iter()
            .map(|control| FormInput {
                name: control.field.name.clone(),
                label: control.field.label.clone(),
                kind: control.kind,
                input: InputField::with_value(control.value),
            })
            .collect();
        let mut dialog = FormDialog { form, inputs, current_field: 0 };
        dialog.update_active_field();
        dialog
    }

    pub fn title(&self) -> &'static str {
        if self.form.is_edit() {
            "Edit Task"
        } else {
            "Add Task"
        }
    }

    pub fn field_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn next_field(&mut self) {
        if !self.inputs.is_empty() {
            self.current_field = (self.current_field + 1) % self.inputs.len();
            self.update_active_field();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.inputs.is_empty() {
            self.current_field = (self.current_field + self.inputs.len() - 1) % self.inputs.len();
            self.update_active_field();
        }
    }

    pub fn update_active_field(&mut self) {
        for (i, input) in self.inputs.iter_mut().enumerate() {
            input.input.active = i == self.current_field;
        }
    }

    pub fn current(&self) -> Option<&FormInput> {
        self.inputs.get(self.current_field)
    }

    fn current_input(&mut self) -> Option<&mut InputField> {
        self.inputs.get_mut(self.current_field).map(|i| &mut i.input)
    }

    pub fn handle_char(&mut self, c: char) {
        if let Some(input) = self.current_input() {
            input.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(input) = self.current_input() {
            input.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(input) = self.current_input() {
            input.handle_delete();
        }
    }

    pub fn handle_left_right(&mut self, right: bool) {
        if let Some(input) = self.current_input() {
            if right {
                input.move_cursor_right();
            } else {
                input.move_cursor_left();
            }
        }
    }

    pub fn handle_home_end(&mut self, end: bool) {
        if let Some(input) = self.current_input() {
            if end {
                input.move_cursor_end();
            } else {
                input.move_cursor_home();
            }
        }
    }

    /// Turn the focused date control's text ("next friday", "2024-06-01")
    /// into an ISO date. Does nothing on text controls.
    pub fn resolve_current_date(&mut self, today: NaiveDate) -> Result<(), FormError> {
        let Some(current) = self.inputs.get_mut(self.current_field) else {
            return Ok(());
        };
        if current.kind != ControlKind::DatePicker {
            return Ok(());
        }
        self.form.set_date_input(&current.name, &current.input.value, today)?;
        current.input.set(self.form.value(&current.name));
        Ok(())
    }

    /// Copy every control's text into the form. Date controls are resolved;
    /// the first unreadable date stops the copy and takes focus.
    pub fn commit(&mut self, today: NaiveDate) -> Result<(), FormError> {
        for i in 0..self.inputs.len() {
            let current = &mut self.inputs[i];
            match current.kind {
                ControlKind::TextLine => {
                    self.form.set_value(&current.name, &current.input.value);
                }
                ControlKind::DatePicker => {
                    if let Err(e) = self.form.set_date_input(&current.name, &current.input.value, today) {
                        self.current_field = i;
                        self.update_active_field();
                        return Err(e);
                    }
                    current.input.set(self.form.value(&current.name));
                }
            }
        }
        Ok(())
    }
}
