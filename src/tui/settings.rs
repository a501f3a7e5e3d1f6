//! Field settings screen state.
//!
//! The screen edits its own copy of the field configuration, fetched when
//! the screen is opened. Nothing reaches the backend until it is saved.

use crate::{
    api::{ApiError, TaskBackend},
    fields::{FieldConfig, FieldDescriptor, FieldError, FieldType},
    tui::{enums::InputMode, input::InputField},
};

pub struct SettingsScreen {
    pub config: FieldConfig,
    pub selected: usize,
    pub label: InputField,
    pub new_type: FieldType,
    pub input_mode: InputMode,
}

impl Default for SettingsScreen {
    fn default() -> Self {
        SettingsScreen {
            config: FieldConfig::default(),
            selected: 0,
            label: InputField::new(),
            new_type: FieldType::Text,
            input_mode: InputMode::None,
        }
    }
}

impl SettingsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a fresh copy of the configuration.
    pub fn load(&mut self, backend: &dyn TaskBackend) -> Result<(), ApiError> {
        let result = self.config.load(backend);
        self.clamp_selection();
        result
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        self.config.fields()
    }

    pub fn selected_field(&self) -> Option<&FieldDescriptor> {
        self.config.fields().get(self.selected)
    }

    fn clamp_selection(&mut self) {
        let len = self.config.fields().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.config.fields().len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn is_adding(&self) -> bool {
        self.input_mode == InputMode::Text
    }

    pub fn start_adding(&mut self) {
        self.input_mode = InputMode::Text;
        self.label.active = true;
    }

    pub fn stop_adding(&mut self) {
        self.input_mode = InputMode::None;
        self.label.active = false;
    }

    pub fn cycle_type(&mut self) {
        self.new_type = self.new_type.cycle();
    }

    /// Append a field from the label input and selected type. On success
    /// the inputs reset (empty label, text type) and the new field is
    /// selected.
    pub fn add_field(&mut self) -> Result<String, FieldError> {
        let label = self.config.add(&self.label.value, self.new_type.clone())?.label.clone();
        self.label.clear();
        self.new_type = FieldType::Text;
        self.selected = self.config.fields().len() - 1;
        Ok(label)
    }

    /// Move the selected field one place up or down. The selection follows it.
    pub fn move_selected(&mut self, up: bool) -> bool {
        let fields = self.config.fields();
        let target = if up {
            self.selected.checked_sub(1)
        } else {
            Some(self.selected + 1).filter(|&i| i < fields.len())
        };
        let (Some(from), Some(to)) = (
            fields.get(self.selected).and_then(|f| f.id.clone()),
            target.and_then(|i| fields.get(i)).and_then(|f| f.id.clone()),
        ) else {
            return false;
        };
        self.config.reorder(&from, &to);
        if let Some(i) = target {
            self.selected = i;
        }
        true
    }

    /// Remove a field the user has already confirmed.
    pub fn remove_field(&mut self, id: &str) -> Option<FieldDescriptor> {
        let removed = self.config.remove(id, &mut true);
        self.clamp_selection();
        removed
    }

    pub fn save(&self, backend: &dyn TaskBackend) -> Result<(), ApiError> {
        self.config.save(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use pretty_assertions::assert_eq;

    fn field(id: &str, name: &str) -> FieldDescriptor {
        let mut f = FieldDescriptor::new(name, name, FieldType::Text);
        f.id = Some(id.to_string());
        f
    }

    fn labels(screen: &SettingsScreen) -> Vec<String> {
        screen.fields().iter().map(|f| f.label.clone()).collect()
    }

    fn loaded(fields: Vec<FieldDescriptor>) -> SettingsScreen {
        let backend = FakeBackend::default();
        backend.set_fields(fields);
        let mut screen = SettingsScreen::new();
        screen.load(&backend).unwrap();
        screen
    }

    #[test]
    fn test_add_field_resets_inputs() {
        let mut screen = loaded(vec![field("1", "a")]);
        screen.start_adding();
        screen.label.set("Due Date");
        screen.cycle_type();
        screen.cycle_type();
        assert_eq!(screen.new_type, FieldType::Date);

        let label = screen.add_field().unwrap();
        assert_eq!(label, "Due Date");
        assert_eq!(screen.label.value, "");
        assert_eq!(screen.new_type, FieldType::Text);
        assert_eq!(screen.selected, 1);
        assert_eq!(screen.fields()[1].name, "duedate");
        assert_eq!(screen.fields()[1].field_type, FieldType::Date);
    }

    #[test]
    fn test_blank_label_keeps_inputs() {
        let mut screen = loaded(vec![]);
        screen.label.set("   ");
        assert_eq!(screen.add_field(), Err(FieldError::BlankLabel));
        assert!(screen.fields().is_empty());
        assert_eq!(screen.label.value, "   ");
    }

    #[test]
    fn test_move_selected() {
        let mut screen = loaded(vec![field("1", "a"), field("2", "b"), field("3", "c")]);
        assert!(!screen.move_selected(true));

        assert!(screen.move_selected(false));
        assert_eq!(labels(&screen), vec!["b", "a", "c"]);
        assert_eq!(screen.selected, 1);

        screen.select_next();
        assert!(!screen.move_selected(false));
        assert!(screen.move_selected(true));
        assert_eq!(labels(&screen), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_remove_clamps_selection() {
        let mut screen = loaded(vec![field("1", "a"), field("2", "b")]);
        screen.select_next();
        let removed = screen.remove_field("2").unwrap();
        assert_eq!(removed.label, "b");
        assert_eq!(screen.selected, 0);
        assert!(screen.remove_field("missing").is_none());
    }

    #[test]
    fn test_save_sends_current_order() {
        let backend = FakeBackend::default();
        backend.set_fields(vec![field("1", "a"), field("2", "b")]);
        let mut screen = SettingsScreen::new();
        screen.load(&backend).unwrap();
        screen.move_selected(false);
        screen.save(&backend).unwrap();

        let saved: Vec<String> = backend.fields().into_iter().map(|f| f.name).collect();
        assert_eq!(saved, vec!["b", "a"]);
    }
}
