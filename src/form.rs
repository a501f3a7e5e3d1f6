//! Task form controller.
//!
//! Holds one editable string per configured field, seeded from the task
//! being edited (or empty for a new task), and turns those strings into a
//! typed payload for the backend.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::api::{ApiError, TaskBackend};
use crate::dates::{format_iso, parse_date_input, parse_iso};
use crate::fields::{FieldDescriptor, FieldType};
use crate::task::{value_text, Task};

#[derive(Debug, Error)]
pub enum FormError {
    #[error("'{value}' is not a valid date for field '{field}' (expected YYYY-MM-DD)")]
    InvalidDate { field: String, value: String },

    #[error("the task being edited has no id")]
    MissingId,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A field value typed by its descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Email(String),
    Date(NaiveDate),
}

impl FieldValue {
    /// Type a raw form value. Empty input yields `None`.
    pub fn parse(field: &FieldDescriptor, raw: &str) -> Result<Option<FieldValue>, FormError> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let value = match field.field_type {
            FieldType::Date => {
                let date = parse_iso(raw).ok_or_else(|| FormError::InvalidDate {
                    field: field.name.clone(),
                    value: raw.to_string(),
                })?;
                FieldValue::Date(date)
            }
            FieldType::Email => FieldValue::Email(raw.to_string()),
            FieldType::Text | FieldType::Other(_) => FieldValue::Text(raw.to_string()),
        };
        Ok(Some(value))
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) | FieldValue::Email(s) => Value::String(s.clone()),
            FieldValue::Date(d) => Value::String(format_iso(*d)),
        }
    }
}

/// How a field is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    TextLine,
    DatePicker,
}

/// One rendered input of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormControl<'a> {
    pub field: &'a FieldDescriptor,
    pub kind: ControlKind,
    pub value: &'a str,
}

/// Form state for creating or editing one task.
#[derive(Debug, Clone)]
pub struct TaskForm {
    fields: Vec<FieldDescriptor>,
    editing: Option<Task>,
    values: BTreeMap<String, String>,
}

impl TaskForm {
    /// Create-mode form: every field starts empty.
    pub fn new(fields: &[FieldDescriptor]) -> Self {
        let mut form = TaskForm {
            fields: fields.to_vec(),
            editing: None,
            values: BTreeMap::new(),
        };
        form.reset();
        form
    }

    /// Edit-mode form seeded from an existing task.
    pub fn for_task(fields: &[FieldDescriptor], task: &Task) -> Self {
        let values = fields
            .iter()
            .map(|f| (f.name.clone(), task.get(&f.name).map(value_text).unwrap_or_default()))
            .collect();
        TaskForm {
            fields: fields.to_vec(),
            editing: Some(task.clone()),
            values,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub fn editing(&self) -> Option<&Task> {
        self.editing.as_ref()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    /// Set one field's value. Returns false for names that are not configured.
    pub fn set_value(&mut self, name: &str, value: &str) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Resolve date input such as "tomorrow" and store it as an ISO date.
    pub fn set_date_input(&mut self, name: &str, input: &str, today: NaiveDate) -> Result<(), FormError> {
        if input.trim().is_empty() {
            self.set_value(name, "");
            return Ok(());
        }
        let date = parse_date_input(input, today).ok_or_else(|| FormError::InvalidDate {
            field: name.to_string(),
            value: input.to_string(),
        })?;
        self.set_value(name, &format_iso(date));
        Ok(())
    }

    /// Inputs to render, in field order. Fields of unknown type are skipped.
    pub fn controls(&self) -> Vec<FormControl<'_>> {
        self.fields
            .iter()
            .filter_map(|field| {
                let kind = match field.field_type {
                    FieldType::Text | FieldType::Email => ControlKind::TextLine,
                    FieldType::Date => ControlKind::DatePicker,
                    FieldType::Other(_) => return None,
                };
                Some(FormControl { field, kind, value: self.value(&field.name) })
            })
            .collect()
    }

    /// Organization the payload is filed under: the edited task's own, or the
    /// configured default.
    fn organization_for(&self, default_org: &str) -> String {
        self.editing
            .as_ref()
            .and_then(|t| t.organization_id.clone())
            .unwrap_or_else(|| default_org.to_string())
    }

    /// Validate the values and build the request body.
    pub fn payload(&self, default_org: &str) -> Result<Task, FormError> {
        let mut values = Map::new();
        for field in &self.fields {
            let typed = FieldValue::parse(field, self.value(&field.name))?;
            let json = typed.map(|v| v.to_json()).unwrap_or_else(|| Value::String(String::new()));
            values.insert(field.name.clone(), json);
        }
        Ok(Task {
            id: None,
            organization_id: Some(self.organization_for(default_org)),
            values,
        })
    }

    /// Create or update the task. On success the form is reset; on failure
    /// the entered values are kept.
    pub fn submit(&mut self, backend: &dyn TaskBackend, default_org: &str) -> Result<(), FormError> {
        let payload = self.payload(default_org)?;
        let result = match &self.editing {
            Some(task) => {
                let id = task.id.as_deref().ok_or(FormError::MissingId)?;
                let org = self.organization_for(default_org);
                backend.update_task(id, &org, &payload)
            }
            None => backend.insert_task(&payload),
        };

        match result {
            Ok(()) => {
                tracing::info!(edit = self.is_edit(), "task submitted");
                self.reset();
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to submit task");
                Err(e.into())
            }
        }
    }

    /// Clear every value back to empty.
    pub fn reset(&mut self) {
        self.values = self.fields.iter().map(|f| (f.name.clone(), String::new())).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("title", "Title", FieldType::Text),
            FieldDescriptor::new("owner", "Owner", FieldType::Email),
            FieldDescriptor::new("due", "Due", FieldType::Date),
            FieldDescriptor::new("score", "Score", FieldType::Other("number".into())),
        ]
    }

    fn existing() -> Task {
        let mut task: Task = serde_json::from_value(json!({
            "_id": "t1",
            "organizationId": "acme",
            "title": "Buy milk",
            "due": "2025-02-01",
            "legacy": "kept on server"
        }))
        .unwrap();
        task.values.insert("score".into(), json!(7));
        task
    }

    #[test]
    fn test_create_mode_seeds_empty_strings() {
        let form = TaskForm::new(&fields());
        assert!(!form.is_edit());
        for f in fields() {
            assert_eq!(form.value(&f.name), "");
        }
    }

    #[test]
    fn test_edit_mode_seeds_from_task() {
        let form = TaskForm::for_task(&fields(), &existing());
        assert!(form.is_edit());
        assert_eq!(form.value("title"), "Buy milk");
        assert_eq!(form.value("owner"), "");
        assert_eq!(form.value("due"), "2025-02-01");
        assert_eq!(form.value("score"), "7");
        assert_eq!(form.value("legacy"), "");
    }

    #[test]
    fn test_set_value_touches_one_field() {
        let mut form = TaskForm::for_task(&fields(), &existing());
        assert!(form.set_value("owner", "a@b.c"));
        assert!(!form.set_value("unknown", "x"));
        assert_eq!(form.value("owner"), "a@b.c");
        assert_eq!(form.value("title"), "Buy milk");
        assert_eq!(form.value("due"), "2025-02-01");
    }

    #[test]
    fn test_controls_skip_unknown_types() {
        let form = TaskForm::new(&fields());
        let kinds: Vec<(&str, ControlKind)> =
            form.controls().iter().map(|c| (c.field.name.as_str(), c.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("title", ControlKind::TextLine),
                ("owner", ControlKind::TextLine),
                ("due", ControlKind::DatePicker),
            ]
        );
    }

    #[test]
    fn test_set_date_input_stores_iso_date() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let mut form = TaskForm::new(&fields());
        form.set_date_input("due", "tomorrow", today).unwrap();
        assert_eq!(form.value("due"), "2025-03-13");
        assert!(form.set_date_input("due", "someday", today).is_err());
        assert_eq!(form.value("due"), "2025-03-13");
    }

    #[test]
    fn test_payload_contains_configured_fields_and_org() {
        let mut form = TaskForm::new(&fields());
        form.set_value("title", "Write report");
        form.set_value("due", "2025-04-01");
        let payload = form.payload("demo-org").unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "organizationId": "demo-org",
                "title": "Write report",
                "owner": "",
                "due": "2025-04-01",
                "score": ""
            })
        );
    }

    #[test]
    fn test_payload_rejects_bad_date() {
        let mut form = TaskForm::new(&fields());
        form.set_value("due", "31/12/2025");
        assert!(matches!(form.payload("o"), Err(FormError::InvalidDate { .. })));
    }

    #[test]
    fn test_edit_payload_keeps_task_org() {
        let form = TaskForm::for_task(&fields(), &existing());
        let payload = form.payload("demo-org").unwrap();
        assert_eq!(payload.organization_id.as_deref(), Some("acme"));
    }

    #[test]
    fn test_submit_create_resets_form() {
        let backend = FakeBackend::default();
        let mut form = TaskForm::new(&fields());
        form.set_value("title", "New");

        form.submit(&backend, "demo-org").unwrap();

        assert_eq!(form.value("title"), "");
        let stored = backend.tasks();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].text("title"), "New");
        assert_eq!(backend.calls(), vec!["InsertTask"]);
    }

    #[test]
    fn test_submit_update_targets_existing_task() {
        let backend = FakeBackend::with_tasks(vec![existing()]);
        let mut form = TaskForm::for_task(&fields(), &existing());
        form.set_value("title", "Buy oat milk");

        form.submit(&backend, "demo-org").unwrap();

        assert_eq!(backend.tasks()[0].text("title"), "Buy oat milk");
        assert_eq!(backend.calls(), vec!["UpdateTask"]);
    }

    #[test]
    fn test_failed_submit_keeps_values() {
        let backend = FakeBackend::default();
        backend.fail_next("InsertTask");
        let mut form = TaskForm::new(&fields());
        form.set_value("title", "Keep me");

        assert!(matches!(form.submit(&backend, "o"), Err(FormError::Api(_))));
        assert_eq!(form.value("title"), "Keep me");
        assert!(backend.tasks().is_empty());
    }
}
