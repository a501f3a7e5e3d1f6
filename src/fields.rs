//! Form field configuration.
//!
//! This module defines the `FieldDescriptor` that describes one configurable
//! form field, and the `FieldConfig` store that holds the ordered list of
//! descriptors, loads it from the backend, and edits it locally until saved.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{ApiError, TaskBackend};
use crate::confirm::Confirm;

/// Input type of a configured field.
///
/// Unknown type strings coming from the backend are kept verbatim so that a
/// save writes them back unchanged. They render no form control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Email,
    Date,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Date => "date",
            FieldType::Other(s) => s,
        }
    }

    /// Next selectable type, wrapping around. Used by the settings editor.
    pub fn cycle(&self) -> FieldType {
        match self {
            FieldType::Text => FieldType::Email,
            FieldType::Email => FieldType::Date,
            _ => FieldType::Text,
        }
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "text" => FieldType::Text,
            "email" => FieldType::Email,
            "date" => FieldType::Date,
            _ => FieldType::Other(s),
        }
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a user-supplied field type, accepting only the selectable ones.
pub fn parse_field_type(s: &str) -> Result<FieldType, String> {
    match FieldType::from(s.trim().to_lowercase()) {
        FieldType::Other(other) => Err(format!("unknown field type '{}' (expected text, email or date)", other)),
        known => Ok(known),
    }
}

/// A configured form field. `name` is the key used in task data, `label` is
/// what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: &str, label: &str, field_type: FieldType) -> Self {
        FieldDescriptor {
            id: None,
            name: name.to_string(),
            label: label.to_string(),
            field_type,
        }
    }
}

/// Derive the data key for a label: lower-cased, all whitespace removed.
pub fn field_name_from_label(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("field label cannot be empty")]
    BlankLabel,
    #[error("a field named '{0}' already exists")]
    DuplicateName(String),
}

/// Move the element at `from` to position `to`, shifting the ones between.
pub(crate) fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// Ordered field configuration, shared by the task form and the task table.
#[derive(Debug, Default, Clone)]
pub struct FieldConfig {
    fields: Vec<FieldDescriptor>,
    loaded: bool,
}

impl FieldConfig {
    pub fn from_fields(fields: Vec<FieldDescriptor>) -> Self {
        FieldConfig { fields, loaded: true }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// False until the first load attempt has finished.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn get(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id.as_deref() == Some(id))
    }

    /// Fetch the configuration from the backend. On failure the current
    /// fields are kept.
    pub fn load(&mut self, backend: &dyn TaskBackend) -> Result<(), ApiError> {
        let result = backend.get_form_settings();
        self.loaded = true;
        match result {
            Ok(fields) => {
                tracing::debug!(count = fields.len(), "loaded form settings");
                self.fields = fields;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load form settings");
                Err(e)
            }
        }
    }

    /// Append a new field built from a label and type.
    pub fn add(&mut self, label: &str, field_type: FieldType) -> Result<&FieldDescriptor, FieldError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(FieldError::BlankLabel);
        }
        let name = field_name_from_label(label);
        if self.fields.iter().any(|f| f.name == name) {
            return Err(FieldError::DuplicateName(name));
        }

        let mut stamp = Utc::now().timestamp_millis();
        while self.get(&stamp.to_string()).is_some() {
            stamp += 1;
        }

        self.fields.push(FieldDescriptor {
            id: Some(stamp.to_string()),
            name,
            label: label.to_string(),
            field_type,
        });
        Ok(&self.fields[self.fields.len() - 1])
    }

    /// Move the field with id `from_id` to the position of `to_id`.
    pub fn reorder(&mut self, from_id: &str, to_id: &str) {
        if from_id == to_id {
            return;
        }
        let from = self.fields.iter().position(|f| f.id.as_deref() == Some(from_id));
        let to = self.fields.iter().position(|f| f.id.as_deref() == Some(to_id));
        if let (Some(from), Some(to)) = (from, to) {
            move_item(&mut self.fields, from, to);
        }
    }

    /// Remove a field after confirmation. Returns the removed descriptor.
    pub fn remove(&mut self, id: &str, confirm: &mut dyn Confirm) -> Option<FieldDescriptor> {
        let idx = self.fields.iter().position(|f| f.id.as_deref() == Some(id))?;
        let prompt = format!("Delete field '{}'?", self.fields[idx].label);
        if !confirm.confirm(&prompt) {
            return None;
        }
        Some(self.fields.remove(idx))
    }

    /// Persist the whole ordered configuration.
    pub fn save(&self, backend: &dyn TaskBackend) -> Result<(), ApiError> {
        match backend.save_form_settings(&self.fields) {
            Ok(()) => {
                tracing::info!(count = self.fields.len(), "saved form settings");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to save form settings");
                Err(e)
            }
        }
    }
}
