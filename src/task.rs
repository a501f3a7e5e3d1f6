//! Task data structure.
//!
//! A task has no fixed schema: apart from the backend's `_id` and
//! `organizationId`, its properties are whatever form fields were configured
//! when it was created or last edited.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A work item as stored by the backend.
///
/// Field values keep the order in which the backend sent them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id", default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        rename = "organizationId",
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub organization_id: Option<String>,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

/// Identifiers arrive as strings, but a number or other scalar is kept as its
/// JSON text rather than failing the whole task list.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

impl Task {
    /// Build a task from `(name, value)` string pairs.
    pub fn with_values<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Task {
            id: None,
            organization_id: None,
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The value of a field as display text; empty when absent.
    pub fn text(&self, name: &str) -> String {
        self.get(name).map(value_text).unwrap_or_default()
    }

    /// All of the task's own property values joined with spaces, system
    /// fields included. This is what search matches against.
    pub fn search_text(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.values.len() + 2);
        if let Some(id) = &self.id {
            parts.push(id.clone());
        }
        if let Some(org) = &self.organization_id {
            parts.push(org.clone());
        }
        parts.extend(self.values.values().map(value_text));
        parts.join(" ")
    }

    /// A short human-readable name for prompts and status messages.
    pub fn display_name(&self) -> String {
        match self.get("title").map(value_text) {
            Some(title) if !title.is_empty() => title,
            _ => self.id.clone().unwrap_or_else(|| "(untitled)".to_string()),
        }
    }
}

/// Render a JSON value as plain text. Strings are unquoted and null is empty.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_task_wire_format() {
        let raw = json!({
            "_id": "t1",
            "organizationId": "demo-org",
            "title": "Buy milk",
            "due": "2025-01-31",
            "points": 3
        });
        let task: Task = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(task.id.as_deref(), Some("t1"));
        assert_eq!(task.organization_id.as_deref(), Some("demo-org"));
        assert_eq!(task.values.keys().collect::<Vec<_>>(), vec!["title", "due", "points"]);
        assert_eq!(serde_json::to_value(&task).unwrap(), raw);
    }

    #[test]
    fn test_new_task_omits_system_fields() {
        let task = Task::with_values([("title", "x")]);
        assert_eq!(serde_json::to_value(&task).unwrap(), json!({"title": "x"}));
    }

    #[test]
    fn test_search_text_joins_everything() {
        let mut task = Task::with_values([("title", "Buy milk"), ("note", "2%")]);
        task.id = Some("abc".into());
        task.values.insert("done".into(), Value::Bool(false));
        task.values.insert("gone".into(), Value::Null);
        assert_eq!(task.search_text(), "abc Buy milk 2% false ");
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let mut task = Task::with_values([("owner", "me")]);
        assert_eq!(task.display_name(), "(untitled)");
        task.id = Some("42".into());
        assert_eq!(task.display_name(), "42");
        task.values.insert("title".into(), Value::String("Ship it".into()));
        assert_eq!(task.display_name(), "Ship it");
    }

    #[test]
    fn test_non_string_ids_do_not_fail_the_list() {
        let raw = json!([
            {"_id": 42, "organizationId": 7, "title": "numeric"},
            {"_id": "a", "organizationId": null, "title": "plain"},
            {"title": "no id"}
        ]);
        let tasks: Vec<Task> = serde_json::from_value(raw).unwrap();
        let ids: Vec<Option<&str>> = tasks.iter().map(|t| t.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("42"), Some("a"), None]);
        assert_eq!(tasks[0].organization_id.as_deref(), Some("7"));
        assert_eq!(tasks[1].organization_id, None);
        assert_eq!(tasks[0].text("title"), "numeric");
    }
}
