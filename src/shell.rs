//! Application shell: the task list, the route, and the add/edit dialog.
//!
//! Every refresh draws a request token, and a successful mutation is always
//! followed by its own refresh. A task list that arrives after a newer token
//! was issued is dropped, so a slow refresh cannot overwrite the result of a
//! later change. A failed mutation issues nothing.

use crate::api::{ApiError, TaskBackend};
use crate::confirm::Confirm;
use crate::form::{FormError, TaskForm};
use crate::task::Task;

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Tasks,
    FieldSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Monotonic source of request tokens.
#[derive(Debug, Default)]
pub struct RequestTokens {
    latest: u64,
}

impl RequestTokens {
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }
}

pub struct Shell {
    organization_id: String,
    tasks: Vec<Task>,
    loading: bool,
    route: Route,
    editing: Option<Task>,
    dialog_open: bool,
    tokens: RequestTokens,
}

impl Shell {
    pub fn new(organization_id: &str) -> Self {
        Shell {
            organization_id: organization_id.to_string(),
            tasks: Vec::new(),
            loading: true,
            route: Route::Tasks,
            editing: None,
            dialog_open: false,
            tokens: RequestTokens::default(),
        }
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn navigate(&mut self, route: Route) {
        self.route = route;
    }

    pub fn editing(&self) -> Option<&Task> {
        self.editing.as_ref()
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    /// Start a task-list fetch.
    pub fn begin_refresh(&mut self) -> RequestToken {
        self.loading = true;
        self.tokens.issue()
    }

    /// Apply a task-list response. Returns false when the response was stale
    /// and dropped. On error the previous list is kept.
    pub fn finish_refresh(&mut self, token: RequestToken, result: Result<Vec<Task>, ApiError>) -> Result<bool, ApiError> {
        if !self.tokens.is_current(token) {
            tracing::debug!(?token, "dropping stale task list");
            return Ok(false);
        }
        self.loading = false;
        match result {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "loaded tasks");
                self.tasks = tasks;
                Ok(true)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch tasks");
                Err(e)
            }
        }
    }

    /// Fetch the task list.
    pub fn refresh(&mut self, backend: &dyn TaskBackend) -> Result<(), ApiError> {
        let token = self.begin_refresh();
        self.finish_refresh(token, backend.list_tasks())?;
        Ok(())
    }

    pub fn open_add(&mut self) {
        self.editing = None;
        self.dialog_open = true;
    }

    pub fn begin_edit(&mut self, task: &Task) {
        self.editing = Some(task.clone());
        self.dialog_open = true;
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.dialog_open = false;
    }

    /// Submit the dialog's form. On success the dialog closes and the task
    /// list is refreshed; on failure the dialog stays open.
    pub fn submit_form(&mut self, backend: &dyn TaskBackend, form: &mut TaskForm) -> Result<(), FormError> {
        form.submit(backend, &self.organization_id)?;
        self.cancel_edit();
        // The task was saved; a failed refresh is already logged.
        let _ = self.refresh(backend);
        Ok(())
    }

    /// Delete a task after confirmation. Returns whether it was deleted.
    pub fn delete_task(
        &mut self,
        backend: &dyn TaskBackend,
        task: &Task,
        confirm: &mut dyn Confirm,
    ) -> Result<bool, ApiError> {
        if !confirm.confirm(&format!("Delete task \"{}\"?", task.display_name())) {
            return Ok(false);
        }
        let Some(id) = task.id.as_deref() else {
            tracing::warn!("cannot delete a task without an id");
            return Ok(false);
        };
        let org = task.organization_id.as_deref().unwrap_or(&self.organization_id).to_string();

        if let Err(e) = backend.delete_task(id, &org) {
            tracing::error!(error = %e, id, "failed to delete task");
            return Err(e);
        }
        tracing::info!(id, "deleted task");
        let _ = self.refresh(backend);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::fields::{FieldDescriptor, FieldType};
    use pretty_assertions::assert_eq;

    fn task(id: &str, title: &str) -> Task {
        let mut t = Task::with_values([("title", title)]);
        t.id = Some(id.to_string());
        t.organization_id = Some("demo-org".to_string());
        t
    }

    fn ids(shell: &Shell) -> Vec<String> {
        shell.tasks().iter().filter_map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_refresh_loads_tasks() {
        let backend = FakeBackend::with_tasks(vec![task("1", "a"), task("2", "b")]);
        let mut shell = Shell::new("demo-org");
        assert!(shell.is_loading());
        shell.refresh(&backend).unwrap();
        assert!(!shell.is_loading());
        assert_eq!(ids(&shell), vec!["1", "2"]);
    }

    #[test]
    fn test_failed_refresh_keeps_tasks() {
        let backend = FakeBackend::with_tasks(vec![task("1", "a")]);
        let mut shell = Shell::new("demo-org");
        shell.refresh(&backend).unwrap();

        backend.fail_next("GetTasks");
        assert!(shell.refresh(&backend).is_err());
        assert_eq!(ids(&shell), vec!["1"]);
        assert!(!shell.is_loading());
    }

    #[test]
    fn test_failed_submit_does_not_strand_inflight_refresh() {
        let backend = FakeBackend::default();
        backend.set_fields(vec![FieldDescriptor::new("title", "Title", FieldType::Text)]);
        let mut shell = Shell::new("demo-org");
        let inflight = shell.begin_refresh();

        shell.open_add();
        let mut form = TaskForm::new(&backend.fields());
        form.set_value("title", "Buy milk");
        backend.fail_next("InsertTask");
        assert!(shell.submit_form(&backend, &mut form).is_err());

        assert!(shell.finish_refresh(inflight, Ok(vec![task("1", "a")])).unwrap());
        assert!(!shell.is_loading());
        assert_eq!(ids(&shell), vec!["1"]);
    }

    #[test]
    fn test_failed_delete_does_not_strand_inflight_refresh() {
        let backend = FakeBackend::with_tasks(vec![task("1", "a")]);
        let mut shell = Shell::new("demo-org");
        let inflight = shell.begin_refresh();

        backend.fail_next("DeleteTask");
        assert!(shell.delete_task(&backend, &task("1", "a"), &mut true).is_err());

        assert!(shell.finish_refresh(inflight, Ok(vec![task("1", "a")])).unwrap());
        assert!(!shell.is_loading());
    }

    #[test]
    fn test_stale_refresh_is_dropped() {
        let mut shell = Shell::new("demo-org");
        let slow = shell.begin_refresh();
        let fast = shell.begin_refresh();

        assert!(shell.finish_refresh(fast, Ok(vec![task("new", "fresh")])).unwrap());
        assert!(!shell.finish_refresh(slow, Ok(vec![task("old", "stale")])).unwrap());
        assert_eq!(ids(&shell), vec!["new"]);
    }

    #[test]
    fn test_delete_without_confirmation_changes_nothing() {
        let backend = FakeBackend::with_tasks(vec![task("1", "a"), task("2", "b")]);
        let mut shell = Shell::new("demo-org");
        shell.refresh(&backend).unwrap();

        let target = shell.tasks()[0].clone();
        assert!(!shell.delete_task(&backend, &target, &mut false).unwrap());
        assert_eq!(ids(&shell), vec!["1", "2"]);
        assert_eq!(backend.calls(), vec!["GetTasks"]);
    }

    #[test]
    fn test_confirmed_delete_removes_exactly_one() {
        let backend = FakeBackend::with_tasks(vec![task("1", "a"), task("2", "b"), task("3", "c")]);
        let mut shell = Shell::new("demo-org");
        shell.refresh(&backend).unwrap();

        let target = shell.tasks()[1].clone();
        assert!(shell.delete_task(&backend, &target, &mut true).unwrap());
        assert_eq!(ids(&shell), vec!["1", "3"]);
    }

    #[test]
    fn test_failed_delete_leaves_state() {
        let backend = FakeBackend::with_tasks(vec![task("1", "a")]);
        let mut shell = Shell::new("demo-org");
        shell.refresh(&backend).unwrap();
        backend.fail_next("DeleteTask");

        let target = shell.tasks()[0].clone();
        assert!(shell.delete_task(&backend, &target, &mut true).is_err());
        assert_eq!(ids(&shell), vec!["1"]);
    }

    #[test]
    fn test_edit_dialog_lifecycle() {
        let backend = FakeBackend::with_tasks(vec![task("1", "a")]);
        let fields = vec![FieldDescriptor::new("title", "Title", FieldType::Text)];
        let mut shell = Shell::new("demo-org");
        shell.refresh(&backend).unwrap();

        let target = shell.tasks()[0].clone();
        shell.begin_edit(&target);
        assert!(shell.is_dialog_open());
        assert_eq!(shell.editing().and_then(|t| t.id.as_deref()), Some("1"));

        let mut form = TaskForm::for_task(&fields, &target);
        form.set_value("title", "renamed");
        shell.submit_form(&backend, &mut form).unwrap();

        assert!(!shell.is_dialog_open());
        assert!(shell.editing().is_none());
        assert_eq!(shell.tasks()[0].text("title"), "renamed");
    }

    #[test]
    fn test_failed_submit_keeps_dialog_open() {
        let backend = FakeBackend::default();
        backend.fail_next("InsertTask");
        let fields = vec![FieldDescriptor::new("title", "Title", FieldType::Text)];
        let mut shell = Shell::new("demo-org");

        shell.open_add();
        let mut form = TaskForm::new(&fields);
        form.set_value("title", "draft");
        assert!(shell.submit_form(&backend, &mut form).is_err());
        assert!(shell.is_dialog_open());
        assert_eq!(form.value("title"), "draft");

        shell.cancel_edit();
        assert!(!shell.is_dialog_open());
    }

    #[test]
    fn test_navigation() {
        let mut shell = Shell::new("demo-org");
        assert_eq!(shell.route(), Route::Tasks);
        shell.navigate(Route::FieldSettings);
        assert_eq!(shell.route(), Route::FieldSettings);
    }
}
