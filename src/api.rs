//! REST client for the task backend.
//!
//! The backend is reached through the `TaskBackend` trait so the controllers
//! can be driven by the HTTP implementation in production and by an
//! in-memory fake in tests.

use reqwest::blocking::{Client, RequestBuilder, Response};
use thiserror::Error;

use crate::fields::FieldDescriptor;
use crate::task::Task;

/// Client-side API error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("decode: {0}")]
    Decode(String),
}

/// CRUD operations offered by the backend.
pub trait TaskBackend {
    fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;
    fn insert_task(&self, task: &Task) -> Result<(), ApiError>;
    fn update_task(&self, id: &str, organization_id: &str, task: &Task) -> Result<(), ApiError>;
    fn delete_task(&self, id: &str, organization_id: &str) -> Result<(), ApiError>;
    fn get_form_settings(&self) -> Result<Vec<FieldDescriptor>, ApiError>;
    fn save_form_settings(&self, fields: &[FieldDescriptor]) -> Result<(), ApiError>;
}

/// `TaskBackend` over blocking HTTP.
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(HttpBackend {
            http: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.base_url, endpoint)
    }

    fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<Response, ApiError> {
        tracing::debug!(endpoint, "sending request");
        let resp = request.send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        Ok(resp)
    }
}

impl TaskBackend for HttpBackend {
    fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let resp = self.send(self.http.get(self.url("GetTasks")), "GetTasks")?;
        resp.json().map_err(|e| ApiError::Decode(format!("task list: {}", e)))
    }

    fn insert_task(&self, task: &Task) -> Result<(), ApiError> {
        self.send(self.http.post(self.url("InsertTask")).json(task), "InsertTask")?;
        Ok(())
    }

    fn update_task(&self, id: &str, organization_id: &str, task: &Task) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.url("UpdateTask"))
            .query(&[("id", id), ("organizationId", organization_id)])
            .json(task);
        self.send(request, "UpdateTask")?;
        Ok(())
    }

    fn delete_task(&self, id: &str, organization_id: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .delete(self.url("DeleteTask"))
            .query(&[("id", id), ("organizationId", organization_id)]);
        self.send(request, "DeleteTask")?;
        Ok(())
    }

    fn get_form_settings(&self) -> Result<Vec<FieldDescriptor>, ApiError> {
        let resp = self.send(self.http.get(self.url("GetFormSettings")), "GetFormSettings")?;
        resp.json().map_err(|e| ApiError::Decode(format!("form settings: {}", e)))
    }

    fn save_form_settings(&self, fields: &[FieldDescriptor]) -> Result<(), ApiError> {
        self.send(self.http.post(self.url("SaveFormSettings")).json(fields), "SaveFormSettings")?;
        Ok(())
    }
}
