use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ===== Backend Response Types =====

/// Returned by every endpoint that starts a background job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAccepted {
    pub task_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[serde(alias = "processing")]
    Pending,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusResponse<T> {
    pub status: TaskStatus,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> TaskStatusResponse<T> {
    pub fn pending() -> Self {
        Self {
            status: TaskStatus::Pending,
            result: None,
            error: None,
        }
    }

    pub fn completed(result: T) -> Self {
        Self {
            status: TaskStatus::Completed,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: Option<String>) -> Self {
        Self {
            status: TaskStatus::Failed,
            result: None,
            error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    pub text: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub sections: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body shape used by the backend: `{ "detail": ... }`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    pub detail: serde_json::Value,
}

impl ErrorDetail {
    /// Flatten the detail into a display string; non-string details are rendered as JSON
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
