use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque result document returned by a finished procedure.
pub type ProcedurePayload = serde_json::Value;

/// Status as observed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProcedureStatus {
    #[default]
    NotStarted,
    Running,
    Succeeded(ProcedurePayload),
    Failed(ProcedureError),
}

impl ProcedureStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcedureStatus::Succeeded(_) | ProcedureStatus::Failed(_))
    }

    pub fn payload(&self) -> Option<&ProcedurePayload> {
        match self {
            ProcedureStatus::Succeeded(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ProcedureError> {
        match self {
            ProcedureStatus::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Status as reported by a single poll of the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    NotStarted,
    Running,
    Succeeded(ProcedurePayload),
    Failed(RemoteFailure),
}

/// The remote accepted a submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Accepted {
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The remote rejected a submission. Field-keyed errors belong to the
/// originating form inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("submission rejected: {message}")]
pub struct SubmissionError {
    pub message: String,
    pub field_errors: Vec<FieldError>,
}

impl SubmissionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.field_errors.push(FieldError::new(field, message));
        self
    }

    pub fn is_validation(&self) -> bool {
        !self.field_errors.is_empty()
    }

    pub fn field_error(&self, field: &str) -> Option<&FieldError> {
        self.field_errors.iter().find(|e| e.field == field)
    }
}

/// A single poll attempt failed. Transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("poll failed: {message}")]
pub struct PollError {
    pub message: String,
}

impl PollError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The remote reports that the procedure itself failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("procedure failed: {message}")]
pub struct RemoteFailure {
    pub message: String,
    pub detail: Option<serde_json::Value>,
}

impl RemoteFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }
}

/// Terminal failure of a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcedureError {
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Remote(#[from] RemoteFailure),
}

impl ProcedureError {
    pub fn message(&self) -> &str {
        match self {
            ProcedureError::Submission(err) => &err.message,
            ProcedureError::Remote(err) => &err.message,
        }
    }
}
