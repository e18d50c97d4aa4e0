//! Error types for the board engine, the persistence boundary, and API responses.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors raised while interpreting or applying a move.
///
/// `TaskNotFound` and `ColumnNotFound` are detected locally before any state
/// is touched and never reach the backend. A drop on something that is neither
/// a column nor a task is not an error; the gesture is cancelled with
/// [`crate::gesture::CancelReason::InvalidTarget`].
/// `PersistenceFailure` is produced after the backend rejected a move and the
/// local board has already been rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("no board loaded")]
    BoardNotLoaded,

    #[error("failed to persist move of task {task_id}: {reason}")]
    PersistenceFailure { task_id: String, reason: String },
}

/// Errors returned by a [`crate::sync::BoardBackend`].
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error(transparent)]
    Storage(anyhow::Error),
}

impl BackendError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

// Database helpers return anyhow errors that may wrap a typed BackendError.
impl From<anyhow::Error> for BackendError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<BackendError>() {
            Ok(backend_err) => backend_err,
            Err(err) => BackendError::Storage(err),
        }
    }
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Errors from non-move board operations on a [`crate::controller::BoardController`].
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("no board loaded")]
    BoardNotLoaded,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    MissingRequiredField,
    InvalidFieldValue,
    Unauthenticated,

    // Not found errors
    BoardNotFound,
    ColumnNotFound,
    TaskNotFound,

    // Conflict errors
    NotOwner,

    // Backend errors
    DatabaseError,
    InternalError,
}

/// Structured error for API responses.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("{} is required", field),
        )
        .with_field(field)
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason).with_field(field)
    }

    pub fn unauthenticated() -> Self {
        Self::new(ErrorCode::Unauthenticated, "x-user-id header is required")
    }

    pub fn not_owner(kind: &str, id: &str) -> Self {
        Self::new(
            ErrorCode::NotOwner,
            format!("{} {} belongs to another user", kind, id),
        )
    }

    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self.code {
            ErrorCode::MissingRequiredField | ErrorCode::InvalidFieldValue => 400,
            ErrorCode::Unauthenticated => 401,
            ErrorCode::NotOwner => 403,
            ErrorCode::BoardNotFound | ErrorCode::ColumnNotFound | ErrorCode::TaskNotFound => 404,
            ErrorCode::DatabaseError | ErrorCode::InternalError => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound { kind, ref id } => {
                let code = match kind {
                    "board" => ErrorCode::BoardNotFound,
                    "column" => ErrorCode::ColumnNotFound,
                    "task" => ErrorCode::TaskNotFound,
                    _ => ErrorCode::InternalError,
                };
                ApiError::new(code, format!("{} not found: {}", kind, id))
            }
            BackendError::Invalid { field, ref reason } => ApiError::invalid_value(field, reason),
            BackendError::Storage(e) => ApiError::new(ErrorCode::DatabaseError, e.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        BackendError::from(err).into()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
