use axum::{http::StatusCode, Json};
use thiserror::Error;

/// A stored time entry that cannot take part in any computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("invalid time entry {id}: {reason}")]
    InvalidEntry { id: u64, reason: &'static str },
}

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("Employee is already clocked in")]
    AlreadyClockedIn,
    #[error("Employee is not clocked in")]
    NotClockedIn,
    #[error(transparent)]
    Entry(#[from] EntryError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read data file: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to parse data file: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to encode data: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write data file: {0}")]
    Write(#[source] std::io::Error),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<EntryError> for AppError {
    fn from(err: EntryError) -> Self {
        Self::internal(err)
    }
}

impl From<ClockError> for AppError {
    fn from(err: ClockError) -> Self {
        match err {
            ClockError::Entry(inner) => Self::internal(inner),
            other => Self::bad_request(other.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}
