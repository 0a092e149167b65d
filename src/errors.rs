use axum::{extract::multipart::MultipartError, http::StatusCode};
use thiserror::Error;

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

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::bad_request(err.body_text())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Failures of profile operations. The display text is what the page shows.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Authentication required")]
    AuthRequired,
    #[error("Please log in again")]
    AuthExpired,
    #[error("User profile not found")]
    NotFound,
    #[error("Missing required data")]
    MissingPrerequisite,
    #[error("{0}")]
    FetchFailed(String),
    #[error("{0}")]
    UpdateFailed(String),
}

/// Failures reported by a [`crate::backend::ProfileBackend`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend responded with status {status}")]
    Status { status: u16, message: Option<String> },
    #[error("backend request failed: {0}")]
    Transport(String),
}

impl BackendError {
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref().filter(|text| !text.is_empty()),
            Self::Transport(_) => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
