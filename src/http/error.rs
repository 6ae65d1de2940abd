//! Client error types

use http::StatusCode;
use thiserror::Error;

/// Everything that can go wrong between a store action and the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server error {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The server answered successfully but not with what we needed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A bounded operation did not settle in time
    #[error("Timed out: {0}")]
    Timeout(String),

    /// The session this call belonged to was ended while it was in flight
    #[error("Session ended while {0}")]
    SessionEnded(String),
}

impl ApiError {
    /// Create error from HTTP status code
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            message: message.into(),
        }
    }

    /// The HTTP status behind this error, when the server produced one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Request(e) => e.status(),
            _ => None,
        }
    }

    /// 403 is how the API reports a missing or expired access token.
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(StatusCode::FORBIDDEN)
    }
}
