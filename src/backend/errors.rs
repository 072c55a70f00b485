//! Errors raised by the hosted backend boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend returned HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Network error: {message}")]
    Network { message: String },
    #[error("Invalid response from backend: {message}")]
    InvalidResponse { message: String },
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Storage upload failed for {path}: {message}")]
    Storage { path: String, message: String },
    #[error("Remote procedure {procedure} failed: {message}")]
    Procedure {
        procedure: String,
        code: Option<String>,
        message: String,
    },
    #[error("Backend configuration error: {message}")]
    Configuration { message: String },
    #[error("Injected failure in {operation}")]
    Injected { operation: String },
}

impl BackendError {
    pub fn network(message: impl Into<String>) -> Self {
        BackendError::Network {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        BackendError::InvalidResponse {
            message: message.into(),
        }
    }

    /// HTTP status behind the error, if the backend answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            BackendError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound { .. }) || self.status_code() == Some(404)
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::invalid_response(err.to_string())
        } else if let Some(status) = err.status() {
            BackendError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            BackendError::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::invalid_response(err.to_string())
    }
}
