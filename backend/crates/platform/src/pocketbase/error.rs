//! Backend error type

use kernel::error::{app_error::AppError, kind::ErrorKind};
use serde::Deserialize;

pub type BackendResult<T> = Result<T, BackendError>;

/// Failure talking to the hosted backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend answered with a non-success status; `message` is the
    /// backend's own message and is surfaced to users unchanged.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        data: serde_json::Value,
    },

    /// The request never completed (DNS, connect, timeout, TLS)
    #[error("Backend unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body did not have the expected shape
    #[error("Unexpected backend response: {0}")]
    Decode(String),
}

/// Error body returned by the backend
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl BackendError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        BackendError::Status {
            status,
            message: message.into(),
            data: serde_json::Value::Null,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Worth retrying: unreachable backend, throttling or a 5xx answer
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Transport(_) => true,
            BackendError::Status { status, .. } => *status == 429 || *status >= 500,
            BackendError::Decode(_) => false,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::Status { status, .. } => ErrorKind::from_upstream_status(*status),
            BackendError::Transport(e) if e.is_timeout() => ErrorKind::GatewayTimeout,
            BackendError::Transport(_) => ErrorKind::ServiceUnavailable,
            BackendError::Decode(_) => ErrorKind::BadGateway,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            BackendError::Status { data, .. } if data.as_object().is_some_and(|o| !o.is_empty()) => {
                err.with_details(data.clone())
            }
            _ => err,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(BackendError::status(503, "down").is_transient());
        assert!(BackendError::status(429, "slow down").is_transient());
        assert!(!BackendError::status(400, "Failed to authenticate.").is_transient());
        assert!(!BackendError::Decode("bad json".into()).is_transient());
    }

    #[test]
    fn test_message_is_backend_message() {
        let err = BackendError::status(400, "Failed to authenticate.");
        assert_eq!(err.to_string(), "Failed to authenticate.");
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.to_app_error().message(), "Failed to authenticate.");
    }

    #[test]
    fn test_field_errors_become_details() {
        let err = BackendError::Status {
            status: 400,
            message: "Failed to create record.".into(),
            data: serde_json::json!({ "email": { "code": "validation_not_unique" } }),
        };
        let app = err.to_app_error();
        assert_eq!(
            app.details().unwrap()["email"]["code"],
            "validation_not_unique"
        );
    }
}
