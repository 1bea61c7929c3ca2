//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::cipher::CipherError;
use platform::pocketbase::BackendError;
use thiserror::Error;

use crate::domain::services::ValidationReport;
use crate::domain::value_object::email::EmailError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials rejected before contacting the backend
    #[error("{}", .0.summary())]
    Validation(ValidationReport),

    /// Email could not be parsed
    #[error("{0}")]
    InvalidEmail(#[from] EmailError),

    /// No identity in the current context
    #[error("User not authenticated")]
    NotAuthenticated,

    /// Authenticated but lacking the required role
    #[error("Insufficient permissions")]
    Forbidden,

    /// Account record missing
    #[error("Account not found")]
    AccountNotFound,

    /// Backend rejected the request or was unreachable; message unchanged
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Origin encryption failed
    #[error("Origin encryption failed: {0}")]
    Cipher(#[from] CipherError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Worth retrying: the backend was unreachable or overloaded
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::Backend(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) | AuthError::InvalidEmail(_) => ErrorKind::UnprocessableEntity,
            AuthError::NotAuthenticated => ErrorKind::Unauthorized,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::Backend(e) => e.kind(),
            AuthError::Cipher(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Validation(report) => AppError::unprocessable(report.summary().to_string())
                .with_details(serde_json::json!({
                    "emailErrors": report.email_errors,
                    "passwordErrors": report.password_errors,
                })),
            AuthError::Backend(e) => e.to_app_error(),
            // Keep key material details out of responses
            AuthError::Cipher(_) => AppError::internal("Internal error"),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::Backend(e) if e.is_transient() => {
                tracing::error!(error = %e, "Auth backend unavailable");
            }
            AuthError::Backend(e) => {
                tracing::warn!(error = %e, status = ?e.status_code(), "Auth backend rejected request");
            }
            AuthError::Cipher(e) => {
                tracing::error!(error = %e, "Origin cipher error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Forbidden => {
                tracing::warn!("Access denied for insufficient role");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
