//! Learning Error Types

use auth::AuthError;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::id::IdError;
use platform::pocketbase::BackendError;
use thiserror::Error;

pub type LearningResult<T> = Result<T, LearningError>;

#[derive(Debug, Error)]
pub enum LearningError {
    /// No identity in the current context
    #[error("User not authenticated")]
    NotAuthenticated,

    /// Settings saved without a signed-in user
    #[error("Not authenticated")]
    SettingsUnauthenticated,

    /// Signed in but not an administrator
    #[error("Admin access required")]
    Forbidden,

    /// Profile update rejected by the backend
    #[error("Failed to save changes.")]
    SaveFailed(#[source] AuthError),

    /// Malformed record id in a path or body
    #[error("{0}")]
    InvalidId(#[from] IdError),

    /// Backend rejected the request or was unreachable; message unchanged
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl LearningError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LearningError::NotAuthenticated | LearningError::SettingsUnauthenticated => {
                ErrorKind::Unauthorized
            }
            LearningError::Forbidden => ErrorKind::Forbidden,
            LearningError::SaveFailed(e) => e.kind(),
            LearningError::InvalidId(_) => ErrorKind::BadRequest,
            LearningError::Backend(e) => e.kind(),
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            LearningError::Backend(e) => e.to_app_error(),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    pub fn log(&self) {
        match self {
            LearningError::Backend(e) if e.is_transient() => {
                tracing::error!(error = %e, "Learning backend unavailable");
            }
            LearningError::Backend(e) => {
                tracing::warn!(error = %e, status = ?e.status_code(), "Learning backend rejected request");
            }
            LearningError::SaveFailed(e) => {
                tracing::error!(error = %e, "Failed to save profile settings");
            }
            LearningError::Forbidden => {
                tracing::warn!("Admin endpoint requested without admin role");
            }
            _ => {
                tracing::debug!(error = %self, "Learning error");
            }
        }
    }
}

impl IntoResponse for LearningError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_ui_copy() {
        assert_eq!(LearningError::NotAuthenticated.to_string(), "User not authenticated");
        assert_eq!(LearningError::SettingsUnauthenticated.to_string(), "Not authenticated");
        assert_eq!(
            LearningError::SaveFailed(AuthError::NotAuthenticated).to_string(),
            "Failed to save changes."
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(LearningError::Forbidden.kind(), ErrorKind::Forbidden);
        assert_eq!(
            LearningError::from(BackendError::status(404, "The requested resource wasn't found.")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LearningError::from(IdError::Empty).to_app_error().kind(),
            ErrorKind::BadRequest
        );
    }
}
