//! Sign Out Use Case
//!
//! Deactivates the session record of the current token and clears the
//! context. The context is cleared even when the backend call fails.

use std::sync::Arc;

use platform::client::IpResolver;

use crate::application::config::AuthConfig;
use crate::application::context::AuthContext;
use crate::application::session_recorder::SessionRecorder;
use crate::domain::repository::SessionRepository;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionRepository,
{
    recorder: SessionRecorder<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: &AuthConfig, ip_resolver: Arc<IpResolver>) -> Self {
        Self {
            recorder: SessionRecorder::new(session_repo, config, ip_resolver),
        }
    }

    /// Returns whether a session record was deactivated
    pub async fn execute(&self, ctx: &mut AuthContext) -> bool {
        let deactivated = match (ctx.identity(), ctx.token()) {
            (Some(identity), Some(token)) => {
                match self.recorder.record_logout(&identity.id, token).await {
                    Ok(found) => {
                        tracing::info!(account_id = %identity.id, "User signed out");
                        found
                    }
                    Err(e) => {
                        tracing::warn!(
                            account_id = %identity.id,
                            error = %e,
                            "Failed to deactivate session record"
                        );
                        false
                    }
                }
            }
            _ => false,
        };

        ctx.clear();
        deactivated
    }
}
