//! Restore Session Use Case
//!
//! Re-validates a stored token with bounded retries. Only transient backend
//! failures are retried; on final failure the context is cleared.

use std::sync::Arc;

use platform::retry::RetryPolicy;

use crate::application::context::AuthContext;
use crate::domain::entity::identity::Identity;
use crate::domain::repository::AuthBackend;
use crate::error::{AuthError, AuthResult};

pub struct RestoreSessionUseCase<B>
where
    B: AuthBackend,
{
    backend: Arc<B>,
    policy: RetryPolicy,
}

impl<B> RestoreSessionUseCase<B>
where
    B: AuthBackend,
{
    pub fn new(backend: Arc<B>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    /// The context keeps `token`, the token the session was recorded with.
    pub async fn execute(&self, token: &str, ctx: &mut AuthContext) -> AuthResult<Identity> {
        let backend = &self.backend;
        let result = self
            .policy
            .run(
                |attempt| async move {
                    tracing::debug!(attempt, "Refreshing session token");
                    backend.refresh(token).await
                },
                AuthError::is_transient,
            )
            .await;

        match result {
            Ok(grant) => {
                tracing::debug!(account_id = %grant.identity.id, "Session restored");
                ctx.publish(grant.identity.clone(), token);
                Ok(grant.identity)
            }
            Err(e) => {
                tracing::info!(error = %e, transient = e.is_transient(), "Session restore failed");
                ctx.clear();
                Err(e)
            }
        }
    }
}
