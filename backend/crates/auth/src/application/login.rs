//! Login Completion
//!
//! Runs after any successful factor: streak update, session record, then
//! the identity is published into the caller's context.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::client::{ClientFingerprint, IpResolver};

use crate::application::config::AuthConfig;
use crate::application::context::AuthContext;
use crate::application::session_recorder::SessionRecorder;
use crate::domain::entity::identity::Identity;
use crate::domain::repository::{AccountRepository, AuthGrant, SessionRepository};
use crate::error::AuthResult;

pub struct CompleteLoginUseCase<A, S>
where
    A: AccountRepository,
    S: SessionRepository,
{
    account_repo: Arc<A>,
    recorder: SessionRecorder<S>,
}

impl<A, S> CompleteLoginUseCase<A, S>
where
    A: AccountRepository,
    S: SessionRepository,
{
    pub fn new(
        account_repo: Arc<A>,
        session_repo: Arc<S>,
        config: &AuthConfig,
        ip_resolver: Arc<IpResolver>,
    ) -> Self {
        Self {
            account_repo,
            recorder: SessionRecorder::new(session_repo, config, ip_resolver),
        }
    }

    pub async fn execute(
        &self,
        grant: AuthGrant,
        fingerprint: &ClientFingerprint,
        ctx: &mut AuthContext,
    ) -> AuthResult<Identity> {
        self.execute_at(grant, fingerprint, ctx, Utc::now()).await
    }

    /// Streak and session failures are logged; the login itself stands.
    pub async fn execute_at(
        &self,
        grant: AuthGrant,
        fingerprint: &ClientFingerprint,
        ctx: &mut AuthContext,
        now: DateTime<Utc>,
    ) -> AuthResult<Identity> {
        let AuthGrant {
            token,
            mut identity,
        } = grant;

        let (streak, change) = identity.streak().advance(now);
        identity = match self.account_repo.update_streak(&identity.id, &streak).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(account_id = %identity.id, error = %e, "Failed to persist learning streak");
                identity.apply_streak(&streak);
                identity
            }
        };
        tracing::debug!(
            account_id = %identity.id,
            streak = identity.learning_streak,
            change = %change,
            "Learning streak updated"
        );

        if let Err(e) = self
            .recorder
            .record_login(&identity.id, &token, fingerprint, now)
            .await
        {
            tracing::warn!(account_id = %identity.id, error = %e, "Failed to record session");
        }

        tracing::info!(
            account_id = %identity.id,
            device = %fingerprint.device_label(),
            "User signed in"
        );

        ctx.publish(identity.clone(), token);
        Ok(identity)
    }
}
