//! Verify OTP Use Case

use std::sync::Arc;

use platform::client::{ClientFingerprint, IpResolver};

use crate::application::config::AuthConfig;
use crate::application::context::AuthContext;
use crate::application::login::CompleteLoginUseCase;
use crate::application::second_factor::{OtpCoordinator, VerifyOtpInput};
use crate::domain::entity::identity::Identity;
use crate::domain::repository::{AccountRepository, AuthBackend, SessionRepository};
use crate::error::AuthResult;

/// Verifies the code and, on success only, completes the login.
pub struct VerifyOtpUseCase<B, A, S>
where
    B: AuthBackend,
    A: AccountRepository,
    S: SessionRepository,
{
    otp: Arc<OtpCoordinator<B>>,
    complete: CompleteLoginUseCase<A, S>,
}

impl<B, A, S> VerifyOtpUseCase<B, A, S>
where
    B: AuthBackend,
    A: AccountRepository,
    S: SessionRepository,
{
    pub fn new(
        otp: Arc<OtpCoordinator<B>>,
        account_repo: Arc<A>,
        session_repo: Arc<S>,
        config: &AuthConfig,
        ip_resolver: Arc<IpResolver>,
    ) -> Self {
        Self {
            otp,
            complete: CompleteLoginUseCase::new(account_repo, session_repo, config, ip_resolver),
        }
    }

    /// Returns the identity and the issued token
    pub async fn execute(
        &self,
        input: &VerifyOtpInput,
        fingerprint: &ClientFingerprint,
        ctx: &mut AuthContext,
    ) -> AuthResult<(Identity, String)> {
        let grant = self.otp.verify_otp(input).await?;
        let token = grant.token.clone();
        let identity = self.complete.execute(grant, fingerprint, ctx).await?;
        Ok((identity, token))
    }
}
