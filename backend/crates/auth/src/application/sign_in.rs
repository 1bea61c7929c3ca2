//! Sign In Use Case
//!
//! Validates credentials, authenticates against the backend and either
//! completes the login or starts an OTP second factor.

use std::sync::Arc;

use platform::client::IpResolver;

use crate::application::config::AuthConfig;
use crate::application::context::AuthContext;
use crate::application::login::CompleteLoginUseCase;
use crate::application::second_factor::OtpCoordinator;
use crate::domain::entity::{
    identity::Identity,
    otp_challenge::{OtpChallenge, OtpPurpose},
};
use crate::domain::repository::{AccountRepository, AuthBackend, PasswordAuthOutcome, SessionRepository};
use crate::domain::services::validate_credentials;
use crate::domain::value_object::{email::Email, user_password::UserPassword};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: UserPassword,
}

/// Sign in output
#[derive(Debug)]
pub enum SignInOutput {
    Authenticated { identity: Identity, token: String },
    /// Password accepted; the emailed code must be verified next
    OtpRequired(OtpChallenge),
}

/// Re-export ClientFingerprint from platform
pub use platform::client::ClientFingerprint;

/// Sign in use case
pub struct SignInUseCase<B, A, S>
where
    B: AuthBackend,
    A: AccountRepository,
    S: SessionRepository,
{
    backend: Arc<B>,
    otp: Arc<OtpCoordinator<B>>,
    complete: CompleteLoginUseCase<A, S>,
    config: Arc<AuthConfig>,
}

impl<B, A, S> SignInUseCase<B, A, S>
where
    B: AuthBackend,
    A: AccountRepository,
    S: SessionRepository,
{
    pub fn new(
        backend: Arc<B>,
        account_repo: Arc<A>,
        session_repo: Arc<S>,
        otp: Arc<OtpCoordinator<B>>,
        config: Arc<AuthConfig>,
        ip_resolver: Arc<IpResolver>,
    ) -> Self {
        Self {
            backend,
            otp,
            complete: CompleteLoginUseCase::new(account_repo, session_repo, &config, ip_resolver),
            config,
        }
    }

    pub async fn execute(
        &self,
        input: SignInInput,
        fingerprint: ClientFingerprint,
        ctx: &mut AuthContext,
    ) -> AuthResult<SignInOutput> {
        let report = validate_credentials(&input.email, &input.password, &self.config.email_policy);
        if !report.valid {
            tracing::debug!(
                email_errors = report.email_errors.len(),
                password_errors = report.password_errors.len(),
                "Sign-in rejected by validation"
            );
            return Err(AuthError::Validation(report));
        }
        let email = Email::parse(&input.email)?;

        match self
            .backend
            .auth_with_password(&email, input.password.as_str())
            .await?
        {
            PasswordAuthOutcome::Authenticated(grant) => {
                let token = grant.token.clone();
                let identity = self.complete.execute(grant, &fingerprint, ctx).await?;
                Ok(SignInOutput::Authenticated { identity, token })
            }
            PasswordAuthOutcome::MfaRequired { mfa_id } => {
                tracing::info!(email = %email, "Second factor required");
                let challenge = self
                    .otp
                    .request_otp(&email, OtpPurpose::Login, Some(mfa_id))
                    .await?;
                Ok(SignInOutput::OtpRequired(challenge))
            }
        }
    }
}
