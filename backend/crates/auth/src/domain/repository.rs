//! Repository Traits
//!
//! Interfaces to the hosted backend. Implementation is in infrastructure layer.

use kernel::id::AccountId;

use crate::domain::entity::{
    identity::{Identity, ProfileUpdate},
    session_record::SessionRecord,
};
use crate::domain::value_object::{email::Email, learning_streak::LearningStreak};
use crate::error::AuthResult;

/// Token and identity returned by a successful factor
#[derive(Debug, Clone, PartialEq)]
pub struct AuthGrant {
    pub token: String,
    pub identity: Identity,
}

/// Result of a password attempt
#[derive(Debug, Clone, PartialEq)]
pub enum PasswordAuthOutcome {
    Authenticated(AuthGrant),
    /// Password accepted, a second factor is required
    MfaRequired { mfa_id: String },
}

/// Authentication endpoints of the backend
#[trait_variant::make(AuthBackend: Send)]
pub trait LocalAuthBackend {
    /// Primary factor
    async fn auth_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> AuthResult<PasswordAuthOutcome>;

    /// Email a one-time code; returns the OTP id
    async fn request_otp(&self, email: &Email) -> AuthResult<String>;

    /// Second factor (or passwordless login when `mfa_id` is `None`)
    async fn auth_with_otp(
        &self,
        otp_id: &str,
        code: &str,
        mfa_id: Option<&str>,
    ) -> AuthResult<AuthGrant>;

    /// Re-validate a stored token
    async fn refresh(&self, token: &str) -> AuthResult<AuthGrant>;
}

/// Account records
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Identity>>;

    /// Persist streak counter and last login; returns the stored identity
    async fn update_streak(
        &self,
        account_id: &AccountId,
        streak: &LearningStreak,
    ) -> AuthResult<Identity>;

    async fn update_profile(
        &self,
        account_id: &AccountId,
        update: &ProfileUpdate,
    ) -> AuthResult<Identity>;
}

/// Session records
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Session of this account on this device, active or not
    async fn find_by_device(
        &self,
        account_id: &AccountId,
        device: &str,
    ) -> AuthResult<Option<SessionRecord>>;

    async fn find_by_token(
        &self,
        account_id: &AccountId,
        token_digest: &str,
    ) -> AuthResult<Option<SessionRecord>>;

    async fn create(&self, record: &SessionRecord) -> AuthResult<()>;

    async fn update(&self, record: &SessionRecord) -> AuthResult<()>;

    /// Newest activity first
    async fn list_for_account(&self, account_id: &AccountId) -> AuthResult<Vec<SessionRecord>>;
}
