//! Second-Factor Coordinator
//!
//! Tracks pending OTP challenges per (email, purpose):
//! `Idle -> OtpRequested -> Verified | Failed`.
//! A challenge is discarded once verification finishes, either way.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::application::config::AuthConfig;
use crate::domain::entity::otp_challenge::{OtpChallenge, OtpPurpose, SecondFactorState};
use crate::domain::repository::{AuthBackend, AuthGrant, PasswordAuthOutcome};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// Verify OTP input
#[derive(Debug, Clone)]
pub struct VerifyOtpInput {
    pub otp_id: String,
    pub code: String,
    pub email: Email,
    pub purpose: OtpPurpose,
    /// Taken from the pending challenge when omitted
    pub mfa_id: Option<String>,
}

type ChallengeKey = (Email, OtpPurpose);

#[derive(Debug)]
struct Slot {
    state: SecondFactorState,
    challenge: Option<OtpChallenge>,
    changed_at: DateTime<Utc>,
}

/// Second-factor coordinator, shared by all requests
pub struct OtpCoordinator<B>
where
    B: AuthBackend,
{
    backend: Arc<B>,
    config: Arc<AuthConfig>,
    slots: Mutex<HashMap<ChallengeKey, Slot>>,
}

impl<B> OtpCoordinator<B>
where
    B: AuthBackend,
{
    pub fn new(backend: Arc<B>, config: Arc<AuthConfig>) -> Self {
        Self {
            backend,
            config,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<ChallengeKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sweep(&self, slots: &mut HashMap<ChallengeKey, Slot>, now: DateTime<Utc>) {
        let ttl = chrono::Duration::from_std(self.config.otp_challenge_ttl)
            .unwrap_or(chrono::Duration::MAX);
        slots.retain(|_, slot| now.signed_duration_since(slot.changed_at) < ttl);
    }

    /// Current state for the pair; expired entries read as `Idle`
    pub fn state(&self, email: &Email, purpose: OtpPurpose) -> SecondFactorState {
        let mut slots = self.slots();
        self.sweep(&mut slots, Utc::now());
        slots
            .get(&(email.clone(), purpose))
            .map(|slot| slot.state)
            .unwrap_or_default()
    }

    /// Pending challenge for the pair, if any
    pub fn pending(&self, email: &Email, purpose: OtpPurpose) -> Option<OtpChallenge> {
        let mut slots = self.slots();
        self.sweep(&mut slots, Utc::now());
        slots
            .get(&(email.clone(), purpose))
            .and_then(|slot| slot.challenge.clone())
    }

    /// Ask the backend for a code and remember the challenge, replacing any
    /// earlier one for the same pair.
    pub async fn request_otp(
        &self,
        email: &Email,
        purpose: OtpPurpose,
        mfa_id: Option<String>,
    ) -> AuthResult<OtpChallenge> {
        let otp_id = self.backend.request_otp(email).await?;
        let now = Utc::now();

        let challenge = OtpChallenge {
            otp_id,
            mfa_id,
            purpose,
            email: email.clone(),
            requested_at: now,
        };

        {
            let mut slots = self.slots();
            self.sweep(&mut slots, now);
            slots.insert(
                (email.clone(), purpose),
                Slot {
                    state: SecondFactorState::OtpRequested,
                    challenge: Some(challenge.clone()),
                    changed_at: now,
                },
            );
        }

        tracing::info!(
            email = %email,
            purpose = %purpose,
            mfa = challenge.mfa_id.is_some(),
            "OTP requested"
        );

        Ok(challenge)
    }

    /// Submit a code. The backend error is returned unchanged on failure.
    pub async fn verify_otp(&self, input: &VerifyOtpInput) -> AuthResult<AuthGrant> {
        let key = (input.email.clone(), input.purpose);

        let stored = {
            let mut slots = self.slots();
            self.sweep(&mut slots, Utc::now());
            slots.get_mut(&key).and_then(|slot| slot.challenge.take())
        };
        let mfa_id = input
            .mfa_id
            .clone()
            .or_else(|| {
                stored
                    .filter(|c| c.otp_id == input.otp_id)
                    .and_then(|c| c.mfa_id)
            });

        let result = match self
            .backend
            .auth_with_otp(&input.otp_id, &input.code, mfa_id.as_deref())
            .await
        {
            Ok(grant) => Ok(grant),
            Err(err) if self.config.otp_password_fallback => {
                self.password_fallback(&input.email, &input.code)
                    .await
                    .ok_or(err)
            }
            Err(err) => Err(err),
        };

        let state = match &result {
            Ok(_) => SecondFactorState::Verified,
            Err(_) => SecondFactorState::Failed,
        };
        self.slots().insert(
            key,
            Slot {
                state,
                challenge: None,
                changed_at: Utc::now(),
            },
        );

        match &result {
            Ok(grant) => tracing::info!(
                account_id = %grant.identity.id,
                purpose = %input.purpose,
                "OTP verified"
            ),
            Err(e) => tracing::warn!(
                email = %input.email,
                purpose = %input.purpose,
                error = %e,
                "OTP verification failed"
            ),
        }

        result
    }

    /// Code retried as a password; `None` unless that logs the user in.
    async fn password_fallback(&self, email: &Email, code: &str) -> Option<AuthGrant> {
        match self.backend.auth_with_password(email, code).await {
            Ok(PasswordAuthOutcome::Authenticated(grant)) => {
                tracing::info!(email = %email, "OTP code accepted as password");
                Some(grant)
            }
            Ok(PasswordAuthOutcome::MfaRequired { .. }) => None,
            Err(e) => {
                tracing::debug!(email = %email, error = %e, "Password fallback failed");
                None
            }
        }
    }
}
