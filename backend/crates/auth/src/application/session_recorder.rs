//! Session Recorder
//!
//! Keeps one session record per (account, device) with the encrypted
//! network origin of the latest login.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{AccountId, SessionId};
use platform::cipher::OriginCipher;
use platform::client::{ClientFingerprint, IpResolver};
use platform::crypto::token_digest;

use crate::application::config::AuthConfig;
use crate::domain::entity::session_record::SessionRecord;
use crate::domain::repository::SessionRepository;
use crate::error::AuthResult;

/// Session as shown in the session list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub id: SessionId,
    pub device: String,
    /// Decrypted origin, `"unknown"` when it cannot be read
    pub origin: String,
    pub last_active: DateTime<Utc>,
    pub active: bool,
    /// Created by the token of the caller
    pub current: bool,
}

pub struct SessionRecorder<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    cipher: OriginCipher,
    ip_resolver: Arc<IpResolver>,
}

impl<S> SessionRecorder<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: &AuthConfig, ip_resolver: Arc<IpResolver>) -> Self {
        Self {
            session_repo,
            cipher: config.origin_cipher(),
            ip_resolver,
        }
    }

    /// Create or refresh the record for this device
    pub async fn record_login(
        &self,
        account_id: &AccountId,
        token: &str,
        fingerprint: &ClientFingerprint,
        now: DateTime<Utc>,
    ) -> AuthResult<SessionRecord> {
        let device = fingerprint.device_label();
        let origin = self.ip_resolver.resolve(fingerprint.ip).await;
        let encrypted_origin = self.cipher.encrypt(&origin)?;
        let digest = token_digest(token);

        match self.session_repo.find_by_device(account_id, &device).await? {
            Some(mut record) => {
                record.refresh(encrypted_origin, digest, now);
                self.session_repo.update(&record).await?;
                tracing::info!(
                    account_id = %account_id,
                    session_id = %record.id,
                    device = %device,
                    "Session refreshed"
                );
                Ok(record)
            }
            None => {
                let record =
                    SessionRecord::new(account_id.clone(), device, encrypted_origin, digest, now);
                self.session_repo.create(&record).await?;
                tracing::info!(
                    account_id = %account_id,
                    session_id = %record.id,
                    device = %record.device,
                    "Session created"
                );
                Ok(record)
            }
        }
    }

    /// Mark the session opened with `token` inactive. Returns whether one
    /// was found.
    pub async fn record_logout(&self, account_id: &AccountId, token: &str) -> AuthResult<bool> {
        let digest = token_digest(token);
        let Some(mut record) = self.session_repo.find_by_token(account_id, &digest).await? else {
            tracing::debug!(account_id = %account_id, "No session record for token");
            return Ok(false);
        };

        record.deactivate();
        self.session_repo.update(&record).await?;
        tracing::info!(
            account_id = %account_id,
            session_id = %record.id,
            "Session deactivated"
        );
        Ok(true)
    }

    pub async fn list_sessions(
        &self,
        account_id: &AccountId,
        current_token: Option<&str>,
    ) -> AuthResult<Vec<SessionView>> {
        let current = current_token.map(token_digest);
        let records = self.session_repo.list_for_account(account_id).await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let origin = self
                    .cipher
                    .decrypt(&record.encrypted_origin)
                    .unwrap_or_else(|e| {
                        tracing::warn!(session_id = %record.id, error = %e, "Unreadable session origin");
                        "unknown".to_string()
                    });
                SessionView {
                    current: current.as_deref() == Some(record.token_digest.as_str()),
                    id: record.id,
                    device: record.device,
                    origin,
                    last_active: record.last_active,
                    active: record.active,
                }
            })
            .collect())
    }
}
