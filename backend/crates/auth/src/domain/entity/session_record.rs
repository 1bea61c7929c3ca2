//! Session Record Entity
//!
//! One record per (account, device). Re-login from the same device updates
//! the record instead of adding another one.

use chrono::{DateTime, Utc};
use kernel::id::{AccountId, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub account_id: AccountId,
    /// "<browser> on <os>"
    pub device: String,
    /// Network origin, AES-256-GCM encrypted (base64 nonce || ciphertext)
    pub encrypted_origin: String,
    /// Digest of the token issued at login
    pub token_digest: String,
    pub last_active: DateTime<Utc>,
    pub active: bool,
    pub created: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(
        account_id: AccountId,
        device: impl Into<String>,
        encrypted_origin: String,
        token_digest: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            account_id,
            device: device.into(),
            encrypted_origin,
            token_digest,
            last_active: now,
            active: true,
            created: now,
        }
    }

    /// New login from the same device
    pub fn refresh(&mut self, encrypted_origin: String, token_digest: String, now: DateTime<Utc>) {
        self.encrypted_origin = encrypted_origin;
        self.token_digest = token_digest;
        self.last_active = now;
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
