//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::cipher::OriginCipher;
use platform::cookie::CookieConfig;
use platform::retry::RetryPolicy;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

use crate::domain::value_object::email_policy::EmailPolicy;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie carrying the backend token
    pub cookie: CookieConfig,
    /// AES-256 key for network origins stored in session records
    pub origin_key: [u8; 32],
    /// Accepted and rejected email domains
    pub email_policy: EmailPolicy,
    /// Pending OTP challenges older than this are discarded (10 minutes)
    pub otp_challenge_ttl: Duration,
    /// Retry a failed OTP code as a password
    pub otp_password_fallback: bool,
    /// Retry policy for restoring a session at startup
    pub restore_retry: RetryPolicy,
}

fn random_origin_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    key.copy_from_slice(&platform::crypto::random_bytes(32));
    key
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie: CookieConfig::default(),
            origin_key: random_origin_key(),
            email_policy: EmailPolicy::default(),
            otp_challenge_ttl: Duration::from_secs(10 * 60),
            otp_password_fallback: false,
            restore_retry: RetryPolicy::default(),
        }
    }
}

impl AuthConfig {
    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        let mut config = Self::default();
        config.cookie.secure = false;
        config
    }

    pub fn origin_cipher(&self) -> OriginCipher {
        OriginCipher::new(&self.origin_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_origin_key_is_random() {
        let a = AuthConfig::default();
        let b = AuthConfig::default();
        assert_ne!(a.origin_key, [0u8; 32]);
        assert_ne!(a.origin_key, b.origin_key);

        let sealed = a.origin_cipher().encrypt("203.0.113.7").unwrap();
        assert_eq!(a.origin_cipher().decrypt(&sealed).unwrap(), "203.0.113.7");
        assert!(b.origin_cipher().decrypt(&sealed).is_err());
    }
}
