//! Origin Cipher
//!
//! AES-256-GCM encryption for the network origin (client IP) stored on
//! session records. The key comes from deployment configuration, either as
//! 32 raw bytes (base64) or derived from a passphrase with SHA-256.
//!
//! Output layout: `base64(nonce (12 bytes) || ciphertext || tag)`.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use std::fmt;

use crate::crypto::{from_base64, sha256, to_base64};

const NONCE_LEN: usize = 12;

/// Cipher errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CipherError {
    #[error("Cipher key must be 32 bytes (got {0})")]
    InvalidKeyLength(usize),

    #[error("Cipher key is not valid base64")]
    InvalidKeyEncoding,

    #[error("Ciphertext is malformed")]
    Malformed,

    #[error("Encryption failed")]
    Encrypt,

    #[error("Decryption failed")]
    Decrypt,
}

/// AES-256-GCM cipher bound to one key
#[derive(Clone)]
pub struct OriginCipher {
    cipher: Aes256Gcm,
}

impl OriginCipher {
    pub fn new(key: &[u8; 32]) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Build from a base64-encoded 32 byte key
    pub fn from_base64_key(encoded: &str) -> Result<Self, CipherError> {
        let bytes = from_base64(encoded.trim()).map_err(|_| CipherError::InvalidKeyEncoding)?;
        let key: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CipherError::InvalidKeyLength(bytes.len()))?;
        Ok(Self::new(&key))
    }

    /// Derive the key from an arbitrary passphrase
    pub fn from_passphrase(passphrase: &str) -> Self {
        Self::new(&sha256(passphrase.as_bytes()))
    }

    /// Encrypt with a fresh random nonce
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::Encrypt)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(nonce.as_slice());
        out.extend_from_slice(&ciphertext);
        Ok(to_base64(&out))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, CipherError> {
        let data = from_base64(encoded).map_err(|_| CipherError::Malformed)?;
        if data.len() <= NONCE_LEN {
            return Err(CipherError::Malformed);
        }

        let (nonce, ciphertext) = data.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::Decrypt)?;

        String::from_utf8(plaintext).map_err(|_| CipherError::Malformed)
    }
}

impl fmt::Debug for OriginCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OriginCipher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_then_decrypt() {
        let cipher = OriginCipher::new(&[7u8; 32]);
        let sealed = cipher.encrypt("203.0.113.9").unwrap();
        assert!(!sealed.contains("203.0.113.9"));
        assert_eq!(cipher.decrypt(&sealed).unwrap(), "203.0.113.9");
    }

    #[test]
    fn test_nonce_is_fresh_per_call() {
        let cipher = OriginCipher::from_passphrase("deployment secret");
        let a = cipher.encrypt("198.51.100.1").unwrap();
        let b = cipher.encrypt("198.51.100.1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = OriginCipher::from_passphrase("one")
            .encrypt("10.0.0.1")
            .unwrap();
        let result = OriginCipher::from_passphrase("two").decrypt(&sealed);
        assert_eq!(result, Err(CipherError::Decrypt));
    }

    #[test]
    fn test_tampered_or_short_input_is_rejected() {
        let cipher = OriginCipher::new(&[1u8; 32]);
        assert_eq!(cipher.decrypt("AAAA"), Err(CipherError::Malformed));
        assert_eq!(cipher.decrypt("not base64!"), Err(CipherError::Malformed));

        let sealed = cipher.encrypt("10.0.0.1").unwrap();
        let mut bytes = from_base64(&sealed).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert_eq!(cipher.decrypt(&to_base64(&bytes)), Err(CipherError::Decrypt));
    }

    #[test]
    fn test_base64_key() {
        let key = to_base64(&[9u8; 32]);
        assert!(OriginCipher::from_base64_key(&key).is_ok());
        assert_eq!(
            OriginCipher::from_base64_key(&to_base64(&[9u8; 16])).unwrap_err(),
            CipherError::InvalidKeyLength(16)
        );
        assert_eq!(
            OriginCipher::from_base64_key("%%%").unwrap_err(),
            CipherError::InvalidKeyEncoding
        );
    }
}
