//! Email Value Object
//!
//! Represents a syntactically valid, normalized email address.
//! Provider rules live in [`super::email_policy`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

/// Maximum local part length (per RFC 5321)
const LOCAL_PART_MAX_LENGTH: usize = 64;

/// Why a string is not an email address
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EmailError {
    #[error("Email is required")]
    Empty,

    #[error("Email must be at most 254 characters")]
    TooLong,

    #[error("Please enter a valid email address")]
    InvalidFormat,
}

/// Email address value object; deserializing goes through [`Email::parse`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Trim, lower-case and validate
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, EmailError> {
        let email = raw.as_ref().trim().to_lowercase();

        if email.is_empty() {
            return Err(EmailError::Empty);
        }
        if email.len() > EMAIL_MAX_LENGTH {
            return Err(EmailError::TooLong);
        }
        if !Self::is_valid_format(&email) {
            return Err(EmailError::InvalidFormat);
        }

        Ok(Self(email))
    }

    fn is_valid_format(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };

        if local.is_empty() || local.len() > LOCAL_PART_MAX_LENGTH {
            return false;
        }
        if local.chars().any(|c| c.is_whitespace() || c == '@') {
            return false;
        }

        if domain.is_empty() || !domain.contains('.') {
            return false;
        }
        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return false;
        }
        if domain.starts_with(['.', '-']) || domain.ends_with(['.', '-']) {
            return false;
        }
        !domain.contains("..")
    }

    /// Address stored by the backend (assumed already validated)
    pub fn from_backend(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Domain part, e.g. `gmail.com`
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map(|(_, d)| d).unwrap_or("")
    }

    pub fn local_part(&self) -> &str {
        self.0.split_once('@').map(|(l, _)| l).unwrap_or("")
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Email::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Email::parse(raw)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        assert!(Email::parse("user@gmail.com").is_ok());
        assert!(Email::parse("user.name@example.co.jp").is_ok());
        assert!(Email::parse("user+tag@outlook.com").is_ok());
    }

    #[test]
    fn test_email_invalid() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(Email::parse("userexample.com"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::parse("user@"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::parse("@gmail.com"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::parse("user@@gmail.com"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::parse("user@gmail"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::parse("user@gmail..com"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::parse("user@-gmail.com"), Err(EmailError::InvalidFormat));
    }

    #[test]
    fn test_email_too_long() {
        let long = format!("{}@gmail.com", "a".repeat(250));
        assert_eq!(Email::parse(long), Err(EmailError::TooLong));
    }

    #[test]
    fn test_email_normalized() {
        let email = Email::parse("  User@GMail.COM ").unwrap();
        assert_eq!(email.as_str(), "user@gmail.com");
        assert_eq!(email.domain(), "gmail.com");
        assert_eq!(email.local_part(), "user");
    }

    #[test]
    fn test_email_deserialize_validates() {
        let email: Email = serde_json::from_str("\"  User@GMail.COM \"").unwrap();
        assert_eq!(email.as_str(), "user@gmail.com");
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"user@gmail.com\"");

        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());
        assert!(serde_json::from_str::<Email>("\"\"").is_err());
    }
}
