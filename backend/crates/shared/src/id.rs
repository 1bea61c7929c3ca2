//! Typed Record IDs
//!
//! The hosted backend assigns every record a short lowercase alphanumeric
//! id. Wrapping them per collection keeps a course id from being passed
//! where an account id is expected.

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

/// Length of ids generated locally (matches the backend's default)
pub const RECORD_ID_LENGTH: usize = 15;

/// Upper bound accepted when parsing ids coming from clients
const RECORD_ID_MAX_LENGTH: usize = 64;

const RECORD_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Error returned when a string is not a usable record id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("Record id cannot be empty")]
    Empty,
    #[error("Record id must be at most {RECORD_ID_MAX_LENGTH} characters")]
    TooLong,
    #[error("Record id may only contain letters, digits, '_' and '-'")]
    InvalidCharacter,
}

/// Record id tagged with the collection it belongs to
///
/// ```
/// use kernel::id::{AccountId, CourseId};
///
/// let account: AccountId = "u1a2b3c4d5e6f7g".parse().unwrap();
/// let course = CourseId::new();
/// assert_eq!(account.as_str(), "u1a2b3c4d5e6f7g");
/// assert_eq!(course.as_str().len(), 15);
/// ```
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Generate a fresh random id
    pub fn new() -> Self {
        let mut rng = rand::rng();
        let value: String = (0..RECORD_ID_LENGTH)
            .map(|_| RECORD_ID_ALPHABET[rng.random_range(0..RECORD_ID_ALPHABET.len())] as char)
            .collect();
        Self::from_backend(value)
    }

    /// Validate an id received from an untrusted source (path, body)
    pub fn parse(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdError::Empty);
        }
        if value.len() > RECORD_ID_MAX_LENGTH {
            return Err(IdError::TooLong);
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IdError::InvalidCharacter);
        }
        Ok(Self::from_backend(value))
    }

    /// Wrap an id returned by the backend (already trusted)
    pub fn from_backend(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::from_backend(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(value).map_err(serde::de::Error::custom)
    }
}

/// Marker types, one per backend collection
pub mod markers {
    pub struct Account;
    pub struct Session;
    pub struct Course;
    pub struct Enrollment;
    pub struct Certificate;
    pub struct Instructor;
}

pub type AccountId = Id<markers::Account>;
pub type SessionId = Id<markers::Session>;
pub type CourseId = Id<markers::Course>;
pub type EnrollmentId = Id<markers::Enrollment>;
pub type CertificateId = Id<markers::Certificate>;
pub type InstructorId = Id<markers::Instructor>;
