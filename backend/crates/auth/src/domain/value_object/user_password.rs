//! User Password Value Object
//!
//! A password typed by the user. It is only ever forwarded to the hosted
//! backend, never stored or hashed here.
//!
//! ## Security Features
//! - Automatic memory zeroization
//! - Redacted `Debug`
//! - No `Clone`

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Minimum password length (Unicode code points)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Strength rules checked at sign-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    MinLength,
    Uppercase,
    Digit,
    Symbol,
}

impl PasswordRule {
    pub const ALL: [PasswordRule; 4] = [
        PasswordRule::MinLength,
        PasswordRule::Uppercase,
        PasswordRule::Digit,
        PasswordRule::Symbol,
    ];

    pub fn message(&self) -> &'static str {
        match self {
            PasswordRule::MinLength => "Password must be at least 8 characters",
            PasswordRule::Uppercase => "Password must contain at least one uppercase letter",
            PasswordRule::Digit => "Password must contain at least one number",
            PasswordRule::Symbol => "Password must contain at least one special character",
        }
    }

    fn is_satisfied_by(&self, raw: &str) -> bool {
        match self {
            PasswordRule::MinLength => raw.chars().count() >= MIN_PASSWORD_LENGTH,
            PasswordRule::Uppercase => raw.chars().any(char::is_uppercase),
            PasswordRule::Digit => raw.chars().any(|c| c.is_ascii_digit()),
            PasswordRule::Symbol => raw.chars().any(|c| !c.is_alphanumeric()),
        }
    }
}

/// Raw password from user input
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct UserPassword(String);

impl UserPassword {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rules this password breaks, in a stable order
    pub fn violations(&self) -> Vec<PasswordRule> {
        PasswordRule::ALL
            .into_iter()
            .filter(|rule| !rule.is_satisfied_by(&self.0))
            .collect()
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserPassword([REDACTED])")
    }
}

impl From<String> for UserPassword {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}
