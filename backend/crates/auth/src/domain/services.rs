//! Domain Services
//!
//! Credential validation run before anything is sent to the backend.

use serde::Serialize;

use crate::domain::value_object::{
    email::Email,
    email_policy::EmailPolicy,
    user_password::UserPassword,
};

/// Field-level validation result, shown next to the form inputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub email_errors: Vec<String>,
    pub password_errors: Vec<String>,
}

impl ValidationReport {
    /// First message, for single-line error displays
    pub fn summary(&self) -> &str {
        self.email_errors
            .iter()
            .chain(self.password_errors.iter())
            .next()
            .map(String::as_str)
            .unwrap_or("Invalid credentials")
    }
}

/// Check an email/password pair against format, provider and strength rules.
pub fn validate_credentials(
    email: &str,
    password: &UserPassword,
    policy: &EmailPolicy,
) -> ValidationReport {
    let email_errors = match Email::parse(email) {
        Ok(email) => match policy.check(&email) {
            Ok(()) => Vec::new(),
            Err(violation) => vec![policy.message(&violation)],
        },
        Err(e) => vec![e.to_string()],
    };

    let password_errors = if password.is_empty() {
        vec!["Password is required".to_string()]
    } else {
        password
            .violations()
            .iter()
            .map(|rule| rule.message().to_string())
            .collect()
    };

    ValidationReport {
        valid: email_errors.is_empty() && password_errors.is_empty(),
        email_errors,
        password_errors,
    }
}
