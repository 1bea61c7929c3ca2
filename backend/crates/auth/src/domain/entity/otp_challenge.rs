//! One-time-password challenge
//!
//! Issued by the backend when a second factor is needed; the user answers
//! with the code that was emailed to them.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::domain::value_object::email::Email;

/// What the one-time code is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpPurpose {
    #[display("registration")]
    Registration,
    #[display("login")]
    Login,
}

/// Progress of a second factor for one (email, purpose) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SecondFactorState {
    #[default]
    #[display("idle")]
    Idle,
    #[display("otpRequested")]
    OtpRequested,
    #[display("verified")]
    Verified,
    #[display("failed")]
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub otp_id: String,
    /// Set when the challenge completes an MFA password login
    pub mfa_id: Option<String>,
    pub purpose: OtpPurpose,
    pub email: Email,
    pub requested_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_wire_names() {
        assert_eq!(serde_json::to_string(&OtpPurpose::Registration).unwrap(), "\"registration\"");
        assert_eq!(OtpPurpose::Login.to_string(), "login");
    }
}
