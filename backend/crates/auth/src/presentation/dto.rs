//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::session_recorder::SessionView;
use crate::domain::entity::{
    identity::Identity,
    otp_challenge::{OtpChallenge, OtpPurpose},
};

// ============================================================================
// Credentials
// ============================================================================

/// Sign in / validate request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Signed-in user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub username: String,
    pub role: String,
    pub verified: bool,
    pub avatar: String,
    pub bio: String,
    pub position: String,
    pub company: String,
    pub website: String,
    #[serde(rename = "linkedIn")]
    pub linked_in: String,
    pub learning_streak: u32,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&Identity> for UserResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.to_string(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            username: identity.username.clone(),
            role: identity.role.to_string(),
            verified: identity.verified,
            avatar: identity.avatar.clone(),
            bio: identity.bio.clone(),
            position: identity.position.clone(),
            company: identity.company.clone(),
            website: identity.website.clone(),
            linked_in: identity.linked_in.clone(),
            learning_streak: identity.learning_streak,
            last_login: identity.last_login,
        }
    }
}

/// Sign in response
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SignInResponse {
    Authenticated { user: UserResponse },
    #[serde(rename_all = "camelCase")]
    OtpRequired {
        otp_id: String,
        email: String,
        purpose: OtpPurpose,
    },
}

// ============================================================================
// OTP
// ============================================================================

/// OTP request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequestRequest {
    pub email: String,
    pub purpose: OtpPurpose,
}

/// Pending OTP challenge
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpChallengeResponse {
    pub otp_id: String,
    pub email: String,
    pub purpose: OtpPurpose,
}

impl From<&OtpChallenge> for OtpChallengeResponse {
    fn from(challenge: &OtpChallenge) -> Self {
        Self {
            otp_id: challenge.otp_id.clone(),
            email: challenge.email.to_string(),
            purpose: challenge.purpose,
        }
    }
}

/// OTP verify request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpVerifyRequest {
    pub otp_id: String,
    pub code: String,
    pub email: String,
    pub purpose: OtpPurpose,
    #[serde(default)]
    pub mfa_id: Option<String>,
}

// ============================================================================
// Session
// ============================================================================

/// Session status response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    pub user: Option<UserResponse>,
}

/// Session list entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub device: String,
    pub origin: String,
    pub last_active: DateTime<Utc>,
    pub active: bool,
    pub current: bool,
}

impl From<SessionView> for SessionResponse {
    fn from(view: SessionView) -> Self {
        Self {
            id: view.id.into_string(),
            device: view.device,
            origin: view.origin,
            last_active: view.last_active,
            active: view.active,
            current: view.current,
        }
    }
}

// ============================================================================
// Navigation
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRedirectQuery {
    #[serde(default = "default_redirect_path")]
    pub path: String,
}

fn default_redirect_path() -> String {
    crate::application::navigation::LOGIN_PATH.to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRedirectResponse {
    pub redirect: Option<&'static str>,
}
