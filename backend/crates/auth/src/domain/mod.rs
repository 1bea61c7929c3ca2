//! Domain Layer
//!
//! Contains entities, value objects, repository traits and validation.

pub mod entity;
pub mod repository;
pub mod services;
pub mod value_object;

// Re-exports
pub use entity::{identity::Identity, otp_challenge::OtpChallenge, session_record::SessionRecord};
pub use repository::{AccountRepository, AuthBackend, AuthGrant, PasswordAuthOutcome, SessionRepository};
pub use services::{ValidationReport, validate_credentials};
