//! Value Object Module

pub mod email;
pub mod email_policy;
pub mod learning_streak;
pub mod user_password;
pub mod user_role;
