//! Entity Module

pub mod identity;
pub mod otp_challenge;
pub mod session_record;
