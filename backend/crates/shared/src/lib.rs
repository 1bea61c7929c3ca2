//! Shared Kernel - vocabulary used by every bounded context
//!
//! Only things with the same meaning everywhere live here:
//! - The unified error type ([`error::app_error::AppError`]) and its
//!   classification ([`error::kind::ErrorKind`])
//! - Typed record identifiers ([`id::Id`])

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
