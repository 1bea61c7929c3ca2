//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits, credential rules
//! - `application/` - Use cases and application services
//! - `infra/` - Hosted backend implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Credential validation (email provider policy, password strength)
//! - Password sign-in against the hosted backend, OTP second factor
//! - One session record per account and device, origin stored encrypted
//! - Daily learning streak updated on every login
//! - Session restore with bounded retry
//!
//! ## Session Model
//! - The backend token travels in an HttpOnly cookie
//! - Each request restores an explicit [`AuthContext`]; there is no global
//!   signed-in state

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::context::AuthContext;
pub use error::{AuthError, AuthResult};
pub use infra::pocketbase::PbAuthRepository;
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
