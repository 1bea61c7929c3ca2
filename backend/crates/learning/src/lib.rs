//! Learning Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Courses, enrollments, certificates, repository traits
//! - `application/` - Enrollment, settings, certificate and admin stores
//! - `infra/` - Hosted backend implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! Stores work on an explicit [`auth::AuthContext`] restored per request
//! by the auth middleware.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


pub use error::{LearningError, LearningResult};
pub use infra::pocketbase::PbLearningRepository;
pub use presentation::router::learning_router;
