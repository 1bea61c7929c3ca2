//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::{AuthAppState, ClientInfo};
pub use middleware::{AuthMiddlewareState, require_auth_context};
pub use router::{auth_router, auth_router_generic};
