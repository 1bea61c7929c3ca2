//! Hosted backend REST client
//!
//! A thin client for a PocketBase-compatible backend-as-a-service:
//! collection CRUD with filter-string queries, plus the password, OTP and
//! refresh endpoints of an auth collection.

pub mod client;
pub mod error;
pub mod filter;
pub mod query;
pub mod time;

pub use client::{AuthResponse, PasswordAuthResponse, PbClient};
pub use error::{BackendError, BackendResult};
pub use filter::Filter;
pub use query::{ListPage, ListQuery};
