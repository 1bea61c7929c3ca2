//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations used by the bounded contexts:
//! - Cryptographic utilities (SHA-256, Base64, token digests)
//! - AES-256-GCM cipher for network origins stored in session records
//! - Client fingerprinting (user-agent parsing, client IP, public IP lookup)
//! - Cookie management
//! - Bounded retry with exponential backoff
//! - REST client for the hosted backend-as-a-service

pub mod cipher;
pub mod client;
pub mod cookie;
pub mod crypto;
pub mod pocketbase;
pub mod retry;
