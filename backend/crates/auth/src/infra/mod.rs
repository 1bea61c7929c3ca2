//! Infrastructure Layer
//!
//! Hosted backend implementations of the repository traits.

pub mod pocketbase;

pub use pocketbase::PbAuthRepository;
