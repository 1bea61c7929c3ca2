//! Infrastructure Layer

pub mod pocketbase;

pub use pocketbase::PbLearningRepository;
