//! Core Module - Validation orchestration
//!
//! The validator ties readers, fallbacks and caches together; the batch
//! coordinator paces many validations against rate-limited providers.

pub mod batch;
pub mod validator;

pub use batch::*;
pub use validator::*;
