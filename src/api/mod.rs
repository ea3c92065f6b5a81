//! Token Validator HTTP API
//! Thin JSON surface over the validator's public operations

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use routes::create_router;
pub use types::*;
