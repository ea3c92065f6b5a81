//! Utils Module - Pure helpers shared across the crate
//!
//! Address format checks, the ERC-20 ABI codec, the known-token cache and
//! every constant the rest of the crate reads.

pub mod abi;
pub mod address;
pub mod cache;
pub mod constants;

pub use abi::*;
pub use address::*;
pub use cache::*;
pub use constants::*;
