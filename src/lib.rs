//! Token Validator Library
//!
//! Multi-network token address validation:
//! - EVM (Base, Ethereum, Base Sepolia): ERC-20 metadata via `eth_call`
//! - Solana (mainnet, devnet): SPL mint accounts via `getAccountInfo`
//! - RPC failover across provider rosters, then off-chain enrichment and a
//!   known-token cache when every provider is down
//! - Token-list cross-reference and per-network health probes

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{BatchCoordinator, TokenValidator};
pub use models::config::{BatchPacing, ValidatorConfig};
pub use models::errors::{AppError, AppResult, ErrorKind};
pub use models::types::{
    KnownTokenEntry, MarketSnapshot, MetadataSource, NetworkFamily, NetworkHealth, NetworkId,
    ProviderEndpoint, TokenListCheck, TokenListEntry, TokenMetadata, TokenStandard,
    ValidateOptions, ValidationError, ValidationRequest, ValidationResult,
};
pub use providers::{
    Enrichment, HttpTransport, JsonTransport, MetadataEnrichmentChain, ResolvedToken, Resolver,
};
pub use utils::cache::{CacheStats, KnownTokenCache};
