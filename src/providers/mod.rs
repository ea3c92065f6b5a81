//! Providers Module - External Data Sources
//!
//! RPC rosters and the resilience layer, the two chain readers, the
//! off-chain enrichment sources and the token-list cross-reference.
//! Everything talks to the outside world through [`transport::JsonTransport`].

pub mod coingecko;
pub mod dexscreener;
pub mod enrichment;
pub mod evm;
pub mod registry;
pub mod rpc;
pub mod solana;
pub mod token_list;
pub mod transport;

#[cfg(test)]
pub(crate) mod stub;

pub use coingecko::CoinGeckoResolver;
pub use dexscreener::DexScreenerResolver;
pub use enrichment::{Enrichment, MetadataEnrichmentChain, ResolvedToken, Resolver};
pub use evm::EvmTokenReader;
pub use registry::TokenRegistryResolver;
pub use rpc::{ProviderRoster, RpcPolicy, RpcResilienceLayer};
pub use solana::SolanaMintReader;
pub use token_list::TokenListCrossReferencer;
pub use transport::{HttpTransport, JsonTransport};
