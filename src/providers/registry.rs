//! Token registry resolver
//!
//! First enrichment hop: looks the address up in the network's registry
//! document (Jupiter strict list for Solana, CoinGecko token lists for EVM).
//! Documents are fetched through [`TokenListFetcher`], which the token-list
//! cross-reference shares.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::enrichment::{ResolvedToken, Resolver};
use super::transport::JsonTransport;
use crate::models::types::{NetworkFamily, NetworkId, TokenListEntry};
use crate::utils::cache::{CacheStats, TokenListCache};
use crate::utils::constants::get_token_registry_url;

/// Entries of a token-list style document.
///
/// Accepts a top-level array or an object with a `tokens` array. Entries that
/// do not deserialize are skipped.
pub fn parse_token_entries(document: serde_json::Value) -> Vec<TokenListEntry> {
    let items = match document {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("tokens") {
            Some(serde_json::Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

/// Chain id used by token lists for a network.
/// Solana lists tag clusters as 101 (mainnet-beta) and 103 (devnet).
pub fn list_chain_id(network: NetworkId) -> Option<u64> {
    match network.family() {
        NetworkFamily::Evm => network.spec().chain_id,
        NetworkFamily::Solana => Some(if network.spec().is_testnet { 103 } else { 101 }),
    }
}

/// Entry for `address` on `network`, honouring per-entry chain ids
pub fn find_entry<'a>(
    entries: &'a [TokenListEntry],
    address: &str,
    network: NetworkId,
) -> Option<&'a TokenListEntry> {
    let chain_id = list_chain_id(network);
    entries.iter().find(|entry| {
        let same_chain = match (entry.chain_id, chain_id) {
            (Some(entry_chain), Some(chain)) => entry_chain == chain,
            _ => true,
        };
        same_chain && network.same_address(&entry.address, address)
    })
}

/// Token-list documents over HTTP, parsed once and reused for the cache TTL
pub struct TokenListFetcher {
    transport: Arc<dyn JsonTransport>,
    cache: TokenListCache,
}

impl TokenListFetcher {
    pub fn new(transport: Arc<dyn JsonTransport>, ttl: Duration) -> Self {
        Self {
            transport,
            cache: TokenListCache::new(ttl),
        }
    }

    pub async fn entries(&self, url: &str) -> eyre::Result<Arc<Vec<TokenListEntry>>> {
        if let Some(entries) = self.cache.get(url) {
            return Ok(entries);
        }
        let entries = parse_token_entries(self.transport.get_json(url).await?);
        debug!("📋 Fetched {}: {} entries", url, entries.len());
        Ok(self.cache.insert(url, entries))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

pub struct TokenRegistryResolver {
    lists: Arc<TokenListFetcher>,
}

impl TokenRegistryResolver {
    pub fn new(lists: Arc<TokenListFetcher>) -> Self {
        Self { lists }
    }
}

#[async_trait]
impl Resolver for TokenRegistryResolver {
    fn name(&self) -> &'static str {
        "token-registry"
    }

    async fn resolve(&self, address: &str, network: NetworkId) -> eyre::Result<Option<ResolvedToken>> {
        let Some(url) = get_token_registry_url(network) else {
            debug!("No token registry for {}", network);
            return Ok(None);
        };

        let entries = self.lists.entries(url).await?;

        Ok(find_entry(&entries, address, network).map(|entry| ResolvedToken {
            name: entry.name.clone(),
            symbol: entry.symbol.clone(),
            decimals: entry.decimals,
            logo_uri: entry.logo_uri.clone(),
            market: None,
        }))
    }
}
