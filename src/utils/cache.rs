//! Known-token cache
//!
//! Small authoritative map of well-known mints and contracts. Used as the
//! Solana fast path (names are not stored on-chain) and as the last fallback
//! when both RPC and enrichment fail.
//!
//! Backed by DashMap: lookups take a shard read lock only, writes happen
//! through [`KnownTokenCache::update`] and nowhere else. Read paths never write.
//!
//! [`TokenListCache`] keeps parsed token-list documents for a short TTL so
//! repeated validations do not download the same multi-megabyte list again.

use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::models::types::{KnownTokenEntry, NetworkId, TokenListEntry, TokenStandard};
use crate::utils::constants::NATIVE_SOL_MINT;

/// Seed data: (network, address, name, symbol, decimals, standard)
const SEED_TOKENS: &[(NetworkId, &str, &str, &str, u8, TokenStandard)] = &[
    (NetworkId::Solana, NATIVE_SOL_MINT, "Wrapped SOL", "SOL", 9, TokenStandard::Native),
    (NetworkId::Solana, "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "USD Coin", "USDC", 6, TokenStandard::Spl),
    (NetworkId::Solana, "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", "USDT", "USDT", 6, TokenStandard::Spl),
    (NetworkId::SolanaDevnet, NATIVE_SOL_MINT, "Wrapped SOL", "SOL", 9, TokenStandard::Native),
    (NetworkId::SolanaDevnet, "4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU", "USD Coin (Devnet)", "USDC", 6, TokenStandard::Spl),
    (NetworkId::Base, "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913", "USD Coin", "USDC", 6, TokenStandard::Erc20),
    (NetworkId::Base, "0x4200000000000000000000000000000000000006", "Wrapped Ether", "WETH", 18, TokenStandard::Erc20),
    (NetworkId::Ethereum, "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "USD Coin", "USDC", 6, TokenStandard::Erc20),
    (NetworkId::Ethereum, "0xdac17f958d2ee523a2206206994597c13d831ec7", "Tether USD", "USDT", 6, TokenStandard::Erc20),
    (NetworkId::Ethereum, "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "Wrapped Ether", "WETH", 18, TokenStandard::Erc20),
    (NetworkId::BaseTestnet, "0x036cbd53842c5426634e7929541ec2318f3dcf7e", "USD Coin", "USDC", 6, TokenStandard::Erc20),
];

#[derive(Clone)]
pub struct KnownTokenCache {
    /// (network, normalized address) -> entry
    store: Arc<DashMap<(NetworkId, String), KnownTokenEntry>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for KnownTokenCache {
    fn default() -> Self {
        Self::seeded()
    }
}

impl KnownTokenCache {
    /// Empty cache
    pub fn new() -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Cache pre-loaded with canonical tokens
    pub fn seeded() -> Self {
        let cache = Self::new();
        let now = Utc::now();
        for &(network, address, name, symbol, decimals, standard) in SEED_TOKENS {
            cache.store.insert(
                (network, network.normalize_address(address)),
                KnownTokenEntry {
                    name: name.to_string(),
                    symbol: symbol.to_string(),
                    decimals,
                    verified: true,
                    standard,
                    last_updated: now,
                },
            );
        }
        cache
    }

    pub fn lookup(&self, network: NetworkId, address: &str) -> Option<KnownTokenEntry> {
        let key = (network, network.normalize_address(address));
        match self.store.get(&key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("✅ KNOWN TOKEN HIT: {} on {}", entry.symbol, network);
                Some(entry.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("📭 KNOWN TOKEN MISS: {} on {}", key.1, network);
                None
            }
        }
    }

    /// Insert or replace an entry. `last_updated` is stamped here.
    pub fn update(&self, network: NetworkId, address: &str, mut entry: KnownTokenEntry) {
        entry.last_updated = Utc::now();
        let key = (network, network.normalize_address(address));
        info!("💾 KNOWN TOKEN SET: {} ({}) on {}", entry.symbol, key.1, network);
        self.store.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats::from_counters(
            self.store.len(),
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

impl CacheStats {
    fn from_counters(entries: usize, hits: u64, misses: u64) -> Self {
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        Self {
            entries,
            hits,
            misses,
            hit_rate,
        }
    }
}

// ============================================
// TOKEN LIST DOCUMENTS
// ============================================

#[derive(Clone, Debug)]
struct ListDocument {
    entries: Arc<Vec<TokenListEntry>>,
    fetched_at: Instant,
}

impl ListDocument {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() >= ttl
    }
}

/// Parsed token-list documents keyed by URL. Only successful fetches are stored.
#[derive(Clone)]
pub struct TokenListCache {
    store: Arc<DashMap<String, ListDocument>>,
    ttl: Duration,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl TokenListCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            ttl,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn get(&self, url: &str) -> Option<Arc<Vec<TokenListEntry>>> {
        if let Some(document) = self.store.get(url) {
            if !document.is_expired(self.ttl) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("✅ LIST CACHE HIT: {} ({} entries)", url, document.entries.len());
                return Some(document.entries.clone());
            }
        }

        if self
            .store
            .remove_if(url, |_, document| document.is_expired(self.ttl))
            .is_some()
        {
            debug!("⏰ LIST CACHE EXPIRED: {}", url);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("📭 LIST CACHE MISS: {}", url);
        None
    }

    pub fn insert(&self, url: &str, entries: Vec<TokenListEntry>) -> Arc<Vec<TokenListEntry>> {
        let entries = Arc::new(entries);
        self.store.insert(
            url.to_string(),
            ListDocument {
                entries: entries.clone(),
                fetched_at: Instant::now(),
            },
        );
        entries
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats::from_counters(
            self.store.len(),
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}
