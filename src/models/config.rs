//! Runtime configuration for the validator
//!
//! Defaults come from `utils/constants.rs`; every field can be overridden from
//! the environment through [`ValidatorConfig::from_env`].

use std::time::Duration;
use tracing::info;

use super::types::NetworkId;
use crate::utils::constants::{
    build_alchemy_url, get_public_rpc, DEFAULT_ENRICHMENT_TIMEOUT_MS, DEFAULT_MAX_ROSTER_RETRIES,
    DEFAULT_RETRY_DELAY_MS, DEFAULT_RPC_TIMEOUT_MS, DEFAULT_TOKEN_LIST_TIMEOUT_MS,
    DEFAULT_TOKEN_LIST_TTL_SECS,
    EVM_BATCH_DELAY_MS, EVM_BATCH_SIZE, SOLANA_BATCH_DELAY_MS, SOLANA_BATCH_SIZE,
    SOLANA_DEVNET_FALLBACK_RPCS, SOLANA_MAINNET_FALLBACK_RPCS,
};

/// Chunking and pacing for one network family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPacing {
    pub chunk_size: usize,
    pub delay: Duration,
}

/// Validator configuration
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Primary RPC endpoint per network
    pub base_rpc_url: String,
    pub ethereum_rpc_url: String,
    pub base_testnet_rpc_url: String,
    pub solana_rpc_url: String,
    pub solana_devnet_rpc_url: String,
    /// Public fallbacks appended after the Solana primaries
    pub solana_fallback_rpcs: Vec<String>,
    pub solana_devnet_fallback_rpcs: Vec<String>,
    /// Timeout for a single provider attempt
    pub rpc_timeout: Duration,
    /// Number of full roster sweeps
    pub max_roster_retries: u32,
    /// Base delay between sweeps, multiplied by the sweep number
    pub retry_delay: Duration,
    /// Timeout for each enrichment source
    pub enrichment_timeout: Duration,
    /// Timeout for fetching one token list
    pub token_list_timeout: Duration,
    /// Reuse window for fetched token-list documents
    pub token_list_ttl: Duration,
    pub evm_batch: BatchPacing,
    pub solana_batch: BatchPacing,
    pub coingecko_api_key: Option<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            base_rpc_url: get_public_rpc(NetworkId::Base).to_string(),
            ethereum_rpc_url: get_public_rpc(NetworkId::Ethereum).to_string(),
            base_testnet_rpc_url: get_public_rpc(NetworkId::BaseTestnet).to_string(),
            solana_rpc_url: get_public_rpc(NetworkId::Solana).to_string(),
            solana_devnet_rpc_url: get_public_rpc(NetworkId::SolanaDevnet).to_string(),
            solana_fallback_rpcs: SOLANA_MAINNET_FALLBACK_RPCS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            solana_devnet_fallback_rpcs: SOLANA_DEVNET_FALLBACK_RPCS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rpc_timeout: Duration::from_millis(DEFAULT_RPC_TIMEOUT_MS),
            max_roster_retries: DEFAULT_MAX_ROSTER_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            enrichment_timeout: Duration::from_millis(DEFAULT_ENRICHMENT_TIMEOUT_MS),
            token_list_timeout: Duration::from_millis(DEFAULT_TOKEN_LIST_TIMEOUT_MS),
            token_list_ttl: Duration::from_secs(DEFAULT_TOKEN_LIST_TTL_SECS),
            evm_batch: BatchPacing {
                chunk_size: EVM_BATCH_SIZE,
                delay: Duration::from_millis(EVM_BATCH_DELAY_MS),
            },
            solana_batch: BatchPacing {
                chunk_size: SOLANA_BATCH_SIZE,
                delay: Duration::from_millis(SOLANA_BATCH_DELAY_MS),
            },
            coingecko_api_key: None,
        }
    }
}

impl ValidatorConfig {
    /// Build configuration from environment variables.
    ///
    /// EVM primaries resolve as: explicit `*_RPC_URL` > Alchemy URL built from
    /// `ALCHEMY_API_KEY` > public RPC.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        let alchemy_key = Self::get_alchemy_key();

        for network in [NetworkId::Base, NetworkId::Ethereum, NetworkId::BaseTestnet] {
            let url = env_string(Self::rpc_env_key(network)).or_else(|| {
                alchemy_key
                    .as_deref()
                    .and_then(|key| build_alchemy_url(network, key))
            });
            if let Some(url) = url {
                config.set_primary_rpc(network, url);
            }
        }
        for network in [NetworkId::Solana, NetworkId::SolanaDevnet] {
            if let Some(url) = env_string(Self::rpc_env_key(network)) {
                config.set_primary_rpc(network, url);
            }
        }

        if let Some(ms) = env_u64("RPC_TIMEOUT_MS") {
            config.rpc_timeout = Duration::from_millis(ms);
        }
        if let Some(retries) = env_u64("RPC_MAX_RETRIES") {
            config.max_roster_retries = retries.max(1) as u32;
        }
        if let Some(ms) = env_u64("RPC_RETRY_DELAY_MS") {
            config.retry_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("ENRICHMENT_TIMEOUT_MS") {
            config.enrichment_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("TOKEN_LIST_TIMEOUT_MS") {
            config.token_list_timeout = Duration::from_millis(ms);
        }
        if let Some(secs) = env_u64("TOKEN_LIST_TTL_SECS") {
            config.token_list_ttl = Duration::from_secs(secs);
        }
        config.coingecko_api_key = env_string("COINGECKO_API_KEY");

        config
    }

    /// Environment variable holding a network's primary RPC
    pub fn rpc_env_key(network: NetworkId) -> &'static str {
        match network {
            NetworkId::Base => "BASE_RPC_URL",
            NetworkId::Ethereum => "ETHEREUM_RPC_URL",
            NetworkId::BaseTestnet => "BASE_TESTNET_RPC_URL",
            NetworkId::Solana => "SOLANA_RPC_URL",
            NetworkId::SolanaDevnet => "SOLANA_DEVNET_RPC_URL",
        }
    }

    pub fn primary_rpc(&self, network: NetworkId) -> &str {
        match network {
            NetworkId::Base => &self.base_rpc_url,
            NetworkId::Ethereum => &self.ethereum_rpc_url,
            NetworkId::BaseTestnet => &self.base_testnet_rpc_url,
            NetworkId::Solana => &self.solana_rpc_url,
            NetworkId::SolanaDevnet => &self.solana_devnet_rpc_url,
        }
    }

    pub fn set_primary_rpc(&mut self, network: NetworkId, url: impl Into<String>) {
        let url = url.into();
        match network {
            NetworkId::Base => self.base_rpc_url = url,
            NetworkId::Ethereum => self.ethereum_rpc_url = url,
            NetworkId::BaseTestnet => self.base_testnet_rpc_url = url,
            NetworkId::Solana => self.solana_rpc_url = url,
            NetworkId::SolanaDevnet => self.solana_devnet_rpc_url = url,
        }
    }

    /// Public fallbacks for a network (empty for EVM)
    pub fn fallback_rpcs(&self, network: NetworkId) -> &[String] {
        match network {
            NetworkId::Solana => &self.solana_fallback_rpcs,
            NetworkId::SolanaDevnet => &self.solana_devnet_fallback_rpcs,
            _ => &[],
        }
    }

    pub fn batch_pacing(&self, network: NetworkId) -> BatchPacing {
        if network.is_evm() {
            self.evm_batch
        } else {
            self.solana_batch
        }
    }

    /// Alchemy key from the environment. The key itself is never logged.
    fn get_alchemy_key() -> Option<String> {
        let key = env_string("ALCHEMY_API_KEY").filter(|k| k != "YOUR_API_KEY")?;
        info!("🔑 ALCHEMY_API_KEY configured (key hidden)");
        Some(key)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rosters() {
        let config = ValidatorConfig::default();
        assert!(config.primary_rpc(NetworkId::Base).starts_with("https://"));
        assert!(config.fallback_rpcs(NetworkId::Base).is_empty());
        assert!(config.fallback_rpcs(NetworkId::Solana).len() >= 4);
        assert!(config.fallback_rpcs(NetworkId::SolanaDevnet).len() >= 4);
    }

    #[test]
    fn test_batch_pacing_per_family() {
        let config = ValidatorConfig::default();
        assert_eq!(config.batch_pacing(NetworkId::Ethereum).chunk_size, 5);
        assert_eq!(config.batch_pacing(NetworkId::Solana).chunk_size, 3);
        assert!(
            config.batch_pacing(NetworkId::SolanaDevnet).delay
                > config.batch_pacing(NetworkId::Base).delay
        );
    }

    #[test]
    fn test_set_primary_rpc() {
        let mut config = ValidatorConfig::default();
        config.set_primary_rpc(NetworkId::BaseTestnet, "http://localhost:8545");
        assert_eq!(config.primary_rpc(NetworkId::BaseTestnet), "http://localhost:8545");
    }
}
