//! Token list cross-reference
//!
//! Checks an address against the published token lists of its network, in
//! priority order. A list that cannot be fetched is skipped.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::registry::{find_entry, TokenListFetcher};
use crate::models::types::{NetworkId, TokenListCheck, TokenListEntry, TokenMetadata};
use crate::utils::constants::{get_token_lists, TokenListSource};

pub struct TokenListCrossReferencer {
    lists: Arc<TokenListFetcher>,
    timeout: Duration,
}

impl TokenListCrossReferencer {
    pub fn new(lists: Arc<TokenListFetcher>, timeout: Duration) -> Self {
        Self { lists, timeout }
    }

    /// First list containing the address
    pub async fn check(&self, address: &str, network: NetworkId) -> TokenListCheck {
        let lists = get_token_lists(network);
        let mut fetched = 0usize;

        for list in &lists {
            let Some(entries) = self.fetch(list).await else {
                continue;
            };
            fetched += 1;

            if let Some(entry) = find_entry(&entries, address, network) {
                info!("✅ {} found in {}", address, list.name);
                return TokenListCheck {
                    is_in_list: true,
                    list_name: Some(list.name.to_string()),
                    token_info: Some(entry.clone()),
                    error: None,
                };
            }
        }

        if fetched == 0 {
            warn!("⚠️ No token list for {} could be fetched", network);
        }
        debug!("📭 {} not in any {} token list", address, network);
        TokenListCheck::default()
    }

    /// Mark validated metadata as verified when a list contains it
    pub async fn cross_reference(&self, metadata: &mut TokenMetadata, network: NetworkId) {
        let check = self.check(&metadata.address, network).await;
        if check.is_in_list {
            metadata.is_verified = true;
            metadata.token_list = check.token_info;
        }
    }

    async fn fetch(&self, list: &TokenListSource) -> Option<Arc<Vec<TokenListEntry>>> {
        match tokio::time::timeout(self.timeout, self.lists.entries(list.url)).await {
            Ok(Ok(entries)) => {
                debug!("📋 {}: {} entries", list.name, entries.len());
                Some(entries)
            }
            Ok(Err(e)) => {
                warn!("⚠️ Skipping {}: {}", list.name, e);
                None
            }
            Err(_) => {
                warn!("⏱️ Skipping {}: timed out", list.name);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::{MetadataSource, TokenStandard};
    use crate::providers::stub::FnTransport;

    fn referencer(transport: Arc<FnTransport>) -> TokenListCrossReferencer {
        TokenListCrossReferencer::new(
            Arc::new(TokenListFetcher::new(transport, Duration::from_secs(60))),
            Duration::from_secs(1),
        )
    }

    const BASE_USDC: &str = "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913";

    fn superchain_list() -> serde_json::Value {
        serde_json::json!({
            "name": "Superchain Token List",
            "tokens": [
                { "chainId": 8453, "address": "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
                  "name": "USD Coin", "symbol": "USDC", "decimals": 6 },
                { "chainId": 10, "address": "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85",
                  "name": "USD Coin", "symbol": "USDC", "decimals": 6 }
            ]
        })
    }

    #[tokio::test]
    async fn test_match_is_case_insensitive_for_evm() {
        let transport = FnTransport::new(|url, _| {
            if url.contains("optimism.io") {
                Ok(superchain_list())
            } else {
                Err(eyre::eyre!("HTTP error: 404"))
            }
        });
        let referencer = referencer(transport);

        let check = referencer.check(BASE_USDC, NetworkId::Base).await;
        assert!(check.is_in_list);
        assert_eq!(check.list_name.as_deref(), Some("Superchain Token List"));
        assert_eq!(check.token_info.unwrap().decimals, Some(6));
    }

    #[tokio::test]
    async fn test_failed_list_is_skipped() {
        let transport = FnTransport::new(|url, _| {
            if url.contains("optimism.io") {
                Err(eyre::eyre!("connection reset"))
            } else {
                Ok(serde_json::json!({ "tokens": [
                    { "chainId": 8453, "address": BASE_USDC, "name": "USD Coin", "symbol": "USDC" }
                ]}))
            }
        });
        let referencer = referencer(transport.clone());

        let check = referencer.check(BASE_USDC, NetworkId::Base).await;
        assert!(check.is_in_list);
        assert_eq!(check.list_name.as_deref(), Some("CoinGecko Base List"));
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_wrong_chain_is_not_a_match() {
        let transport = FnTransport::new(|_, _| Ok(superchain_list()));
        let referencer = referencer(transport);
        let check = referencer
            .check("0x0b2c639c533813f4aa9d7837caf62653d097ff85", NetworkId::Base)
            .await;
        assert!(!check.is_in_list);
        assert!(check.error.is_none());
    }

    #[tokio::test]
    async fn test_solana_match_is_exact() {
        let mint = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
        let transport = FnTransport::new(move |_, _| {
            Ok(serde_json::json!([{ "address": mint, "chainId": 101, "name": "USD Coin", "symbol": "USDC" }]))
        });
        let referencer = referencer(transport);

        assert!(referencer.check(mint, NetworkId::Solana).await.is_in_list);
        assert!(!referencer
            .check(&mint.to_lowercase(), NetworkId::Solana)
            .await
            .is_in_list);
    }

    #[tokio::test]
    async fn test_cross_reference_sets_verified() {
        let transport = FnTransport::new(|_, _| Ok(superchain_list()));
        let referencer = referencer(transport);
        let mut meta = TokenMetadata::new(
            BASE_USDC,
            "USD Coin",
            "USDC",
            6,
            "1",
            TokenStandard::Erc20,
            MetadataSource::OnChain,
        );

        referencer.cross_reference(&mut meta, NetworkId::Base).await;
        assert!(meta.is_verified);
        assert_eq!(meta.token_list.unwrap().symbol, "USDC");
    }

    #[tokio::test]
    async fn test_lists_reused_across_checks() {
        let transport = FnTransport::new(|_, _| Ok(superchain_list()));
        let referencer = referencer(transport.clone());

        assert!(referencer.check(BASE_USDC, NetworkId::Base).await.is_in_list);
        assert!(referencer.check(BASE_USDC, NetworkId::Base).await.is_in_list);
        assert_eq!(transport.call_count(), 1);
    }
}
