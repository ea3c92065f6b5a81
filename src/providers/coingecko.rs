//! CoinGecko resolver
//!
//! Last enrichment hop: `/coins/{platform}/contract/{address}`. Testnets have
//! no CoinGecko platform and are skipped without a request.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::enrichment::{ResolvedToken, Resolver};
use super::transport::JsonTransport;
use crate::models::types::{MarketSnapshot, NetworkId};
use crate::utils::constants::COINGECKO_BASE_URL;

#[derive(Debug, Deserialize)]
pub struct CoinGeckoCoin {
    pub name: Option<String>,
    pub symbol: Option<String>,
    #[serde(default)]
    pub detail_platforms: HashMap<String, CoinGeckoPlatform>,
    pub image: Option<CoinGeckoImage>,
    pub market_data: Option<CoinGeckoMarketData>,
}

#[derive(Debug, Deserialize)]
pub struct CoinGeckoPlatform {
    pub decimal_place: Option<u8>,
    pub contract_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoinGeckoImage {
    pub small: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoinGeckoMarketData {
    #[serde(default)]
    pub current_price: HashMap<String, f64>,
    #[serde(default)]
    pub total_volume: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap: HashMap<String, f64>,
}

pub struct CoinGeckoResolver {
    transport: Arc<dyn JsonTransport>,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoResolver {
    pub fn new(transport: Arc<dyn JsonTransport>, api_key: Option<String>) -> Self {
        Self {
            transport,
            base_url: COINGECKO_BASE_URL.to_string(),
            api_key,
        }
    }

    fn contract_url(&self, platform: &str, address: &str) -> String {
        let mut url = format!("{}/coins/{}/contract/{}", self.base_url, platform, address);
        if let Some(key) = &self.api_key {
            url.push_str("?x_cg_demo_api_key=");
            url.push_str(key);
        }
        url
    }
}

#[async_trait]
impl Resolver for CoinGeckoResolver {
    fn name(&self) -> &'static str {
        "coingecko"
    }

    async fn resolve(&self, address: &str, network: NetworkId) -> eyre::Result<Option<ResolvedToken>> {
        let Some(platform) = network.spec().coingecko_platform else {
            debug!("No CoinGecko platform for {}", network);
            return Ok(None);
        };

        let url = self.contract_url(platform, &network.normalize_address(address));
        debug!("🦎 CoinGecko: {} on {}", address, platform);
        let coin: CoinGeckoCoin = serde_json::from_value(self.transport.get_json(&url).await?)?;

        let (Some(name), Some(symbol)) = (coin.name, coin.symbol) else {
            return Ok(None);
        };

        let market = coin.market_data.map(|m| MarketSnapshot {
            price_usd: m.current_price.get("usd").copied(),
            volume_24h_usd: m.total_volume.get("usd").copied(),
            market_cap_usd: m.market_cap.get("usd").copied(),
        });

        Ok(Some(ResolvedToken {
            name,
            symbol: symbol.to_uppercase(),
            decimals: coin
                .detail_platforms
                .get(platform)
                .and_then(|p| p.decimal_place),
            logo_uri: coin.image.and_then(|i| i.small),
            market,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::stub::FnTransport;

    const BONK: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

    #[tokio::test]
    async fn test_resolves_contract() {
        let transport = FnTransport::new(|url, _| {
            assert!(url.contains("/coins/solana/contract/"));
            Ok(serde_json::json!({
                "id": "bonk",
                "symbol": "bonk",
                "name": "Bonk",
                "detail_platforms": {
                    "solana": { "decimal_place": 5, "contract_address": BONK }
                },
                "image": { "small": "https://example.com/bonk.png" },
                "market_data": {
                    "current_price": { "usd": 0.0000213 },
                    "total_volume": { "usd": 150000000.0 },
                    "market_cap": { "usd": 1600000000.0 }
                }
            }))
        });
        let resolver = CoinGeckoResolver::new(transport, None);

        let token = resolver.resolve(BONK, NetworkId::Solana).await.unwrap().unwrap();
        assert_eq!(token.name, "Bonk");
        assert_eq!(token.symbol, "BONK");
        assert_eq!(token.decimals, Some(5));
        assert_eq!(token.market.unwrap().price_usd, Some(0.0000213));
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let transport = FnTransport::new(|_, _| Ok(serde_json::json!({ "error": "coin not found" })));
        let resolver = CoinGeckoResolver::new(transport, None);
        assert!(resolver.resolve(BONK, NetworkId::Solana).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_skips_testnets() {
        let transport = FnTransport::new(|_, _| Ok(serde_json::json!({})));
        let resolver = CoinGeckoResolver::new(transport.clone(), None);
        assert!(resolver.resolve(BONK, NetworkId::SolanaDevnet).await.unwrap().is_none());
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_api_key_in_query() {
        let transport = FnTransport::new(|_, _| Ok(serde_json::json!({})));
        let resolver = CoinGeckoResolver::new(transport, Some("demo-key".to_string()));
        assert!(resolver
            .contract_url("base", "0xabc")
            .ends_with("/coins/base/contract/0xabc?x_cg_demo_api_key=demo-key"));
    }
}
