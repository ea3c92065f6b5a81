//! DexScreener resolver
//!
//! Second enrichment hop. Looks up trading pairs for the token and takes
//! name/symbol from the most liquid pair whose base token is the address.
//! Price and volume of that pair become the market snapshot.
//!
//! API: https://api.dexscreener.com/latest/dex/tokens/{tokenAddress}
//! Free, no API key required

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::enrichment::{ResolvedToken, Resolver};
use super::transport::JsonTransport;
use crate::models::types::{MarketSnapshot, NetworkId};
use crate::utils::constants::DEXSCREENER_BASE_URL;

/// DexScreener API response
#[derive(Debug, Deserialize)]
pub struct DexScreenerResponse {
    #[serde(default)]
    pub pairs: Option<Vec<DexPair>>,
}

/// A trading pair from DexScreener
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexPair {
    /// Chain slug (e.g., "ethereum", "base", "solana")
    pub chain_id: String,
    #[serde(default)]
    pub dex_id: String,
    pub base_token: DexToken,
    pub liquidity: Option<DexLiquidity>,
    /// Price in USD (string in the API)
    pub price_usd: Option<String>,
    pub volume: Option<DexVolume>,
    pub market_cap: Option<f64>,
    pub fdv: Option<f64>,
}

impl DexPair {
    fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
    }

    fn market(&self) -> MarketSnapshot {
        MarketSnapshot {
            price_usd: self.price_usd.as_deref().and_then(|p| p.parse().ok()),
            volume_24h_usd: self.volume.as_ref().and_then(|v| v.h24),
            market_cap_usd: self.market_cap.or(self.fdv),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexToken {
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexLiquidity {
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexVolume {
    pub h24: Option<f64>,
}

pub struct DexScreenerResolver {
    transport: Arc<dyn JsonTransport>,
    base_url: String,
}

impl DexScreenerResolver {
    pub fn new(transport: Arc<dyn JsonTransport>) -> Self {
        Self {
            transport,
            base_url: DEXSCREENER_BASE_URL.to_string(),
        }
    }

    /// Most liquid pair on `network` whose base token is `address`
    fn best_pair(pairs: Vec<DexPair>, address: &str, network: NetworkId) -> Option<DexPair> {
        let chain = network.spec().dexscreener_chain;
        pairs
            .into_iter()
            .filter(|p| p.chain_id.eq_ignore_ascii_case(chain))
            .filter(|p| network.same_address(&p.base_token.address, address))
            .max_by(|a, b| {
                a.liquidity_usd()
                    .partial_cmp(&b.liquidity_usd())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

#[async_trait]
impl Resolver for DexScreenerResolver {
    fn name(&self) -> &'static str {
        "dexscreener"
    }

    async fn resolve(&self, address: &str, network: NetworkId) -> eyre::Result<Option<ResolvedToken>> {
        let url = format!("{}/tokens/{}", self.base_url, address);
        let response: DexScreenerResponse = serde_json::from_value(self.transport.get_json(&url).await?)?;
        let pairs = response.pairs.unwrap_or_default();
        debug!("📊 DexScreener: {} pairs for {}", pairs.len(), address);

        Ok(Self::best_pair(pairs, address, network).map(|pair| {
            debug!(
                "📊 DexScreener: using {} pair (${:.0} liquidity)",
                pair.dex_id,
                pair.liquidity_usd()
            );
            let market = pair.market();
            ResolvedToken {
                name: pair.base_token.name.unwrap_or_default(),
                symbol: pair.base_token.symbol.unwrap_or_default(),
                decimals: pair.base_token.decimals,
                logo_uri: None,
                market: Some(market),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::stub::FnTransport;

    const BRETT: &str = "0x532f27101965dd16442E59d40670FaF5eBB142E4";

    fn pair(chain: &str, base: &str, symbol: &str, liquidity: f64) -> serde_json::Value {
        serde_json::json!({
            "chainId": chain,
            "dexId": "aerodrome",
            "pairAddress": "0x0000000000000000000000000000000000000001",
            "baseToken": { "address": base, "name": format!("{} Token", symbol), "symbol": symbol },
            "quoteToken": { "address": "0x4200000000000000000000000000000000000006", "name": "Wrapped Ether", "symbol": "WETH" },
            "priceUsd": "0.0712",
            "volume": { "h24": 1250000.5 },
            "liquidity": { "usd": liquidity },
            "marketCap": 705000000.0
        })
    }

    #[tokio::test]
    async fn test_picks_most_liquid_matching_pair() {
        let transport = FnTransport::new(|_, _| {
            Ok(serde_json::json!({ "pairs": [
                pair("ethereum", BRETT, "ETHBRETT", 9_000_000.0),
                pair("base", BRETT, "BRETT", 10_000.0),
                pair("base", BRETT, "BRETT", 2_000_000.0),
                pair("base", "0x4200000000000000000000000000000000000006", "WETH", 50_000_000.0)
            ]}))
        });
        let resolver = DexScreenerResolver::new(transport.clone());

        let address = BRETT.to_lowercase();
        let token = resolver
            .resolve(&address, NetworkId::Base)
            .await
            .unwrap()
            .unwrap();
        assert!(transport.urls()[0].ends_with(&format!("/tokens/{}", address)));
        assert_eq!(token.symbol, "BRETT");
        let market = token.market.unwrap();
        assert_eq!(market.price_usd, Some(0.0712));
        assert_eq!(market.volume_24h_usd, Some(1250000.5));
        assert_eq!(market.market_cap_usd, Some(705000000.0));
    }

    #[tokio::test]
    async fn test_no_pairs() {
        let transport = FnTransport::new(|_, _| Ok(serde_json::json!({ "schemaVersion": "1.0.0", "pairs": null })));
        let resolver = DexScreenerResolver::new(transport);
        assert!(resolver.resolve(BRETT, NetworkId::Base).await.unwrap().is_none());
    }
}
