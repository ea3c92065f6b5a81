//! Metadata enrichment chain
//!
//! Off-chain sources behind one [`Resolver`] interface, tried in a fixed order
//! until one knows the token. A source that errors or times out is logged and
//! skipped; it never aborts the chain.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::coingecko::CoinGeckoResolver;
use super::dexscreener::DexScreenerResolver;
use super::registry::{TokenListFetcher, TokenRegistryResolver};
use super::transport::JsonTransport;
use crate::models::config::ValidatorConfig;
use crate::models::types::{
    MarketSnapshot, MetadataSource, NetworkId, TokenMetadata, TokenStandard,
};

/// Token facts reported by an off-chain source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedToken {
    pub name: String,
    pub symbol: String,
    pub decimals: Option<u8>,
    pub logo_uri: Option<String>,
    pub market: Option<MarketSnapshot>,
}

impl ResolvedToken {
    fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.symbol.trim().is_empty()
    }
}

/// One off-chain metadata source
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Provider label used in `enrichment:<name>`
    fn name(&self) -> &'static str;

    /// `Ok(None)` when the source does not know the token
    async fn resolve(&self, address: &str, network: NetworkId) -> eyre::Result<Option<ResolvedToken>>;
}

/// Result of a successful enrichment
#[derive(Debug, Clone)]
pub struct Enrichment {
    pub provider: String,
    pub token: ResolvedToken,
}

impl Enrichment {
    /// Full metadata for a token whose on-chain read failed.
    /// Missing decimals fall back to the family default and the warning says so.
    pub fn into_metadata(self, address: &str, network: NetworkId) -> TokenMetadata {
        let mut warning = format!(
            "On-chain verification could not be completed; metadata from {}",
            self.provider
        );
        let decimals = match self.token.decimals {
            Some(decimals) => decimals,
            None => {
                let assumed = network.default_decimals();
                warning.push_str(&format!(
                    "; decimals not reported by {}, assumed {}",
                    self.provider, assumed
                ));
                assumed
            }
        };
        let mut metadata = TokenMetadata::new(
            address,
            self.token.name,
            self.token.symbol,
            decimals,
            "0",
            TokenStandard::for_network(network),
            MetadataSource::Enrichment(self.provider.clone()),
        )
        .with_warning(warning);
        metadata.logo_uri = self.token.logo_uri;
        metadata.market = self.token.market;
        metadata
    }

    /// Fill name/symbol of an on-chain read; decimals and supply stay on-chain
    pub fn fill(self, metadata: &mut TokenMetadata) {
        metadata.name = self.token.name;
        metadata.symbol = self.token.symbol;
        if self.token.logo_uri.is_some() {
            metadata.logo_uri = self.token.logo_uri;
        }
        if self.token.market.is_some() {
            metadata.market = self.token.market;
        }
        metadata.enriched_by = Some(self.provider);
        metadata.warning = None;
    }
}

pub struct MetadataEnrichmentChain {
    resolvers: Vec<Arc<dyn Resolver>>,
    timeout: Duration,
}

impl MetadataEnrichmentChain {
    pub fn new(resolvers: Vec<Arc<dyn Resolver>>, timeout: Duration) -> Self {
        Self { resolvers, timeout }
    }

    /// Registry, then DEX pairs, then market data
    pub fn standard(
        transport: Arc<dyn JsonTransport>,
        lists: Arc<TokenListFetcher>,
        config: &ValidatorConfig,
    ) -> Self {
        Self::new(
            vec![
                Arc::new(TokenRegistryResolver::new(lists)),
                Arc::new(DexScreenerResolver::new(transport.clone())),
                Arc::new(CoinGeckoResolver::new(
                    transport,
                    config.coingecko_api_key.clone(),
                )),
            ],
            config.enrichment_timeout,
        )
    }

    /// Chain with no sources; every resolve is a miss
    pub fn disabled() -> Self {
        Self::new(Vec::new(), Duration::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// First source that knows the token, in order
    pub async fn resolve(&self, address: &str, network: NetworkId) -> Option<Enrichment> {
        for resolver in &self.resolvers {
            let provider = resolver.name();
            debug!("🔎 Enrichment: asking {} about {} on {}", provider, address, network);

            match tokio::time::timeout(self.timeout, resolver.resolve(address, network)).await {
                Ok(Ok(Some(token))) if token.is_complete() => {
                    info!(
                        "✅ Enrichment: {} resolved {} ({})",
                        provider, token.symbol, address
                    );
                    return Some(Enrichment {
                        provider: provider.to_string(),
                        token,
                    });
                }
                Ok(Ok(Some(_))) => {
                    debug!("📭 Enrichment: {} returned an incomplete record", provider);
                }
                Ok(Ok(None)) => {
                    debug!("📭 Enrichment: {} does not know {}", provider, address);
                }
                Ok(Err(e)) => {
                    warn!("⚠️ Enrichment: {} failed: {}", provider, e);
                }
                Err(_) => {
                    warn!(
                        "⏱️ Enrichment: {} timed out after {}ms",
                        provider,
                        self.timeout.as_millis()
                    );
                }
            }
        }

        warn!("❌ Enrichment exhausted for {} on {}", address, network);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::stub::FnTransport;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Script {
        Knows(&'static str),
        Unknown,
        Fails,
        Hangs,
    }

    struct ScriptedResolver {
        name: &'static str,
        script: Script,
        calls: AtomicUsize,
    }

    impl ScriptedResolver {
        fn new(name: &'static str, script: Script) -> Arc<Self> {
            Arc::new(Self {
                name,
                script,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Resolver for ScriptedResolver {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn resolve(&self, _address: &str, _network: NetworkId) -> eyre::Result<Option<ResolvedToken>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script {
                Script::Knows(symbol) => Ok(Some(ResolvedToken {
                    name: format!("{} Token", symbol),
                    symbol: symbol.to_string(),
                    decimals: Some(6),
                    ..Default::default()
                })),
                Script::Unknown => Ok(None),
                Script::Fails => Err(eyre::eyre!("HTTP error: 500")),
                Script::Hangs => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(None)
                }
            }
        }
    }

    const MINT: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    #[tokio::test]
    async fn test_failures_do_not_abort_chain() {
        let first = ScriptedResolver::new("first", Script::Fails);
        let second = ScriptedResolver::new("second", Script::Hangs);
        let third = ScriptedResolver::new("third", Script::Knows("SAMO"));
        let fourth = ScriptedResolver::new("fourth", Script::Knows("NOPE"));
        let chain = MetadataEnrichmentChain::new(
            vec![first.clone(), second.clone(), third.clone(), fourth.clone()],
            Duration::from_millis(50),
        );

        let found = chain.resolve(MINT, NetworkId::Solana).await.unwrap();
        assert_eq!(found.provider, "third");
        assert_eq!(found.token.symbol, "SAMO");
        assert_eq!(fourth.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exhausted_chain() {
        let chain = MetadataEnrichmentChain::new(
            vec![ScriptedResolver::new("only", Script::Unknown)],
            Duration::from_millis(50),
        );
        assert!(chain.resolve(MINT, NetworkId::Solana).await.is_none());
        assert!(MetadataEnrichmentChain::disabled()
            .resolve(MINT, NetworkId::Solana)
            .await
            .is_none());
    }

    #[test]
    fn test_into_metadata_tags_source() {
        let enrichment = Enrichment {
            provider: "dexscreener".to_string(),
            token: ResolvedToken {
                name: "Samoyed Coin".to_string(),
                symbol: "SAMO".to_string(),
                decimals: None,
                ..Default::default()
            },
        };
        let meta = enrichment.clone().into_metadata(MINT, NetworkId::Solana);
        assert_eq!(meta.source.label(), "enrichment:dexscreener");
        assert_eq!(meta.decimals, 9);
        assert_eq!(meta.standard, TokenStandard::Spl);
        let warning = meta.warning.unwrap();
        assert!(warning.contains("On-chain verification"));
        assert!(warning.contains("decimals not reported by dexscreener, assumed 9"));

        let evm = enrichment.into_metadata("0x532f27101965dd16442e59d40670faf5ebb142e4", NetworkId::Base);
        assert_eq!(evm.decimals, 18);
        assert!(evm.warning.unwrap().contains("assumed 18"));
    }

    #[test]
    fn test_reported_decimals_are_not_flagged() {
        let meta = Enrichment {
            provider: "token-registry".to_string(),
            token: ResolvedToken {
                name: "Samoyed Coin".to_string(),
                symbol: "SAMO".to_string(),
                decimals: Some(9),
                ..Default::default()
            },
        }
        .into_metadata(MINT, NetworkId::Solana);
        assert_eq!(meta.decimals, 9);
        assert!(!meta.warning.unwrap().contains("assumed"));
    }

    #[test]
    fn test_standard_chain_order() {
        let transport = FnTransport::new(|_, _| Ok(serde_json::Value::Null));
        let lists = Arc::new(TokenListFetcher::new(transport.clone(), Duration::from_secs(60)));
        let chain = MetadataEnrichmentChain::standard(transport, lists, &ValidatorConfig::default());
        assert_eq!(
            chain.provider_names(),
            vec!["token-registry", "dexscreener", "coingecko"]
        );
        assert!(MetadataEnrichmentChain::disabled().provider_names().is_empty());
    }

    #[test]
    fn test_fill_keeps_on_chain_fields() {
        let mut meta = TokenMetadata::new(
            MINT,
            "Unknown Token",
            "UNKNOWN",
            9,
            "42",
            TokenStandard::Spl,
            MetadataSource::OnChain,
        )
        .with_warning("placeholder");
        Enrichment {
            provider: "token-registry".to_string(),
            token: ResolvedToken {
                name: "Samoyed Coin".to_string(),
                symbol: "SAMO".to_string(),
                decimals: Some(6),
                ..Default::default()
            },
        }
        .fill(&mut meta);

        assert_eq!(meta.symbol, "SAMO");
        assert_eq!(meta.decimals, 9);
        assert_eq!(meta.total_supply, "42");
        assert_eq!(meta.source, MetadataSource::OnChain);
        assert_eq!(meta.enriched_by.as_deref(), Some("token-registry"));
        assert!(meta.warning.is_none());
    }
}
