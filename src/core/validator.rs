//! Token validator
//!
//! Public operations of the crate:
//! - `validate` / `validate_with_options`: one address on one network
//! - `check_token_list`: token-list membership
//! - `network_health`: concurrent probe of a network's roster
//! - `update_known_token`: the only write path into the known-token cache
//!
//! Flow of a validation:
//! 1. parse the network, then check the address format (no I/O)
//! 2. EVM: read the four ERC-20 calls. Solana: known-token fast path, then the
//!    mint account, then enrichment for name/symbol
//! 3. when RPC fails outright: enrichment chain, then the known-token cache
//! 4. structural check of the metadata, optional token-list cross-reference
//!
//! Errors never escape as `Err`; every outcome is a [`ValidationResult`].

use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::config::ValidatorConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{
    KnownTokenEntry, MetadataSource, NetworkFamily, NetworkHealth, NetworkId, TokenListCheck,
    TokenMetadata, ValidateOptions, ValidationRequest, ValidationResult,
};
use crate::providers::enrichment::MetadataEnrichmentChain;
use crate::providers::evm::EvmTokenReader;
use crate::providers::rpc::{ProviderRoster, RpcPolicy, RpcResilienceLayer};
use crate::providers::registry::TokenListFetcher;
use crate::providers::solana::SolanaMintReader;
use crate::providers::token_list::TokenListCrossReferencer;
use crate::providers::transport::{HttpTransport, JsonTransport};
use crate::utils::address::AddressFormatValidator;
use crate::utils::cache::{CacheStats, KnownTokenCache};

pub struct TokenValidator {
    config: ValidatorConfig,
    roster: Arc<ProviderRoster>,
    evm: EvmTokenReader,
    solana: SolanaMintReader,
    enrichment: MetadataEnrichmentChain,
    known_tokens: KnownTokenCache,
    token_lists: TokenListCrossReferencer,
    lists: Arc<TokenListFetcher>,
}

impl TokenValidator {
    /// Validator over real HTTP
    pub fn new(config: ValidatorConfig) -> eyre::Result<Self> {
        let transport = Arc::new(HttpTransport::new()?);
        Ok(Self::with_transport(config, transport))
    }

    /// Validator over any transport, with the standard enrichment chain and
    /// a seeded known-token cache
    pub fn with_transport(config: ValidatorConfig, transport: Arc<dyn JsonTransport>) -> Self {
        let roster = Arc::new(ProviderRoster::from_config(&config, transport.clone()));
        let rpc = Arc::new(RpcResilienceLayer::new(
            transport.clone(),
            config.retry_delay,
        ));
        let policy = RpcPolicy::from_config(&config);
        let lists = Arc::new(TokenListFetcher::new(transport.clone(), config.token_list_ttl));

        let validator = Self {
            evm: EvmTokenReader::new(roster.clone(), rpc.clone(), policy),
            solana: SolanaMintReader::new(roster.clone(), rpc, policy),
            enrichment: MetadataEnrichmentChain::standard(transport, lists.clone(), &config),
            known_tokens: KnownTokenCache::seeded(),
            token_lists: TokenListCrossReferencer::new(lists.clone(), config.token_list_timeout),
            lists,
            roster,
            config,
        };
        validator.log_enrichment_chain();
        validator
    }

    pub fn with_enrichment(mut self, enrichment: MetadataEnrichmentChain) -> Self {
        self.enrichment = enrichment;
        self.log_enrichment_chain();
        self
    }

    fn log_enrichment_chain(&self) {
        if self.enrichment.is_empty() {
            info!("🔗 Enrichment chain disabled");
        } else {
            info!(
                "🔗 Enrichment chain: {}",
                self.enrichment.provider_names().join(" → ")
            );
        }
    }

    pub fn with_known_tokens(mut self, known_tokens: KnownTokenCache) -> Self {
        self.known_tokens = known_tokens;
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn known_tokens(&self) -> &KnownTokenCache {
        &self.known_tokens
    }

    /// Hit/miss counters of the shared token-list document cache
    pub fn token_list_stats(&self) -> CacheStats {
        self.lists.cache_stats()
    }

    // ============================================
    // VALIDATE
    // ============================================

    pub async fn validate(&self, address: &str, network: &str) -> ValidationResult {
        self.validate_request(
            &ValidationRequest::new(address, network),
            ValidateOptions::default(),
        )
        .await
    }

    pub async fn validate_with_options(
        &self,
        address: &str,
        network: &str,
        options: ValidateOptions,
    ) -> ValidationResult {
        self.validate_request(&ValidationRequest::new(address, network), options)
            .await
    }

    pub async fn validate_request(
        &self,
        request: &ValidationRequest,
        options: ValidateOptions,
    ) -> ValidationResult {
        match self.resolve(request, options).await {
            Ok(metadata) => ValidationResult::valid(request.clone(), metadata),
            Err(e) => {
                debug!("❌ {} on {}: {}", request.address, request.network, e);
                ValidationResult::invalid(request.clone(), e)
            }
        }
    }

    async fn resolve(
        &self,
        request: &ValidationRequest,
        options: ValidateOptions,
    ) -> AppResult<TokenMetadata> {
        let network = Self::check_request(&request.address, &request.network)?;
        let address = request.address.as_str();

        let mut metadata = match network.family() {
            NetworkFamily::Evm => self.resolve_evm(address, network).await?,
            NetworkFamily::Solana => self.resolve_solana(address, network).await?,
        };
        metadata.check()?;

        if options.check_token_lists {
            self.token_lists.cross_reference(&mut metadata, network).await;
        }
        Ok(metadata)
    }

    /// Network first, then address format. Zero I/O.
    fn check_request(address: &str, network: &str) -> AppResult<NetworkId> {
        let network: NetworkId = network.parse()?;
        if !AddressFormatValidator::is_valid(address, network) {
            return Err(AppError::invalid_format(format!(
                "{} is not a valid {} address",
                address, network
            )));
        }
        Ok(network)
    }

    async fn resolve_evm(&self, address: &str, network: NetworkId) -> AppResult<TokenMetadata> {
        match self.evm.read(address, network).await {
            Ok(metadata) => Ok(metadata),
            Err(e) if e.kind.is_upstream_failure() => self.fallback(address, network, e, true).await,
            Err(e) => Err(e),
        }
    }

    async fn resolve_solana(&self, address: &str, network: NetworkId) -> AppResult<TokenMetadata> {
        if let Some(entry) = self.known_tokens.lookup(network, address) {
            info!("⚡ {} served from known-token cache", entry.symbol);
            return Ok(Self::from_known(address, entry));
        }

        match self.solana.read(address, network).await {
            Ok(mut metadata) => {
                match self.enrichment.resolve(address, network).await {
                    Some(enrichment) => enrichment.fill(&mut metadata),
                    None => {
                        warn!("⚠️ No name/symbol source for mint {}, using placeholders", address);
                        metadata.warning = Some(
                            "Token name and symbol could not be resolved; placeholder values returned"
                                .to_string(),
                        );
                    }
                }
                Ok(metadata)
            }
            Err(e) if e.kind.is_upstream_failure() => self.fallback(address, network, e, false).await,
            Err(e) => Err(e),
        }
    }

    /// RPC produced nothing: enrichment, then the known-token cache
    async fn fallback(
        &self,
        address: &str,
        network: NetworkId,
        rpc_error: AppError,
        check_cache: bool,
    ) -> AppResult<TokenMetadata> {
        warn!(
            "🔄 On-chain read failed for {} on {} ({}), trying off-chain sources",
            address, network, rpc_error
        );

        if let Some(enrichment) = self.enrichment.resolve(address, network).await {
            return Ok(enrichment.into_metadata(address, network));
        }

        if check_cache {
            if let Some(entry) = self.known_tokens.lookup(network, address) {
                info!("💾 {} served from known-token cache during outage", entry.symbol);
                return Ok(Self::from_known(address, entry).with_warning(
                    "On-chain verification could not be completed; metadata from known-token cache",
                ));
            }
        }

        if self.enrichment.is_empty() {
            Err(rpc_error)
        } else {
            Err(AppError::enrichment_exhausted(format!(
                "{}; no off-chain source or known token matched {}",
                rpc_error.message, address
            )))
        }
    }

    fn from_known(address: &str, entry: KnownTokenEntry) -> TokenMetadata {
        let mut metadata = TokenMetadata::new(
            address,
            entry.name,
            entry.symbol,
            entry.decimals,
            "0",
            entry.standard,
            MetadataSource::KnownCache,
        );
        metadata.is_verified = entry.verified;
        metadata
    }

    // ============================================
    // TOKEN LISTS
    // ============================================

    pub async fn check_token_list(&self, address: &str, network: &str) -> TokenListCheck {
        match Self::check_request(address, network) {
            Ok(network) => self.token_lists.check(address, network).await,
            Err(e) => TokenListCheck {
                error: Some(e.into()),
                ..Default::default()
            },
        }
    }

    // ============================================
    // NETWORK HEALTH
    // ============================================

    /// Probe every endpoint of the roster concurrently
    pub async fn network_health(&self, network: &str) -> AppResult<NetworkHealth> {
        let network: NetworkId = network.parse()?;
        let endpoints = self.roster.providers(network);

        let probes = join_all(endpoints.iter().map(|endpoint| self.roster.probe(endpoint))).await;
        let response_time_ms = probes
            .iter()
            .find(|(healthy, _)| *healthy)
            .map(|(_, elapsed)| *elapsed);
        let healthy = response_time_ms.is_some();

        info!(
            "🩺 {} health: {}/{} endpoints up",
            network,
            probes.iter().filter(|(h, _)| *h).count(),
            probes.len()
        );

        Ok(NetworkHealth {
            network,
            healthy,
            response_time_ms,
            providers: self.roster.providers(network),
        })
    }

    // ============================================
    // KNOWN TOKENS
    // ============================================

    /// Insert or replace a known-token entry
    pub fn update_known_token(
        &self,
        address: &str,
        network: &str,
        entry: KnownTokenEntry,
    ) -> AppResult<()> {
        let network = Self::check_request(address, network)?;
        self.known_tokens.update(network, address, entry);
        Ok(())
    }
}
