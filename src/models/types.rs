//! Core data model for token validation
//!
//! Every request flows through these types: a [`ValidationRequest`] goes in,
//! a [`ValidationResult`] comes out, and a successful result always carries a
//! fully populated [`TokenMetadata`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::errors::{AppError, ErrorKind};
use crate::utils::constants::{
    CHAIN_ID_BASE, CHAIN_ID_BASE_SEPOLIA, CHAIN_ID_ETHEREUM, MAX_TOKEN_DECIMALS,
};

// ============================================
// NETWORKS
// ============================================

/// Supported networks. Closed set: anything else is `UnsupportedNetwork`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkId {
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "ethereum")]
    Ethereum,
    #[serde(rename = "base-testnet")]
    BaseTestnet,
    #[serde(rename = "solana")]
    Solana,
    #[serde(rename = "solana-devnet")]
    SolanaDevnet,
}

/// RPC dialect spoken by a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkFamily {
    Evm,
    Solana,
}

/// Static per-network facts
#[derive(Debug, Clone, Copy)]
pub struct NetworkSpec {
    pub family: NetworkFamily,
    /// EIP-155 chain id (EVM only)
    pub chain_id: Option<u64>,
    pub display_name: &'static str,
    /// DexScreener chain slug
    pub dexscreener_chain: &'static str,
    /// CoinGecko asset platform (mainnets only)
    pub coingecko_platform: Option<&'static str>,
    pub is_testnet: bool,
}

impl NetworkId {
    pub const ALL: [NetworkId; 5] = [
        NetworkId::Base,
        NetworkId::Ethereum,
        NetworkId::BaseTestnet,
        NetworkId::Solana,
        NetworkId::SolanaDevnet,
    ];

    /// Lookup table replacing string comparisons on network names
    pub fn spec(&self) -> NetworkSpec {
        match self {
            Self::Base => NetworkSpec {
                family: NetworkFamily::Evm,
                chain_id: Some(CHAIN_ID_BASE),
                display_name: "Base",
                dexscreener_chain: "base",
                coingecko_platform: Some("base"),
                is_testnet: false,
            },
            Self::Ethereum => NetworkSpec {
                family: NetworkFamily::Evm,
                chain_id: Some(CHAIN_ID_ETHEREUM),
                display_name: "Ethereum",
                dexscreener_chain: "ethereum",
                coingecko_platform: Some("ethereum"),
                is_testnet: false,
            },
            Self::BaseTestnet => NetworkSpec {
                family: NetworkFamily::Evm,
                chain_id: Some(CHAIN_ID_BASE_SEPOLIA),
                display_name: "Base Sepolia",
                dexscreener_chain: "base",
                coingecko_platform: None,
                is_testnet: true,
            },
            Self::Solana => NetworkSpec {
                family: NetworkFamily::Solana,
                chain_id: None,
                display_name: "Solana",
                dexscreener_chain: "solana",
                coingecko_platform: Some("solana"),
                is_testnet: false,
            },
            Self::SolanaDevnet => NetworkSpec {
                family: NetworkFamily::Solana,
                chain_id: None,
                display_name: "Solana Devnet",
                dexscreener_chain: "solana",
                coingecko_platform: None,
                is_testnet: true,
            },
        }
    }

    pub fn family(&self) -> NetworkFamily {
        self.spec().family
    }

    pub fn is_evm(&self) -> bool {
        self.family() == NetworkFamily::Evm
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Ethereum => "ethereum",
            Self::BaseTestnet => "base-testnet",
            Self::Solana => "solana",
            Self::SolanaDevnet => "solana-devnet",
        }
    }

    /// Canonical form of an address on this network (EVM is case-insensitive)
    pub fn normalize_address(&self, address: &str) -> String {
        match self.family() {
            NetworkFamily::Evm => address.to_lowercase(),
            NetworkFamily::Solana => address.to_string(),
        }
    }

    /// Compare two addresses with this network's case rules
    pub fn same_address(&self, a: &str, b: &str) -> bool {
        match self.family() {
            NetworkFamily::Evm => a.eq_ignore_ascii_case(b),
            NetworkFamily::Solana => a == b,
        }
    }

    /// Fallback decimals when an off-chain source omits them
    pub fn default_decimals(&self) -> u8 {
        match self.family() {
            NetworkFamily::Evm => 18,
            NetworkFamily::Solana => 9,
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(Self::Base),
            "ethereum" => Ok(Self::Ethereum),
            "base-testnet" => Ok(Self::BaseTestnet),
            "solana" => Ok(Self::Solana),
            "solana-devnet" => Ok(Self::SolanaDevnet),
            other => Err(AppError::unsupported_network(other)),
        }
    }
}

// ============================================
// REQUESTS
// ============================================

/// A single validation request as received at the boundary.
///
/// `network` stays the raw string so that an unknown network can be reported
/// per item instead of failing a whole batch at deserialization time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub address: String,
    pub network: String,
}

impl ValidationRequest {
    pub fn new(address: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            network: network.into(),
        }
    }

    pub fn network_id(&self) -> Result<NetworkId, AppError> {
        self.network.parse()
    }
}

/// Per-call switches for `Validate`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateOptions {
    /// Run the token-list cross-reference after a successful validation
    #[serde(default)]
    pub check_token_lists: bool,
}

// ============================================
// METADATA
// ============================================

/// Token standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStandard {
    #[serde(rename = "ERC-20")]
    Erc20,
    #[serde(rename = "SPL")]
    Spl,
    #[serde(rename = "native")]
    Native,
}

impl TokenStandard {
    pub fn for_network(network: NetworkId) -> Self {
        match network.family() {
            NetworkFamily::Evm => Self::Erc20,
            NetworkFamily::Solana => Self::Spl,
        }
    }
}

/// Where the metadata came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSource {
    OnChain,
    KnownCache,
    Enrichment(String),
}

impl MetadataSource {
    pub fn label(&self) -> String {
        match self {
            Self::OnChain => "on-chain".to_string(),
            Self::KnownCache => "known-cache".to_string(),
            Self::Enrichment(provider) => format!("enrichment:{}", provider),
        }
    }
}

impl Serialize for MetadataSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

/// Market data attached by off-chain sources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub price_usd: Option<f64>,
    pub volume_24h_usd: Option<f64>,
    pub market_cap_usd: Option<f64>,
}

/// Entry of a published token list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListEntry {
    #[serde(alias = "mint")]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(default, rename = "logoURI", skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
}

/// Canonical token metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Raw supply in base units, as a decimal string
    pub total_supply: String,
    pub standard: TokenStandard,
    pub is_verified: bool,
    pub source: MetadataSource,
    pub observed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint_authority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freeze_authority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    /// Provider that filled name/symbol for an on-chain read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enriched_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<MarketSnapshot>,
    /// Token list record attached by the cross-reference step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_list: Option<TokenListEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl TokenMetadata {
    pub fn new(
        address: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        total_supply: impl Into<String>,
        standard: TokenStandard,
        source: MetadataSource,
    ) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            total_supply: total_supply.into(),
            standard,
            is_verified: false,
            source,
            observed_at: Utc::now(),
            mint_authority: None,
            freeze_authority: None,
            logo_uri: None,
            enriched_by: None,
            market: None,
            token_list: None,
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    /// Structural sanity: decimals in range and non-empty name/symbol
    pub fn check(&self) -> Result<(), AppError> {
        if self.decimals > MAX_TOKEN_DECIMALS {
            return Err(AppError::invalid_metadata(format!(
                "decimals {} outside 0..={}",
                self.decimals, MAX_TOKEN_DECIMALS
            )));
        }
        if self.name.trim().is_empty() || self.symbol.trim().is_empty() {
            return Err(AppError::invalid_metadata("empty token name or symbol"));
        }
        Ok(())
    }
}

/// Entry of the known-token cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownTokenEntry {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub verified: bool,
    pub standard: TokenStandard,
    pub last_updated: DateTime<Utc>,
}

// ============================================
// RESULTS
// ============================================

/// Error as surfaced to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<AppError> for ValidationError {
    fn from(err: AppError) -> Self {
        Self {
            kind: err.kind,
            message: err.message,
        }
    }
}

/// Terminal value of a validation. Either `metadata` or `error` is set, never both.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub request: ValidationRequest,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TokenMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ValidationError>,
}

impl ValidationResult {
    /// Successful result. Metadata that fails [`TokenMetadata::check`] becomes
    /// an `InvalidMetadata` failure instead.
    pub fn valid(request: ValidationRequest, metadata: TokenMetadata) -> Self {
        match metadata.check() {
            Ok(()) => Self {
                request,
                is_valid: true,
                metadata: Some(metadata),
                error: None,
            },
            Err(err) => Self::invalid(request, err),
        }
    }

    pub fn invalid(request: ValidationRequest, error: AppError) -> Self {
        Self {
            request,
            is_valid: false,
            metadata: None,
            error: Some(error.into()),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// Outcome of `CheckTokenList`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListCheck {
    pub is_in_list: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_info: Option<TokenListEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ValidationError>,
}

// ============================================
// PROVIDERS
// ============================================

/// Snapshot of one roster endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEndpoint {
    pub url: String,
    pub network: NetworkId,
    pub last_known_healthy: bool,
    pub last_response_time_ms: Option<u64>,
}

/// Outcome of `NetworkHealth`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkHealth {
    pub network: NetworkId,
    pub healthy: bool,
    pub response_time_ms: Option<u64>,
    pub providers: Vec<ProviderEndpoint>,
}
