//! Solana Provider Module
//!
//! Reads SPL mint accounts through `getAccountInfo` (jsonParsed encoding).
//!
//! A mint is accepted only when:
//! 1. the account exists
//! 2. its owner is the SPL Token program
//! 3. the parsed account type is `mint`
//!
//! Name and symbol are not stored on the mint account, so a successful read
//! carries placeholder values until the validator fills them in.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::rpc::{ProviderRoster, RpcPolicy, RpcResilienceLayer};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{MetadataSource, NetworkId, TokenMetadata, TokenStandard};
use crate::utils::constants::{
    NATIVE_SOL_MINT, PLACEHOLDER_TOKEN_NAME, PLACEHOLDER_TOKEN_SYMBOL, TOKEN_PROGRAM,
};

// ============================================
// SOLANA RPC TYPES
// ============================================

/// `getAccountInfo` result
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfoResponse {
    pub value: Option<SolanaAccountInfo>,
}

/// Solana account info
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolanaAccountInfo {
    #[serde(default)]
    pub lamports: u64,
    pub owner: String,
    pub data: AccountData,
    #[serde(default)]
    pub executable: bool,
}

/// Account data (parsed, or raw when the node has no parser for the program)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AccountData {
    Parsed(ParsedAccountData),
    Raw(serde_json::Value),
}

/// Parsed account data
#[derive(Debug, Clone, Deserialize)]
pub struct ParsedAccountData {
    pub program: String,
    pub parsed: ParsedAccount,
    #[serde(default)]
    pub space: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedAccount {
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub info: serde_json::Value,
}

/// Mint fields of a parsed SPL mint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintInfo {
    pub decimals: u8,
    pub supply: String,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    #[serde(default)]
    pub is_initialized: bool,
}

// ============================================
// MINT READER
// ============================================

pub struct SolanaMintReader {
    roster: Arc<ProviderRoster>,
    rpc: Arc<RpcResilienceLayer>,
    policy: RpcPolicy,
}

impl SolanaMintReader {
    pub fn new(roster: Arc<ProviderRoster>, rpc: Arc<RpcResilienceLayer>, policy: RpcPolicy) -> Self {
        Self { roster, rpc, policy }
    }

    /// Mint metadata with placeholder name/symbol and a warning
    pub async fn read(&self, mint: &str, network: NetworkId) -> AppResult<TokenMetadata> {
        let info = self.read_mint(mint, network).await?;

        let standard = if mint == NATIVE_SOL_MINT {
            TokenStandard::Native
        } else {
            TokenStandard::Spl
        };
        let mut metadata = TokenMetadata::new(
            mint,
            PLACEHOLDER_TOKEN_NAME,
            PLACEHOLDER_TOKEN_SYMBOL,
            info.decimals,
            info.supply,
            standard,
            MetadataSource::OnChain,
        )
        .with_warning("Token name and symbol are not stored on-chain");
        metadata.mint_authority = info.mint_authority;
        metadata.freeze_authority = info.freeze_authority;

        info!(
            "✅ SPL mint {} on {}: {} decimals",
            mint, network, metadata.decimals
        );
        Ok(metadata)
    }

    /// Fetch and check the mint account
    pub async fn read_mint(&self, mint: &str, network: NetworkId) -> AppResult<MintInfo> {
        debug!("🔍 getAccountInfo {} on {}", mint, network);
        let params = serde_json::json!([mint, { "encoding": "jsonParsed" }]);
        let result = self
            .rpc
            .call_network(&self.roster, network, "getAccountInfo", params, self.policy)
            .await?;

        Self::parse_mint(mint, result)
    }

    fn parse_mint(mint: &str, result: serde_json::Value) -> AppResult<MintInfo> {
        let response: AccountInfoResponse = serde_json::from_value(result).map_err(|e| {
            AppError::not_spl_mint(format!("Unreadable account info for {}: {}", mint, e))
        })?;

        let account = response
            .value
            .ok_or_else(|| AppError::not_spl_mint(format!("Account {} not found", mint)))?;

        if account.owner != TOKEN_PROGRAM {
            return Err(AppError::not_spl_mint(format!(
                "Account {} is owned by {}, not the SPL Token program",
                mint, account.owner
            )));
        }

        let parsed = match account.data {
            AccountData::Parsed(data) => data.parsed,
            AccountData::Raw(_) => {
                return Err(AppError::not_spl_mint(format!(
                    "Account {} has no parsed mint data",
                    mint
                )))
            }
        };
        if parsed.account_type != "mint" {
            return Err(AppError::not_spl_mint(format!(
                "Account {} is a {} account, not a mint",
                mint, parsed.account_type
            )));
        }

        serde_json::from_value(parsed.info)
            .map_err(|e| AppError::not_spl_mint(format!("Malformed mint data for {}: {}", mint, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorKind;
    use crate::providers::stub::{rpc_ok, FnTransport};
    use std::collections::HashMap;
    use std::time::Duration;

    const MINT: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    fn reader(transport: Arc<FnTransport>) -> SolanaMintReader {
        let roster = ProviderRoster::with_rosters(
            HashMap::from([(NetworkId::Solana, vec!["http://sol".to_string()])]),
            transport.clone(),
            Duration::from_millis(200),
        );
        SolanaMintReader::new(
            Arc::new(roster),
            Arc::new(RpcResilienceLayer::new(transport, Duration::from_millis(1))),
            RpcPolicy {
                per_provider_timeout: Duration::from_millis(200),
                max_roster_retries: 1,
            },
        )
    }

    fn account(owner: &str, account_type: &str) -> serde_json::Value {
        serde_json::json!({
            "context": { "slot": 250000000 },
            "value": {
                "lamports": 1461600,
                "owner": owner,
                "executable": false,
                "rentEpoch": 18446744073709551615u64,
                "data": {
                    "program": "spl-token",
                    "space": 82,
                    "parsed": {
                        "type": account_type,
                        "info": {
                            "decimals": 6,
                            "supply": "5034943057226",
                            "mintAuthority": "BJE5MMbqXjVwjAF7oxwPYXnTXDyspzZyt4vwenNw5ruG",
                            "freezeAuthority": null,
                            "isInitialized": true
                        }
                    }
                }
            }
        })
    }

    #[tokio::test]
    async fn test_reads_mint() {
        let transport = FnTransport::new(|_, _| rpc_ok(account(TOKEN_PROGRAM, "mint")));
        let meta = reader(transport.clone())
            .read(MINT, NetworkId::Solana)
            .await
            .unwrap();

        assert_eq!(meta.decimals, 6);
        assert_eq!(meta.total_supply, "5034943057226");
        assert_eq!(meta.standard, TokenStandard::Spl);
        assert_eq!(meta.name, PLACEHOLDER_TOKEN_NAME);
        assert!(meta.warning.is_some());
        assert_eq!(
            meta.mint_authority.as_deref(),
            Some("BJE5MMbqXjVwjAF7oxwPYXnTXDyspzZyt4vwenNw5ruG")
        );
        assert!(meta.freeze_authority.is_none());
        assert_eq!(transport.methods(), vec!["getAccountInfo"]);
    }

    #[tokio::test]
    async fn test_foreign_owner_rejected() {
        let transport = FnTransport::new(|_, _| {
            rpc_ok(account("11111111111111111111111111111111", "mint"))
        });
        let err = reader(transport).read(MINT, NetworkId::Solana).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotSplMint);
    }

    #[tokio::test]
    async fn test_token_account_rejected() {
        let transport = FnTransport::new(|_, _| rpc_ok(account(TOKEN_PROGRAM, "account")));
        let err = reader(transport).read(MINT, NetworkId::Solana).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotSplMint);
    }

    #[tokio::test]
    async fn test_missing_account_rejected() {
        let transport = FnTransport::new(|_, _| {
            rpc_ok(serde_json::json!({ "context": { "slot": 1 }, "value": null }))
        });
        let err = reader(transport).read(MINT, NetworkId::Solana).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotSplMint);
    }

    #[tokio::test]
    async fn test_native_mint_standard() {
        let transport = FnTransport::new(|_, _| rpc_ok(account(TOKEN_PROGRAM, "mint")));
        let meta = reader(transport)
            .read(NATIVE_SOL_MINT, NetworkId::Solana)
            .await
            .unwrap();
        assert_eq!(meta.standard, TokenStandard::Native);
    }
}
