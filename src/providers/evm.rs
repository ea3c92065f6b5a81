//! EVM token reader
//!
//! Issues `name()`, `symbol()`, `decimals()` and `totalSupply()` as concurrent
//! `eth_call`s through the resilience layer and decodes them with [`AbiCodec`].
//!
//! RPC failures propagate with their kind so the validator can fall back to
//! enrichment. Empty return data means the address is not an ERC-20.

use alloy_primitives::U256;
use std::sync::Arc;
use tracing::{debug, info};

use super::rpc::{ProviderRoster, RpcPolicy, RpcResilienceLayer};
use crate::models::errors::{AppError, AppResult, ErrorKind};
use crate::models::types::{MetadataSource, NetworkId, TokenMetadata, TokenStandard};
use crate::utils::abi::{AbiCodec, Erc20Call};
use crate::utils::constants::MAX_TOKEN_DECIMALS;

pub struct EvmTokenReader {
    roster: Arc<ProviderRoster>,
    rpc: Arc<RpcResilienceLayer>,
    policy: RpcPolicy,
}

impl EvmTokenReader {
    pub fn new(roster: Arc<ProviderRoster>, rpc: Arc<RpcResilienceLayer>, policy: RpcPolicy) -> Self {
        Self { roster, rpc, policy }
    }

    pub async fn read(&self, address: &str, network: NetworkId) -> AppResult<TokenMetadata> {
        debug!("🔍 Reading ERC-20 metadata for {} on {}", address, network);

        let (name, symbol, decimals, supply) = tokio::join!(
            self.call(address, network, Erc20Call::Name),
            self.call(address, network, Erc20Call::Symbol),
            self.call(address, network, Erc20Call::Decimals),
            self.call(address, network, Erc20Call::TotalSupply),
        );
        let (name, symbol, decimals, supply) = (name?, symbol?, decimals?, supply?);

        let name = Self::decode_text(address, Erc20Call::Name, &name)?;
        let symbol = Self::decode_text(address, Erc20Call::Symbol, &symbol)?;
        let decimals = Self::decode_decimals(address, &decimals)?;
        let total_supply = Self::decode_number(address, Erc20Call::TotalSupply, &supply)?;

        info!(
            "✅ {} ({}) on {}: {} decimals",
            symbol, address, network, decimals
        );

        Ok(TokenMetadata::new(
            address,
            name,
            symbol,
            decimals,
            total_supply.to_string(),
            TokenStandard::Erc20,
            MetadataSource::OnChain,
        ))
    }

    /// Raw return data of one metadata call
    async fn call(&self, address: &str, network: NetworkId, call: Erc20Call) -> AppResult<Vec<u8>> {
        let params = serde_json::json!([
            { "to": address, "data": call.calldata() },
            "latest"
        ]);
        let result = self
            .rpc
            .call_network(&self.roster, network, "eth_call", params, self.policy)
            .await
            .map_err(|e| match e.kind {
                ErrorKind::NotErc20 => AppError::not_erc20(format!(
                    "{} reverted for {}",
                    call.signature(),
                    address
                )),
                _ => e,
            })?;

        let hex_data = result.as_str().ok_or_else(|| {
            AppError::not_erc20(format!("{} returned a non-hex result", call.signature()))
        })?;
        AbiCodec::decode_hex(hex_data)
            .map_err(|e| AppError::not_erc20(format!("{}: {}", call.signature(), e)))
    }

    fn require_data(address: &str, call: Erc20Call, data: &[u8]) -> AppResult<()> {
        if data.is_empty() {
            return Err(AppError::not_erc20(format!(
                "{} returned no data for {}",
                call.signature(),
                address
            )));
        }
        Ok(())
    }

    fn decode_text(address: &str, call: Erc20Call, data: &[u8]) -> AppResult<String> {
        Self::require_data(address, call, data)?;
        let text = AbiCodec::decode_string(data)
            .map_err(|e| AppError::not_erc20(format!("{}: {}", call.signature(), e)))?;
        if text.is_empty() {
            return Err(AppError::invalid_metadata(format!(
                "{} is empty for {}",
                call.signature(),
                address
            )));
        }
        Ok(text)
    }

    fn decode_number(address: &str, call: Erc20Call, data: &[u8]) -> AppResult<U256> {
        Self::require_data(address, call, data)?;
        AbiCodec::decode_uint(data).ok_or_else(|| {
            AppError::not_erc20(format!("{} returned no data for {}", call.signature(), address))
        })
    }

    fn decode_decimals(address: &str, data: &[u8]) -> AppResult<u8> {
        let value = Self::decode_number(address, Erc20Call::Decimals, data)?;
        if value > U256::from(MAX_TOKEN_DECIMALS) {
            return Err(AppError::invalid_metadata(format!(
                "decimals {} outside 0..={}",
                value, MAX_TOKEN_DECIMALS
            )));
        }
        Ok(value.to::<u8>())
    }
}
