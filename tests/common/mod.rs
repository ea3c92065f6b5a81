//! Shared fixtures for integration tests: a scripted transport and a
//! configuration with short timeouts and local endpoint names.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use token_validator::{BatchPacing, JsonTransport, NetworkId, ValidatorConfig};

pub const BASE_RPC: &str = "http://base.rpc.test";
pub const ETHEREUM_RPC: &str = "http://ethereum.rpc.test";
pub const SOLANA_RPC: &str = "http://solana.rpc.test";
pub const SOLANA_FALLBACK_A: &str = "http://solana-a.rpc.test";
pub const SOLANA_FALLBACK_B: &str = "http://solana-b.rpc.test";

pub const BASE_USDC: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";
pub const SOLANA_USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const SAMO: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

type RpcFn = dyn Fn(&str, &str, &serde_json::Value) -> eyre::Result<serde_json::Value> + Send + Sync;
type GetFn = dyn Fn(&str) -> eyre::Result<serde_json::Value> + Send + Sync;

/// Error object a node returns in place of `result`.
/// Return it from an `on_rpc` handler to answer with a JSON-RPC error.
#[derive(Debug, Clone)]
pub struct RpcFault {
    pub code: i64,
    pub message: String,
}

impl RpcFault {
    pub fn reverted() -> eyre::Report {
        eyre::Report::new(Self {
            code: 3,
            message: "execution reverted".to_string(),
        })
    }
}

impl std::fmt::Display for RpcFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)
    }
}

impl std::error::Error for RpcFault {}

#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    /// JSON-RPC method; `None` for GET requests
    pub method: Option<String>,
}

/// Transport answering JSON-RPC by `(url, method, params)` and GETs by URL.
/// Unscripted requests fail like a dead endpoint.
pub struct StubTransport {
    rpc: Box<RpcFn>,
    get: Box<GetFn>,
    calls: Mutex<Vec<Call>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self {
            rpc: Box::new(|url, _, _| Err(eyre::eyre!("connection refused: {}", url))),
            get: Box::new(|url| Err(eyre::eyre!("HTTP error: 503 for {}", url))),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Handler returns the JSON-RPC `result`, an [`RpcFault`] for a node error
    /// object, or any other error for a failed attempt
    pub fn on_rpc(
        mut self,
        f: impl Fn(&str, &str, &serde_json::Value) -> eyre::Result<serde_json::Value>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.rpc = Box::new(f);
        self
    }

    pub fn on_get(
        mut self,
        f: impl Fn(&str) -> eyre::Result<serde_json::Value> + Send + Sync + 'static,
    ) -> Self {
        self.get = Box::new(f);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn rpc_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.method.is_some()).collect()
    }

    pub fn get_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.method.is_none()).collect()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().filter_map(|c| c.method).collect()
    }
}

#[async_trait]
impl JsonTransport for StubTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> eyre::Result<serde_json::Value> {
        let method = body["method"].as_str().unwrap_or_default().to_string();
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            method: Some(method.clone()),
        });
        match (self.rpc)(url, &method, &body["params"]) {
            Ok(result) => Ok(serde_json::json!({
                "jsonrpc": "2.0",
                "id": body["id"].clone(),
                "result": result
            })),
            Err(e) => match e.downcast_ref::<RpcFault>() {
                Some(fault) => Ok(serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": body["id"].clone(),
                    "error": { "code": fault.code, "message": fault.message }
                })),
                None => Err(e),
            },
        }
    }

    async fn get_json(&self, url: &str) -> eyre::Result<serde_json::Value> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            method: None,
        });
        (self.get)(url)
    }
}

/// Local endpoints, two roster sweeps, millisecond delays
pub fn test_config() -> ValidatorConfig {
    let mut config = ValidatorConfig::default();
    config.set_primary_rpc(NetworkId::Base, BASE_RPC);
    config.set_primary_rpc(NetworkId::Ethereum, ETHEREUM_RPC);
    config.set_primary_rpc(NetworkId::BaseTestnet, "http://base-testnet.rpc.test");
    config.set_primary_rpc(NetworkId::Solana, SOLANA_RPC);
    config.set_primary_rpc(NetworkId::SolanaDevnet, "http://solana-devnet.rpc.test");
    config.solana_fallback_rpcs = vec![SOLANA_FALLBACK_A.to_string(), SOLANA_FALLBACK_B.to_string()];
    config.solana_devnet_fallback_rpcs = Vec::new();
    config.rpc_timeout = Duration::from_millis(200);
    config.max_roster_retries = 2;
    config.retry_delay = Duration::from_millis(1);
    config.enrichment_timeout = Duration::from_millis(200);
    config.token_list_timeout = Duration::from_millis(200);
    config.evm_batch = BatchPacing {
        chunk_size: 5,
        delay: Duration::from_millis(1),
    };
    config.solana_batch = BatchPacing {
        chunk_size: 3,
        delay: Duration::from_millis(1),
    };
    config
}

/// ABI-encoded dynamic string
pub fn abi_string(s: &str) -> String {
    let mut payload = hex::encode(s.as_bytes());
    let padded = payload.len().div_ceil(64) * 64;
    while payload.len() < padded {
        payload.push('0');
    }
    format!("0x{:064x}{:064x}{}", 0x20, s.len(), payload)
}

/// ABI-encoded uint256
pub fn abi_uint(value: u128) -> String {
    format!("0x{:064x}", value)
}

/// `eth_call` answers for an ERC-20 keyed by selector
pub fn erc20_result(
    params: &serde_json::Value,
    name: &str,
    symbol: &str,
    decimals: u128,
    supply: u128,
) -> serde_json::Value {
    let result = match params[0]["data"].as_str().unwrap_or_default() {
        "0x06fdde03" => abi_string(name),
        "0x95d89b41" => abi_string(symbol),
        "0x313ce567" => abi_uint(decimals),
        "0x18160ddd" => abi_uint(supply),
        _ => "0x".to_string(),
    };
    serde_json::json!(result)
}

/// `getAccountInfo` result for an initialized SPL mint
pub fn mint_account(decimals: u8, supply: &str) -> serde_json::Value {
    serde_json::json!({
        "context": { "slot": 280000000 },
        "value": {
            "lamports": 1461600,
            "owner": TOKEN_PROGRAM,
            "executable": false,
            "data": {
                "program": "spl-token",
                "space": 82,
                "parsed": {
                    "type": "mint",
                    "info": {
                        "decimals": decimals,
                        "supply": supply,
                        "mintAuthority": null,
                        "freezeAuthority": null,
                        "isInitialized": true
                    }
                }
            }
        }
    })
}
