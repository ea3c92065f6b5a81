//! RPC Module - Provider rosters and the resilience layer
//!
//! 1. [`ProviderRoster`]: ordered endpoint list per network (configured primary
//!    first, public fallbacks after it) plus advisory health data
//! 2. [`RpcResilienceLayer`]: sweeps the whole roster in order on every
//!    attempt, sleeps `retry_delay * (attempt + 1)` between sweeps and only
//!    reports failure once every provider failed on every sweep
//!
//! A sweep visits each provider once before any provider is retried, so a
//! healthy fallback answers before a dead primary is tried again.
//!
//! An execution revert is the contract's own answer and every node returns
//! the same one: it ends the call immediately as `NotErc20`.

use dashmap::DashMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::transport::JsonTransport;
use crate::models::config::ValidatorConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{NetworkFamily, NetworkId, ProviderEndpoint};
use crate::utils::constants::mask_url;

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    /// Rate limit (HTTP 429 mapped to -32005 by most providers)
    pub fn is_rate_limit(&self) -> bool {
        self.code == -32005 || self.message.to_lowercase().contains("rate limit")
    }

    /// Contract execution reverted (EVM)
    pub fn is_execution_reverted(&self) -> bool {
        self.code == 3 || self.message.to_lowercase().contains("execution reverted")
    }
}

/// Why a single provider attempt failed
#[derive(Debug)]
enum AttemptFailure {
    Timeout,
    Transport(String),
    Rpc(RpcError),
    Reverted(RpcError),
    MissingResult,
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out"),
            Self::Transport(e) => write!(f, "{}", e),
            Self::Rpc(e) => write!(f, "RPC error: {} (code: {})", e.message, e.code),
            Self::Reverted(e) => write!(f, "{} (code: {})", e.message, e.code),
            Self::MissingResult => write!(f, "No result in response"),
        }
    }
}

/// Timeout and sweep count for one call
#[derive(Debug, Clone, Copy)]
pub struct RpcPolicy {
    pub per_provider_timeout: Duration,
    pub max_roster_retries: u32,
}

impl RpcPolicy {
    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self {
            per_provider_timeout: config.rpc_timeout,
            max_roster_retries: config.max_roster_retries,
        }
    }
}

// ============================================
// PROVIDER ROSTER
// ============================================

#[derive(Debug, Clone, Copy, Default)]
struct EndpointHealth {
    healthy: bool,
    response_time_ms: Option<u64>,
}

/// Ordered endpoint lists per network.
///
/// Roster URLs never change after construction. Health data is advisory and
/// only written by [`ProviderRoster::probe`].
pub struct ProviderRoster {
    rosters: HashMap<NetworkId, Vec<String>>,
    health: DashMap<String, EndpointHealth>,
    transport: Arc<dyn JsonTransport>,
    probe_timeout: Duration,
}

impl ProviderRoster {
    /// Rosters from configuration: primary first, then de-duplicated fallbacks
    pub fn from_config(config: &ValidatorConfig, transport: Arc<dyn JsonTransport>) -> Self {
        let mut rosters = HashMap::new();
        for network in NetworkId::ALL {
            let mut urls = vec![config.primary_rpc(network).to_string()];
            for fallback in config.fallback_rpcs(network) {
                if !urls.contains(fallback) {
                    urls.push(fallback.clone());
                }
            }
            info!(
                "✅ Roster for {}: {} provider(s), primary {}",
                network,
                urls.len(),
                mask_url(&urls[0])
            );
            rosters.insert(network, urls);
        }
        Self::with_rosters(rosters, transport, config.rpc_timeout)
    }

    pub fn with_rosters(
        rosters: HashMap<NetworkId, Vec<String>>,
        transport: Arc<dyn JsonTransport>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            rosters,
            health: DashMap::new(),
            transport,
            probe_timeout,
        }
    }

    /// Snapshot of a network's roster in priority order
    pub fn providers(&self, network: NetworkId) -> Vec<ProviderEndpoint> {
        self.rosters
            .get(&network)
            .map(|urls| {
                urls.iter()
                    .map(|url| {
                        let health = self.health.get(url).map(|h| *h).unwrap_or_default();
                        ProviderEndpoint {
                            url: url.clone(),
                            network,
                            last_known_healthy: health.healthy,
                            last_response_time_ms: health.response_time_ms,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Single lightweight health call. Records the outcome for later snapshots.
    pub async fn probe(&self, endpoint: &ProviderEndpoint) -> (bool, u64) {
        let method = match endpoint.network.family() {
            NetworkFamily::Evm => "eth_blockNumber",
            NetworkFamily::Solana => "getHealth",
        };
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": []
        });

        let start = Instant::now();
        let outcome = tokio::time::timeout(
            self.probe_timeout,
            self.transport.post_json(&endpoint.url, &payload),
        )
        .await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let healthy = match outcome {
            Ok(Ok(response)) => response.get("error").map_or(true, |e| e.is_null()),
            Ok(Err(e)) => {
                debug!("Probe of {} failed: {}", mask_url(&endpoint.url), e);
                false
            }
            Err(_) => {
                debug!("Probe of {} timed out", mask_url(&endpoint.url));
                false
            }
        };

        self.health.insert(
            endpoint.url.clone(),
            EndpointHealth {
                healthy,
                response_time_ms: Some(elapsed_ms),
            },
        );
        (healthy, elapsed_ms)
    }
}

// ============================================
// RESILIENCE LAYER
// ============================================

pub struct RpcResilienceLayer {
    transport: Arc<dyn JsonTransport>,
    retry_delay: Duration,
    next_id: AtomicU64,
}

impl RpcResilienceLayer {
    pub fn new(transport: Arc<dyn JsonTransport>, retry_delay: Duration) -> Self {
        Self {
            transport,
            retry_delay,
            next_id: AtomicU64::new(1),
        }
    }

    /// Run `method` against the roster until one provider answers.
    ///
    /// Fails with `Timeout` when every attempt timed out, `RpcUnavailable`
    /// otherwise.
    pub async fn call(
        &self,
        roster: &[ProviderEndpoint],
        method: &str,
        params: serde_json::Value,
        per_provider_timeout: Duration,
        max_roster_retries: u32,
    ) -> AppResult<serde_json::Value> {
        if roster.is_empty() {
            return Err(AppError::rpc_unavailable(format!(
                "No providers configured for {}",
                method
            )));
        }

        let attempts = max_roster_retries.max(1);
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params
        });

        let mut last_error: Option<AttemptFailure> = None;
        let mut all_timeouts = true;

        for attempt in 0..attempts {
            for provider in roster {
                match self
                    .attempt(&provider.url, &payload, per_provider_timeout)
                    .await
                {
                    Ok(result) => {
                        if attempt > 0 {
                            info!(
                                "🔄 {} succeeded on {} (sweep {}/{})",
                                method,
                                mask_url(&provider.url),
                                attempt + 1,
                                attempts
                            );
                        }
                        return Ok(result);
                    }
                    Err(AttemptFailure::Reverted(e)) => {
                        debug!(
                            "↩️ {} reverted on {}: {}",
                            method,
                            mask_url(&provider.url),
                            e.message
                        );
                        return Err(AppError::not_erc20(format!(
                            "{} reverted: {}",
                            method,
                            AttemptFailure::Reverted(e)
                        )));
                    }
                    Err(failure) => {
                        if let AttemptFailure::Rpc(ref e) = failure {
                            if e.is_rate_limit() {
                                warn!("⏳ Rate limited by {}", mask_url(&provider.url));
                            }
                        }
                        warn!(
                            "⚠️ {} failed on {}: {}",
                            method,
                            mask_url(&provider.url),
                            failure
                        );
                        all_timeouts &= matches!(failure, AttemptFailure::Timeout);
                        last_error = Some(failure);
                    }
                }
            }

            if attempt + 1 < attempts {
                let delay = self.retry_delay * (attempt + 1);
                debug!(
                    "⏳ Roster exhausted for {}, sweep {}/{} in {}ms",
                    method,
                    attempt + 2,
                    attempts,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
        }

        let message = format!(
            "All {} providers failed after {} attempts for {}: {}",
            roster.len(),
            attempts,
            method,
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string())
        );
        warn!("❌ {}", message);

        if all_timeouts {
            Err(AppError::timeout(message))
        } else {
            Err(AppError::rpc_unavailable(message))
        }
    }

    /// Call a network's roster as currently configured
    pub async fn call_network(
        &self,
        roster: &ProviderRoster,
        network: NetworkId,
        method: &str,
        params: serde_json::Value,
        policy: RpcPolicy,
    ) -> AppResult<serde_json::Value> {
        let providers = roster.providers(network);
        self.call(
            &providers,
            method,
            params,
            policy.per_provider_timeout,
            policy.max_roster_retries,
        )
        .await
    }

    async fn attempt(
        &self,
        url: &str,
        payload: &serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, AttemptFailure> {
        let response = tokio::time::timeout(timeout, self.transport.post_json(url, payload))
            .await
            .map_err(|_| AttemptFailure::Timeout)?
            .map_err(|e| AttemptFailure::Transport(e.to_string()))?;

        if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
            let rpc_error = serde_json::from_value::<RpcError>(error.clone()).unwrap_or(RpcError {
                code: 0,
                message: error.to_string(),
            });
            if rpc_error.is_execution_reverted() {
                return Err(AttemptFailure::Reverted(rpc_error));
            }
            return Err(AttemptFailure::Rpc(rpc_error));
        }

        match response.get("result") {
            Some(result) => Ok(result.clone()),
            None => Err(AttemptFailure::MissingResult),
        }
    }
}
