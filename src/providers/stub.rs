//! Scripted transport for unit tests

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::transport::JsonTransport;

type Handler = dyn Fn(&str, &serde_json::Value) -> eyre::Result<serde_json::Value> + Send + Sync;
type Latency = dyn Fn(&str) -> Option<Duration> + Send + Sync;

/// Answers every request through one closure and records `(url, body)`.
/// GET requests are recorded with a `null` body.
pub(crate) struct FnTransport {
    handler: Box<Handler>,
    latency: Box<Latency>,
    calls: Mutex<Vec<(String, serde_json::Value)>>,
}

impl FnTransport {
    pub(crate) fn new(
        handler: impl Fn(&str, &serde_json::Value) -> eyre::Result<serde_json::Value>
            + Send
            + Sync
            + 'static,
    ) -> Arc<Self> {
        Self::with_latency(handler, |_| None)
    }

    /// Like `new`, but POSTs to a URL wait for `latency(url)` before answering
    pub(crate) fn with_latency(
        handler: impl Fn(&str, &serde_json::Value) -> eyre::Result<serde_json::Value>
            + Send
            + Sync
            + 'static,
        latency: impl Fn(&str) -> Option<Duration> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            latency: Box::new(latency),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Requested URLs in call order
    pub(crate) fn urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
    }

    pub(crate) fn bodies(&self) -> Vec<serde_json::Value> {
        self.calls.lock().unwrap().iter().map(|(_, b)| b.clone()).collect()
    }

    pub(crate) fn methods(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(_, body)| body["method"].as_str().map(str::to_string))
            .collect()
    }

    fn record(&self, url: &str, body: serde_json::Value) {
        self.calls.lock().unwrap().push((url.to_string(), body));
    }
}

#[async_trait]
impl JsonTransport for FnTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> eyre::Result<serde_json::Value> {
        self.record(url, body.clone());
        if let Some(delay) = (self.latency)(url) {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(url, body)
    }

    async fn get_json(&self, url: &str) -> eyre::Result<serde_json::Value> {
        self.record(url, serde_json::Value::Null);
        (self.handler)(url, &serde_json::Value::Null)
    }
}

/// JSON-RPC success envelope
pub(crate) fn rpc_ok(result: serde_json::Value) -> eyre::Result<serde_json::Value> {
    Ok(serde_json::json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

/// ABI-encoded dynamic string as `0x` hex
pub(crate) fn abi_string(s: &str) -> String {
    let mut out = format!("0x{:064x}{:064x}", 0x20, s.len());
    let mut payload = hex::encode(s.as_bytes());
    let padded = payload.len().div_ceil(64) * 64;
    while payload.len() < padded {
        payload.push('0');
    }
    out.push_str(&payload);
    out
}

/// ABI-encoded uint256 as `0x` hex
pub(crate) fn abi_uint(value: u128) -> String {
    format!("0x{:064x}", value)
}
