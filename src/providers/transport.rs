//! HTTP JSON transport
//!
//! Every outbound call (JSON-RPC, enrichment APIs, token lists) goes through
//! [`JsonTransport`], so tests can swap in a stub keyed by URL.

use async_trait::async_trait;
use eyre::{eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use std::time::Duration;

use crate::utils::constants::{mask_url, HTTP_CLIENT_TIMEOUT_SECS, USER_AGENT as USER_AGENT_CONST};

#[async_trait]
pub trait JsonTransport: Send + Sync {
    /// POST a JSON body and return the decoded JSON response
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<serde_json::Value>;

    /// GET a JSON document
    async fn get_json(&self, url: &str) -> Result<serde_json::Value>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Self::build_client()?,
        })
    }

    /// Client with fixed User-Agent and gzip enabled
    fn build_client() -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(HTTP_CLIENT_TIMEOUT_SECS))
            .gzip(true)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
    }

    async fn read_json(response: reqwest::Response) -> Result<serde_json::Value> {
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(eyre!("Rate limited (HTTP 429)"));
        }
        if !status.is_success() {
            return Err(eyre!("HTTP error: {}", status));
        }

        response
            .json()
            .await
            .map_err(|e| eyre!("Failed to parse response: {}", e.without_url()))
    }
}

#[async_trait]
impl JsonTransport for HttpTransport {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| eyre!("Request to {} failed: {}", mask_url(url), e.without_url()))?;
        Self::read_json(response).await
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| eyre!("Request to {} failed: {}", mask_url(url), e.without_url()))?;
        Self::read_json(response).await
    }
}
