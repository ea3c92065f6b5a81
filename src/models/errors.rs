//! Centralized Error Handling Module
//!
//! Every validation failure maps to one [`ErrorKind`] with a stable code, so
//! callers can branch on it and logs stay greppable.
//!
//! Inside the crate errors travel as [`AppError`]; at the public boundary they
//! are flattened into `ValidationResult.error` and never returned as `Err`.

use serde::{Serialize, Serializer};
use std::fmt;

/// Crate-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Kind surfaced to callers
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.kind.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Failure kinds of a validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // ============================================
    // Caller errors (zero I/O)
    // ============================================
    /// Address does not match the network's address format
    InvalidFormat,
    /// Network id is not in the supported set
    UnsupportedNetwork,

    // ============================================
    // Contract / mint errors
    // ============================================
    /// EVM address does not answer the ERC-20 metadata calls
    NotErc20,
    /// Solana account is missing or not a mint of the SPL Token program
    NotSplMint,
    /// Decimals out of range or empty name/symbol
    InvalidMetadata,

    // ============================================
    // Upstream errors
    // ============================================
    /// Every provider failed on every roster sweep
    RpcUnavailable,
    /// RPC failed and no off-chain source or known token could answer
    EnrichmentExhausted,
    /// Every attempt ran into its timeout
    Timeout,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::UnsupportedNetwork => "UNSUPPORTED_NETWORK",
            Self::NotErc20 => "NOT_ERC20",
            Self::NotSplMint => "NOT_SPL_MINT",
            Self::InvalidMetadata => "INVALID_METADATA",
            Self::RpcUnavailable => "RPC_UNAVAILABLE",
            Self::EnrichmentExhausted => "ENRICHMENT_EXHAUSTED",
            Self::Timeout => "TIMEOUT",
        }
    }

    /// HTTP status for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidFormat | Self::UnsupportedNetwork => 400,
            Self::NotErc20 | Self::NotSplMint | Self::InvalidMetadata => 422,
            Self::RpcUnavailable | Self::EnrichmentExhausted => 503,
            Self::Timeout => 504,
        }
    }

    /// Upstream failures that may succeed on a later call
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RpcUnavailable | Self::EnrichmentExhausted | Self::Timeout
        )
    }

    /// The RPC layer could not produce an answer, so off-chain fallbacks apply
    pub fn is_upstream_failure(&self) -> bool {
        matches!(self, Self::RpcUnavailable | Self::Timeout)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidFormat, msg)
    }

    pub fn unsupported_network(network: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedNetwork,
            format!("Unsupported network: {}", network),
        )
    }

    pub fn not_erc20(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotErc20, msg)
    }

    pub fn not_spl_mint(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotSplMint, msg)
    }

    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidMetadata, msg)
    }

    pub fn rpc_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::RpcUnavailable, msg)
    }

    pub fn enrichment_exhausted(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::EnrichmentExhausted, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, msg)
    }
}

// ============================================
// Result type alias
// ============================================

pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorKind::RpcUnavailable, err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorKind::Timeout, "Request timeout")
        } else {
            Self::with_source(ErrorKind::RpcUnavailable, "HTTP request failed", err)
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorKind::RpcUnavailable, "JSON parse error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::timeout("provider took too long");
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert_eq!(err.code_str(), "TIMEOUT");
        assert_eq!(err.to_string(), "[TIMEOUT] provider took too long");
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorKind::RpcUnavailable.is_retryable());
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(!ErrorKind::InvalidFormat.is_retryable());
        assert!(!ErrorKind::NotErc20.is_retryable());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorKind::InvalidFormat.http_status(), 400);
        assert_eq!(ErrorKind::UnsupportedNetwork.http_status(), 400);
        assert_eq!(ErrorKind::NotSplMint.http_status(), 422);
        assert_eq!(ErrorKind::RpcUnavailable.http_status(), 503);
    }

    #[test]
    fn test_kind_serializes_as_code() {
        let json = serde_json::to_string(&ErrorKind::NotErc20).unwrap();
        assert_eq!(json, "\"NOT_ERC20\"");
    }
}
