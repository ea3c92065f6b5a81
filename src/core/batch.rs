//! Batch validation
//!
//! Requests are split into chunks; items of a chunk run concurrently and a
//! fixed delay separates chunks. Output order always matches input order and
//! every item gets its own result.

use futures_util::future::join_all;
use tracing::info;

use super::validator::TokenValidator;
use crate::models::config::{BatchPacing, ValidatorConfig};
use crate::models::types::{
    NetworkFamily, NetworkId, ValidateOptions, ValidationRequest, ValidationResult,
};

pub struct BatchCoordinator<'a> {
    validator: &'a TokenValidator,
    options: ValidateOptions,
}

impl<'a> BatchCoordinator<'a> {
    pub fn new(validator: &'a TokenValidator) -> Self {
        Self {
            validator,
            options: ValidateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ValidateOptions) -> Self {
        self.options = options;
        self
    }

    /// Solana pacing as soon as one request targets a Solana network
    pub fn pacing(config: &ValidatorConfig, requests: &[ValidationRequest]) -> BatchPacing {
        let network = requests
            .iter()
            .filter_map(|r| r.network_id().ok())
            .find(|n| n.family() == NetworkFamily::Solana)
            .unwrap_or(NetworkId::Ethereum);
        config.batch_pacing(network)
    }

    pub async fn run(&self, requests: &[ValidationRequest]) -> Vec<ValidationResult> {
        let pacing = Self::pacing(self.validator.config(), requests);
        let chunk_size = pacing.chunk_size.max(1);
        let chunk_count = requests.len().div_ceil(chunk_size);
        info!(
            "📦 Batch of {} requests: {} chunk(s) of {}",
            requests.len(),
            chunk_count,
            chunk_size
        );

        let mut results = Vec::with_capacity(requests.len());
        for (index, chunk) in requests.chunks(chunk_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(pacing.delay).await;
            }

            let chunk_results = join_all(
                chunk
                    .iter()
                    .map(|request| self.validator.validate_request(request, self.options)),
            )
            .await;

            info!(
                "📦 Chunk {}/{}: {}/{} valid",
                index + 1,
                chunk_count,
                chunk_results.iter().filter(|r| r.is_valid).count(),
                chunk_results.len()
            );
            results.extend(chunk_results);
        }
        results
    }
}

impl TokenValidator {
    pub async fn validate_batch(&self, requests: &[ValidationRequest]) -> Vec<ValidationResult> {
        BatchCoordinator::new(self).run(requests).await
    }
}
