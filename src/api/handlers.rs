//! API Request Handlers

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::types::*;
use crate::core::batch::BatchCoordinator;
use crate::core::validator::TokenValidator;
use crate::models::errors::{AppError, ErrorKind};
use crate::models::types::{NetworkHealth, TokenListCheck, ValidateOptions, ValidationResult};
use crate::utils::constants::{mask_url, APP_VERSION, MAX_BATCH_REQUESTS};

/// Shared application state
pub struct AppState {
    pub validator: Arc<TokenValidator>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self {
            validator,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

type ErrorResponse = (StatusCode, Json<ApiResponse<()>>);

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn status_for(kind: ErrorKind) -> StatusCode {
    StatusCode::from_u16(kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn error_response(err: AppError, start: Instant) -> ErrorResponse {
    (
        status_for(err.kind),
        Json(ApiResponse::error(
            ApiError::new(err.kind.as_str(), err.message),
            elapsed_ms(start),
        )),
    )
}

fn bad_request(message: &str, start: Instant) -> ErrorResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error(ApiError::bad_request(message), elapsed_ms(start))),
    )
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
        known_tokens: state.validator.known_tokens().len(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Validation
// ============================================

/// Invalid results keep their body; the status comes from the error kind
pub async fn validate_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValidateTokenRequest>,
) -> (StatusCode, Json<ApiResponse<ValidationResult>>) {
    let start = Instant::now();
    let options = ValidateOptions {
        check_token_lists: req.check_token_lists,
    };

    let result = state
        .validator
        .validate_with_options(&req.address, &req.network, options)
        .await;

    match result.error.clone() {
        None => (
            StatusCode::OK,
            Json(ApiResponse::success(result, elapsed_ms(start))),
        ),
        Some(error) => (
            status_for(error.kind),
            Json(ApiResponse::failure(
                result,
                ApiError::new(error.kind.as_str(), error.message),
                elapsed_ms(start),
            )),
        ),
    }
}

pub async fn validate_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchValidateRequest>,
) -> Result<Json<ApiResponse<BatchValidateData>>, ErrorResponse> {
    let start = Instant::now();

    if req.requests.is_empty() {
        return Err(bad_request("requests array cannot be empty", start));
    }
    if req.requests.len() > MAX_BATCH_REQUESTS {
        return Err(bad_request(
            &format!("Maximum {} requests per batch", MAX_BATCH_REQUESTS),
            start,
        ));
    }

    let options = ValidateOptions {
        check_token_lists: req.check_token_lists,
    };
    let results = BatchCoordinator::new(&state.validator)
        .with_options(options)
        .run(&req.requests)
        .await;

    let valid = results.iter().filter(|r| r.is_valid).count();
    let summary = BatchSummary {
        total: results.len(),
        valid,
        invalid: results.len() - valid,
    };
    info!(
        "📦 Batch done: {}/{} valid in {:.0}ms",
        summary.valid,
        summary.total,
        elapsed_ms(start)
    );

    Ok(Json(ApiResponse::success(
        BatchValidateData { results, summary },
        elapsed_ms(start),
    )))
}

// ============================================
// Token lists
// ============================================

pub async fn check_token_list(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TokenListCheckRequest>,
) -> Result<Json<ApiResponse<TokenListCheck>>, ErrorResponse> {
    let start = Instant::now();
    let check = state
        .validator
        .check_token_list(&req.address, &req.network)
        .await;

    if let Some(error) = check.error {
        return Err(error_response(AppError::new(error.kind, error.message), start));
    }
    Ok(Json(ApiResponse::success(check, elapsed_ms(start))))
}

// ============================================
// Network health
// ============================================

pub async fn network_health(
    State(state): State<Arc<AppState>>,
    Path(network): Path<String>,
) -> Result<Json<ApiResponse<NetworkHealth>>, ErrorResponse> {
    let start = Instant::now();
    let mut health = state
        .validator
        .network_health(&network)
        .await
        .map_err(|e| error_response(e, start))?;
    // keyed endpoints never leave the service
    for provider in &mut health.providers {
        provider.url = mask_url(&provider.url);
    }

    Ok(Json(ApiResponse::success(health, elapsed_ms(start))))
}
