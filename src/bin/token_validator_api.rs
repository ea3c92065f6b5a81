//! Token Validator API Server
//!
//! Usage:
//!   cargo run --bin token_validator_api
//!
//! Environment:
//!   VALIDATOR_PORT - Server port (default: 8080, `PORT` takes precedence)
//!   VALIDATOR_HOST - Server host (default: 0.0.0.0)
//!   RUST_LOG       - Log filter (default: info)
//!   plus every RPC / timeout variable read by `ValidatorConfig::from_env`

use std::net::SocketAddr;
use std::sync::Arc;
use token_validator::api::{create_router, handlers::AppState};
use token_validator::utils::constants::{APP_NAME, APP_VERSION};
use token_validator::{TokenValidator, ValidatorConfig};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = ValidatorConfig::from_env();
    let validator = Arc::new(TokenValidator::new(config)?);
    info!(
        "💾 Known-token cache seeded with {} entries",
        validator.known_tokens().len()
    );

    let state = Arc::new(AppState::new(validator.clone()));
    let app = create_router(state);

    // PORT wins for hosted deployments, VALIDATOR_PORT for local runs
    let host = std::env::var("VALIDATOR_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("VALIDATOR_PORT"))
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("🚀 {} API v{} starting on http://{}", APP_NAME, APP_VERSION, addr);
    info!("Endpoints:");
    info!("  POST /v1/validate                  - Validate one token address");
    info!("  POST /v1/validate/batch            - Batch validation (up to 100 requests)");
    info!("  POST /v1/token-list/check          - Token list membership");
    info!("  GET  /v1/networks/:network/health  - Provider roster health");
    info!("  GET  /health                       - Liveness");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    let stats = validator.known_tokens().stats();
    info!("🛑 Shutdown signal received");
    info!(
        "   Known-token cache: {} entries, {} hits, {} misses ({:.1}% hit rate)",
        stats.entries, stats.hits, stats.misses, stats.hit_rate
    );
    let lists = validator.token_list_stats();
    info!(
        "   Token-list cache: {} documents, {} hits, {} misses",
        lists.entries, lists.hits, lists.misses
    );
    info!("👋 Token Validator API shutdown complete");

    Ok(())
}
