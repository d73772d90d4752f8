mod config;
mod errors;
mod generation;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, TierKind};
use crate::llm_client::local::LocalModelSource;
use crate::llm_client::{GatewayConfig, InferenceGateway, LocalAdapter, RemoteAdapter, Tier};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (aborts on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Scribe v{}", env!("CARGO_PKG_VERSION"));

    let gateway = build_gateway(&config);
    info!("Inference tiers: {}", gateway.tier_names().join(" -> "));
    if config.dev_mode {
        warn!("DEV_MODE is on: mock responses will be served when all real tiers fail");
    }

    let state = AppState {
        gateway: Arc::new(gateway),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the cascade in the configured tier order. The gateway appends the
/// mock tier itself when dev mode is on.
fn build_gateway(config: &Config) -> InferenceGateway {
    let tiers = config
        .tier_order
        .iter()
        .map(|kind| match kind {
            TierKind::Remote => {
                info!(
                    "Remote tier: {} (model: {}, budget: {:?})",
                    config.ollama_base_url, config.default_model, config.remote_timeout
                );
                Tier::new(
                    Arc::new(RemoteAdapter::new(
                        config.ollama_base_url.clone(),
                        config.default_model.clone(),
                    )),
                    config.remote_timeout,
                )
            }
            TierKind::Local => {
                let loader = config.local_model.loader();
                info!(
                    "Local tier: {} via {} (budget: {:?})",
                    config.local_model_name,
                    loader.describe(),
                    config.local_timeout
                );
                if matches!(config.local_model, LocalModelSource::Gguf(_))
                    && !cfg!(feature = "local-gguf")
                {
                    warn!("Built without the local-gguf feature: the local tier will be unavailable");
                }
                Tier::new(
                    Arc::new(LocalAdapter::new(
                        config.local_model_name.clone(),
                        config.local_max_new_tokens,
                        loader,
                    )),
                    config.local_timeout,
                )
            }
        })
        .collect();

    InferenceGateway::new(GatewayConfig::new(tiers, config.dev_mode))
}
