//! Dermwoe API Server
//!
//! HTTP front for the skin-lesion explanation model.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     DERMWOE SERVER                       │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌────────────────────────────────────┐  │
//! │  │  Router   │──▶│  spawn_blocking                    │  │
//! │  │  (Axum)   │   │  backbone → NMF → masks → WOE      │  │
//! │  └───────────┘   └────────────────────────────────────┘  │
//! │                         ▲                                │
//! │                 ┌───────┴────────┐                       │
//! │                 │ save_model/    │ (loaded once)         │
//! │                 └────────────────┘                       │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dermwoe_core::ExplanationModel;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dermwoe_server=debug,dermwoe_core=info,tower_http=debug".into());
    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Dermwoe server starting...");
    tracing::info!("Model artifacts: {}", config.adapter.model_dir.display());

    let model = ExplanationModel::load(&config.adapter)
        .with_context(|| format!("loading model from {}", config.adapter.model_dir.display()))?;
    tracing::info!("Model loaded: {}", model.status().backbone);

    let state = AppState {
        model: Arc::new(model),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ExplanationModel>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/predict/", post(handlers::predict::predict))
        .route("/predict", post(handlers::predict::predict))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origin))
        .with_state(state)
}

/// Credentialed CORS for the configured front-end; `*` mirrors the caller
fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match origin.parse::<HeaderValue>() {
        Ok(value) if origin != "*" => AllowOrigin::exact(value),
        Ok(_) => AllowOrigin::mirror_request(),
        Err(_) => {
            tracing::warn!("Invalid CORS_ORIGIN '{}', mirroring request origin", origin);
            AllowOrigin::mirror_request()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods(tower_http::cors::AllowMethods::mirror_request())
        .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
}
