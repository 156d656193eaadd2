//! Heart Risk Prediction API
//!
//! Serves a pre-trained heart attack risk classifier over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    HEART RISK API                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  POST /predict                                              │
//! │     │                                                       │
//! │     ▼                                                       │
//! │  ┌────────────┐   ┌──────────┐   ┌────────────────────┐    │
//! │  │ Normalizer │──▶│  Scaler  │──▶│ Classifier         │    │
//! │  │ (schema)   │   │ (JSON)   │   │ (forest / logreg)  │    │
//! │  └────────────┘   └──────────┘   └────────────────────┘    │
//! │                                                             │
//! │  Schema, rules and artifacts are loaded once at startup     │
//! │  and shared read-only through AppState.                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod inference;
mod models;
mod normalizer;
mod schema;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::get,
    routing::post,
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

use crate::config::Config;
use crate::inference::{ArtifactError, Predictor};
use crate::models::ModelInfo;
use crate::normalizer::{FriendlyRules, Normalizer, NormalizerConfig};
use crate::schema::FeatureSchema;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "heartrisk_api=debug,tower_http=debug".into());
    if config.json_logs {
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

    tracing::info!("Heart Risk API starting ({})...", config.environment);
    if config.is_production() && config.allow_degraded_start {
        tracing::warn!("ALLOW_DEGRADED_START is enabled in production");
    }

    let state = build_state(&config)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid HOST/PORT")?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub normalizer: Arc<Normalizer>,
    /// `None` only when degraded start is allowed and loading failed
    pub predictor: Option<Predictor>,
    pub model_info: Arc<ModelInfo>,
}

impl AppState {
    pub fn new(normalizer: Normalizer, predictor: Option<Predictor>, version: &str) -> Self {
        let model_type = predictor
            .as_ref()
            .map(|p| p.model_type().to_string())
            .unwrap_or_else(|| "unavailable".to_string());
        let model_info = ModelInfo::new(model_type, &normalizer, version);

        Self {
            normalizer: Arc::new(normalizer),
            predictor,
            model_info: Arc::new(model_info),
        }
    }
}

/// Load schema, rules and artifacts according to the startup policy
fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let loaded = load_normalizer(config).and_then(|normalizer| {
        let predictor = inference::load_predictor(
            &config.model_path,
            &config.scaler_path,
            normalizer.schema().len(),
        )?;
        Ok((normalizer, predictor))
    });

    match loaded {
        Ok((normalizer, predictor)) => {
            Ok(AppState::new(normalizer, Some(predictor), &config.model_version))
        }
        Err(e) if config.allow_degraded_start => {
            tracing::error!("Error loading model: {}", e);
            tracing::warn!("Starting in degraded mode, /predict will fail until restart");
            let normalizer = Normalizer::new(
                config.input_mode.default_schema(),
                NormalizerConfig::for_mode(config.input_mode).with_strict(config.strict()),
            );
            Ok(AppState::new(normalizer, None, &config.model_version))
        }
        Err(e) => Err(anyhow::Error::new(e).context("failed to load model artifacts")),
    }
}

fn load_normalizer(config: &Config) -> Result<Normalizer, ArtifactError> {
    let schema = match &config.feature_schema_path {
        Some(path) => FeatureSchema::from_file(path)?,
        None => config.input_mode.default_schema(),
    };
    tracing::info!("Feature schema: {} features", schema.len());

    let rules = match &config.normalizer_rules_path {
        Some(path) => FriendlyRules::from_file(path)?,
        None => FriendlyRules::default(),
    };

    let normalizer = Normalizer::new(
        schema,
        NormalizerConfig {
            rules,
            ..NormalizerConfig::for_mode(config.input_mode)
        }
        .with_strict(config.strict()),
    );
    tracing::info!(
        "Input mode: {} (strict: {})",
        normalizer.mode(),
        normalizer.is_strict()
    );

    let unmapped = normalizer.unmapped_slots();
    if !unmapped.is_empty() {
        tracing::warn!(
            "No friendly rule produces {:?}; callers must send these by backend name",
            unmapped
        );
    }

    Ok(normalizer)
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/model-info", get(handlers::model_info::get))
        .route(
            "/predict",
            post(handlers::predict::predict).options(handlers::predict::preflight),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
