//! HTTP API module - JSON endpoints and static files

mod artwork;
mod gallery;
mod payments;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::deepai::DeepAiClient;
use crate::gallery::{list_categories, Categories};
use crate::images::{ArtworkStore, PatternCache, PatternGenerator};
use crate::pi::PiClient;
use crate::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<PatternGenerator>,
    pub artworks: Arc<ArtworkStore>,
    pub pi: Arc<PiClient>,
}

impl AppState {
    /// Build the handler state, including the process-wide pattern cache
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let cache = Arc::new(PatternCache::new(Duration::from_secs(config.cache_ttl_secs)));
        let deepai = Arc::new(DeepAiClient::from_config(&config)?);
        let generator = Arc::new(PatternGenerator::new(deepai, cache));
        let artworks = Arc::new(ArtworkStore::new(&config.static_dir));
        let pi = Arc::new(PiClient::from_config(&config)?);

        Ok(Self {
            config,
            generator,
            artworks,
            pi,
        })
    }

    /// Current gallery listing; unreadable directories give an empty gallery
    pub(crate) async fn categories(&self) -> Categories {
        match list_categories(&self.config.line_art_dir()).await {
            Ok(categories) => categories,
            Err(e) => {
                warn!("Failed to list line-art categories: {}", e);
                Categories::new()
            }
        }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health_check))
        .merge(gallery::router(&static_dir))
        .merge(artwork::router())
        .merge(payments::router())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    wallet: Option<String>,
    categories: Vec<String>,
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let categories = state.categories().await.into_keys().collect();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        wallet: state.config.pi_app_wallet_address.clone(),
        categories,
    })
}
