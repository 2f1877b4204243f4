//! natsly - coloring-book gallery server
//!
//! Serves categorized line art, converts sketches to line art, generates
//! AI patterns from text prompts and verifies Pi Network payments.

pub mod api;
pub mod deepai;
pub mod gallery;
pub mod images;
pub mod pi;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use api::AppState;

/// Default config file, read from the working directory if present
pub const CONFIG_FILE: &str = "natsly.toml";

/// Upload ceiling for request bodies (16 MiB)
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Legacy environment variables honoured without the `NATSLY_` prefix
const LEGACY_ENV: &[&str] = &[
    "port",
    "ai_api_key",
    "pi_api_key",
    "pi_app_id",
    "pi_app_wallet_address",
    "pi_sandbox",
];

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Root of the static tree (line art, user artworks, sounds)
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub music_files: Vec<String>,
    /// DeepAI text2img endpoint
    pub ai_api_url: String,
    pub ai_api_key: Option<String>,
    /// Timeout applied to each outbound generation call
    pub ai_timeout_secs: u64,
    /// Lifetime of a cached generation
    pub cache_ttl_secs: u64,
    pub pi_api_url: String,
    pub pi_api_key: Option<String>,
    pub pi_app_id: String,
    pub pi_app_wallet_address: Option<String>,
    pub pi_sandbox: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: PathBuf::from("static"),
            max_upload_bytes: MAX_UPLOAD_BYTES,
            music_files: vec![
                "forest.mp3".to_string(),
                "piano.mp3".to_string(),
                "waves.mp3".to_string(),
            ],
            ai_api_url: "https://api.deepai.org/api/text2img".to_string(),
            ai_api_key: None,
            ai_timeout_secs: 20,
            cache_ttl_secs: 3600,
            pi_api_url: "https://api.minepi.com/v2".to_string(),
            pi_api_key: None,
            pi_app_id: "Natsly".to_string(),
            pi_app_wallet_address: None,
            pi_sandbox: false,
        }
    }
}

impl Config {
    /// Layered configuration: defaults, `natsly.toml`, `NATSLY_*`, legacy env
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("NATSLY_"))
            .merge(Env::raw().only(LEGACY_ENV))
    }

    /// Load configuration from all sources
    pub fn load() -> Result<Self> {
        Self::figment()
            .extract()
            .context("Failed to load configuration")
    }

    /// Socket address to listen on
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }

    /// Directory holding one subdirectory per line-art category
    pub fn line_art_dir(&self) -> PathBuf {
        self.static_dir.join(gallery::LINE_ART_DIR)
    }

    /// Directory receiving colored artworks saved by users
    pub fn upload_dir(&self) -> PathBuf {
        self.static_dir.join(gallery::UPLOAD_DIR)
    }
}

/// The natsly server instance
pub struct Server {
    config: Arc<Config>,
    state: AppState,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance
    ///
    /// Creates the static directory layout and the process-wide pattern cache.
    pub async fn new(config: Config) -> Result<Self> {
        gallery::bootstrap(&config.static_dir)
            .await
            .context("Failed to create static directories")?;

        let config = Arc::new(config);
        let state = AppState::new(config.clone())?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            state,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Shared handler state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router
    fn router(&self) -> Router {
        api::router(self.state.clone())
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr()?).await?;
        let local_addr = listener.local_addr()?;
        info!("natsly listening on {}", local_addr);

        let router = self.router();
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        info!("natsly shutdown complete");
        Ok(())
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.config.bind_addr()
    }
}
