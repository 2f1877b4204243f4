//! natsly - coloring-book gallery server

use std::sync::Arc;

use anyhow::Result;
use natsly::gallery::list_categories;
use natsly::{Config, Server};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "natsly=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    info!(
        "Pi wallet address: {}",
        config.pi_app_wallet_address.as_deref().unwrap_or("(not set)")
    );
    info!("Sandbox mode: {}", config.pi_sandbox);

    // Create and run server
    let server = Arc::new(Server::new(config.clone()).await?);

    let categories = list_categories(&config.line_art_dir()).await?;
    info!("Found {} categories", categories.len());
    for (category, images) in &categories {
        info!(" - {}: {} images", category, images.len());
    }

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            signal_server.shutdown();
        }
    });

    server.run().await?;

    Ok(())
}
