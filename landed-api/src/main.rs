use std::net::SocketAddr;

use anyhow::Context;
use landed_api::{app, AppState};
use landed_store::{Config, SeedDocument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "landed_api=debug,landed_store=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!(
        "Starting Landed API on port {} ({})",
        config.server.port,
        config.quoting.local_currency
    );

    let seed = match &config.seed.path {
        Some(path) => SeedDocument::from_file(path).context("Failed to load seed data")?,
        None => {
            tracing::warn!("No seed file configured; starting with empty stores");
            SeedDocument::default()
        }
    };

    let state = AppState::build(&config, &seed)
        .await
        .context("Failed to initialise application state")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
