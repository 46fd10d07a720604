//! # PagePilot API Server
//!
//! Serves the PagePilot dashboard pages and JSON API.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (`.env` is honored)
//! 2. Connect to PostgreSQL and apply embedded migrations
//! 3. Build the router and serve until Ctrl+C
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p pagepilot-api
//! ```

use pagepilot_api::{
    app::{build_router, AppState},
    config::Config,
};
use pagepilot_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pagepilot_api=debug,pagepilot_shared=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "PagePilot API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let address = config.bind_address();

    let pool = create_pool(config.database.pool_config()).await?;
    run_migrations(&pool).await?;

    if config.openai.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; content generation is disabled");
    }

    let state = AppState::new(pool.clone(), config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
