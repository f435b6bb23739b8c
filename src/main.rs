//! Rulebook Backend - coding-convention metadata service
//!
//! Entry point for the Rulebook backend API. All operations are exposed
//! as REST endpoints under /api.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rulebook::config::Config;
use rulebook::db::Database;
use rulebook::{AppState, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(Config::from_env()?);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rulebook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("Starting Rulebook Backend");

    let db = Database::connect(&config.database_url).await?;
    db.init_schema().await?;
    tracing::info!("Database connected and schema initialized");

    let state = AppState {
        config: config.clone(),
        db,
    };
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
