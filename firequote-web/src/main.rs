//! FireQuote web server entry point

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use firequote_core::database::{self, DatabaseConfig};
use firequote_web::{config::ServerConfig, router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "firequote_web=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let db_config = DatabaseConfig::default();
    let pool = database::connect(&db_config)
        .await
        .with_context(|| format!("failed to open database at {}", db_config.database_url))?;

    let config = ServerConfig::default();
    let port = config.port;
    tracing::info!(
        templates_dir = %config.templates_dir.display(),
        output_dir = %config.output_dir.display(),
        "starting FireQuote"
    );

    let app = router(AppState::new(pool, config));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    tracing::info!("FireQuote listening on http://{addr}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
