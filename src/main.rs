use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;

use focuswave_api::config::Config;
use focuswave_api::ml::{spawn_health_monitor, MlClient};
use focuswave_api::{build_router, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "focuswave_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env()?);

    // Database
    let db = db::create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations applied");

    let ml = MlClient::new(config.ml_service_url.clone(), config.ml_request_timeout())?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ml_monitor = spawn_health_monitor(ml.clone(), config.ml_health_interval(), shutdown_rx);

    let state = AppState {
        db,
        config: config.clone(),
        ml,
    };
    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await
        .context("Server error")?;

    if let Err(e) = ml_monitor.await {
        tracing::warn!(error = %e, "ML health monitor ended abnormally");
    }
    Ok(())
}
