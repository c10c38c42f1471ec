// Main entry point for the helpdesk API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use helpdesk_core::common::auth::JwtService;
use helpdesk_core::kernel::{start_scheduler, LogMailer, OutboxRunner, OutboxRunnerConfig};
use helpdesk_core::server::{build_app, AppState};
use helpdesk_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,helpdesk_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting helpdesk API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Email delivery in the background
    let runner = OutboxRunner::new(
        pool.clone(),
        Arc::new(LogMailer),
        OutboxRunnerConfig {
            poll_interval: Duration::from_secs(config.outbox_poll_interval_secs),
            from: config.mail_from.clone(),
            ..OutboxRunnerConfig::default()
        },
    );
    tokio::spawn(async move {
        if let Err(e) = runner.run_until_shutdown().await {
            tracing::error!(error = %e, "Outbox runner exited with error");
        }
    });

    // Keep the handle alive for the lifetime of the server
    let _scheduler = start_scheduler(
        pool.clone(),
        config.auto_close_after_days,
        &config.auto_close_cron,
    )
    .await
    .context("Failed to start scheduled tasks")?;

    let state = AppState::new(
        pool,
        JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()),
    );
    let app = build_app(state, &config.allowed_origins)?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
