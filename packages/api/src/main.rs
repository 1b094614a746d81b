//! Job board API server binary.

use anyhow::Context;
use mailer::Mailer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use api::{ApiConfig, AppState, create_router, spawn_revoked_token_sweeper};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // JSON logs when LOG_FORMAT=json, coloured otherwise
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,api=debug"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }

    info!("Starting jobboard-api");

    let config = ApiConfig::from_env().context("Failed to load configuration")?;
    info!(
        "API config: host={}, port={}, environment={:?}",
        config.host, config.port, config.environment
    );

    let db = db::init(&config.db_config())
        .await
        .context("Failed to open database")?;

    let email = config
        .email_sender()
        .context("Failed to build email sender")?;
    let (mailer, mailer_handle) = Mailer::start(email.clone())
        .await
        .context("Failed to start mailer actor")?;

    let sweep_every = config.revoked_token_sweep();
    let addr = config.bind_addr();
    let state = AppState::new(config, db, email, mailer.clone());

    let sweeper = spawn_revoked_token_sweeper(state.revoked.clone(), sweep_every);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    sweeper.abort();
    mailer.stop();
    if let Err(e) = mailer_handle.await {
        tracing::warn!("Mailer task ended abnormally: {}", e);
    }
    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
