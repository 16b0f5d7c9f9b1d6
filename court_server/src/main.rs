//! Tennis court booking server.
//!
//! Serves the booking, wallet and administration API over HTTP with an
//! in-process store.

use anyhow::Error;
use chrono::Duration;
use court_booking::{
    auth::AuthManager,
    db::Database,
};
use court_server::{
    api,
    config::{AdminBootstrap, ServerConfig},
    logging, metrics,
};
use pico_args::Arguments;
use std::net::SocketAddr;

const HELP: &str = "\
Run the tennis court booking server

USAGE:
  court_server [OPTIONS]

OPTIONS:
  --bind          IP:PORT  Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --metrics-bind  IP:PORT  Prometheus exporter address [default: env METRICS_BIND, disabled if unset]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  JWT_SECRET               JWT signing secret (required, >= 32 chars)
  PASSWORD_PEPPER          Password hashing pepper (required, >= 16 chars)
  ACCESS_TOKEN_MINUTES     Access token lifetime [default: 15]
  ADMIN_USERNAME           Administrator created at startup (with ADMIN_PASSWORD)
  TOPUP_MIN_CENTS          Smallest wallet top-up [default: 1000]
  TOPUP_MAX_CENTS          Largest wallet top-up [default: 1000000]
  TOPUP_DAILY_LIMIT_CENTS  Deposits allowed per user per day [default: 5000000]
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let metrics_bind: Option<SocketAddr> = pargs.opt_value_from_str("--metrics-bind")?;

    let config = ServerConfig::from_env(bind, metrics_bind)?;
    config.validate()?;

    logging::init();
    tracing::info!("Starting court booking server at {}", config.bind);

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        tracing::info!("Prometheus metrics exported at http://{}/metrics", addr);
    }

    let db = Database::new();
    let auth_manager = AuthManager::new(
        db.clone(),
        config.security.password_pepper.clone(),
        config.security.jwt_secret.clone(),
    )
    .with_access_token_duration(Duration::minutes(config.security.access_token_minutes));

    if let Some(admin) = &config.bootstrap_admin {
        bootstrap_admin(&auth_manager, admin).await?;
    }

    let state = api::AppState::new(db, auth_manager, config.top_up);
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    tracing::info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    tracing::info!("Shutting down server...");

    Ok(())
}

/// Create the configured administrator in the fresh store
async fn bootstrap_admin(auth_manager: &AuthManager, admin: &AdminBootstrap) -> Result<(), Error> {
    let user = auth_manager
        .create_admin(&admin.username, &admin.password)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create administrator: {}", e))?;
    tracing::info!("Created administrator {} ({})", user.username, user.id);
    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
