//! NeuroLift sync daemon
//!
//! Keeps the local store in step with the remote document store.
//!
//! ## Usage
//!
//! - `neurolift-sync`: sync every `sync.interval_secs` until Ctrl+C/SIGTERM
//! - `neurolift-sync once`: run a single sync and exit
//! - `neurolift-sync print-config`: print the effective configuration

use anyhow::Result;
use neurolift_client::{
    config,
    db,
    remote::{HttpRemoteStore, RemoteStore},
    services::SyncService,
    state::AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Once,
    PrintConfig,
}

impl Command {
    fn parse(arg: Option<&str>) -> Result<Self> {
        match arg {
            None | Some("run") => Ok(Command::Run),
            Some("once") => Ok(Command::Once),
            Some("print-config") => Ok(Command::PrintConfig),
            Some(other) => anyhow::bail!("Unknown command '{}' (expected run, once or print-config)", other),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let arg = std::env::args().nth(1);
    let command = Command::parse(arg.as_deref())?;

    // Load configuration
    let config = config::AppConfig::load()?;

    if command == Command::PrintConfig {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    // Initialize tracing
    init_tracing();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        policy = %config.sync.policy,
        "Starting NeuroLift sync"
    );

    // Open the local store
    let db_pool = db::create_pool(&config.storage.database_url, config.storage.max_connections).await?;
    db::run_migrations(&db_pool).await?;
    db::health_check(&db_pool).await?;

    let remote: Arc<dyn RemoteStore> = Arc::new(HttpRemoteStore::new(&config.remote)?);
    let state = AppState::new(db_pool, config, remote);

    if !state.config().sync_configured() {
        warn!("Sync is disabled or no remote.user_id is set; nothing will be uploaded");
    }

    match command {
        Command::Once => {
            let report = SyncService::sync(&state).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if let Some(err) = report.first_error() {
                anyhow::bail!("Sync incomplete: {}", err);
            }
        }
        _ => run_loop(&state).await,
    }

    state.db().close().await;
    info!("Shutdown complete");
    Ok(())
}

/// Sync on an interval until a shutdown signal arrives
async fn run_loop(state: &AppState) {
    let mut ticker = tokio::time::interval(Duration::from_secs(state.config().sync.interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match SyncService::sync(state).await {
                    Ok(report) if report.is_skipped() => {}
                    Ok(report) => {
                        if let Some(err) = report.first_error() {
                            warn!(error = %err, "Sync incomplete, will retry");
                        }
                    }
                    Err(e) => error!(code = e.code(), error = %e, "Sync failed"),
                }
            }
            _ = &mut shutdown => break,
        }
    }
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "neurolift_client=info".into()
        } else {
            "neurolift_client=debug,neurolift_sync=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse(None).unwrap(), Command::Run);
        assert_eq!(Command::parse(Some("once")).unwrap(), Command::Once);
        assert_eq!(Command::parse(Some("print-config")).unwrap(), Command::PrintConfig);
        assert!(Command::parse(Some("serve")).is_err());
    }
}
