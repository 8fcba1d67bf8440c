//! Queuedeck Console — session and real-time tooling for the queueing
//! platform admin console.
//!
//! Entry point that wires the session lifecycle and the real-time channel
//! together behind a small CLI.

use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use queuedeck_core::config::AppConfig;
use queuedeck_core::error::AppError;
use queuedeck_realtime::{ConnectionManager, ConnectionObserver, Envelope, endpoint};
use queuedeck_session::lifecycle::HttpTokenRefresher;
use queuedeck_session::{SessionLifecycleManager, SessionState, TokenStore};
use queuedeck_storage::FileStore;

#[derive(Parser)]
#[command(name = "queuedeck", about = "Queuedeck console client", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the restored session and its lifecycle outcome.
    Status,
    /// Drop stored credentials and reset the session.
    Logout,
    /// Stream real-time messages from a channel to stdout.
    Tail {
        /// Channel path on the realtime endpoint, e.g. `/ws/queues/`.
        #[arg(long, default_value = "/ws/events/")]
        path: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let env = std::env::var("QUEUEDECK_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(cli.command, config).await {
        tracing::error!("Console error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(command: Command, config: AppConfig) -> Result<(), AppError> {
    let store = Arc::new(FileStore::open(&config.storage.path).await?);
    let session = Arc::new(SessionState::new(store.clone()));
    let tokens = Arc::new(TokenStore::new());
    let refresher = Arc::new(HttpTokenRefresher::new(&config.api, &config.auth)?);
    let lifecycle =
        SessionLifecycleManager::new(session.clone(), tokens.clone(), store.clone(), refresher);

    lifecycle.initialize().await?;

    match command {
        Command::Status => {
            let view = session.view().await;
            println!("phase:          {:?}", lifecycle.phase().await);
            match &view.user {
                Some(user) => {
                    println!("user:           {} <{}>", user.username, user.email);
                    println!("superuser:      {}", view.is_superuser);
                    match &view.active_tenant {
                        Some(tenant) => {
                            println!("active tenant:  {} ({})", tenant.name, tenant.slug);
                            println!("role:           {}", tenant.role);
                        }
                        None => println!("active tenant:  none"),
                    }
                    println!("memberships:    {}", view.tenant_memberships.len());
                }
                None => println!("user:           not signed in"),
            }
        }
        Command::Logout => {
            lifecycle.logout().await;
            println!("Signed out.");
        }
        Command::Tail { path } => {
            let endpoint = endpoint::resolve(&config.api.origin, &path)?;
            let manager = ConnectionManager::websocket(&config.realtime, Arc::new(StdoutObserver));
            tracing::info!(endpoint = %endpoint, "Tailing real-time channel; Ctrl+C to stop");
            manager.connect(&endpoint).await;

            tokio::signal::ctrl_c()
                .await
                .map_err(|e| AppError::internal(format!("Signal handler failed: {e}")))?;
            manager.disconnect().await;
        }
    }

    Ok(())
}

/// Prints every inbound envelope as one JSON line.
struct StdoutObserver;

#[async_trait]
impl ConnectionObserver for StdoutObserver {
    async fn on_message(&self, envelope: Envelope) {
        match envelope.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "Unprintable envelope"),
        }
    }

    async fn on_error(&self, error: &AppError) {
        tracing::warn!(error = %error, "Real-time channel error");
    }

    async fn on_disconnect(&self) {
        tracing::info!("Real-time channel closed");
    }
}
