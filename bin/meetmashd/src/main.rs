//! `meetmashd` — the MeetMash server binary.
//!
//! Usage:
//!   meetmashd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/meetmash/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod accounts;
mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use bot::orchestrator::{HttpOrchestrator, Orchestrator, RetryPolicy};
use bot::BotModule;
use meeting::store::{MeetingStore, SqliteStore, UserStore};
use meeting::MeetingModule;
use meetmash_core::identity::IdentityResolver;
use meetmash_core::Module;

use config::ServerConfig;
use routes::AppState;

/// MeetMash server.
#[derive(Parser, Debug)]
#[command(name = "meetmashd", about = "MeetMash server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides default 0.0.0.0:8080).
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    let store = Arc::new(
        SqliteStore::open(&data_dir.join("meetmash.db"))
            .map_err(|e| anyhow::anyhow!("failed to open store: {}", e))?,
    );
    let meetings: Arc<dyn MeetingStore> = store.clone();
    let users: Arc<dyn UserStore> = store;

    // Orchestrator client.
    let orchestrator: Arc<dyn Orchestrator> = Arc::new(HttpOrchestrator::with_retry(
        server_config.orchestrator.base_url.as_str(),
        RetryPolicy {
            attempts: server_config.orchestrator.retry_attempts,
            backoff: Duration::from_millis(server_config.orchestrator.retry_backoff_ms),
        },
    ));

    // Initialize modules.
    let meeting_module = MeetingModule::new(meetings.clone(), users.clone());
    info!("Meeting module initialized");
    let bot_module = BotModule::new(meetings, orchestrator);
    info!("Bot module initialized");

    // Identity resolution shared by all routes.
    let resolver = Arc::new(IdentityResolver::new(
        &server_config.session.secret,
        server_config.keys.orchestrator.clone(),
        server_config.keys.user_reader.clone(),
    ));

    let state = AppState {
        users,
        config: Arc::new(server_config),
    };

    let app = routes::build_router(
        state,
        vec![&meeting_module as &dyn Module, &bot_module as &dyn Module],
        resolver,
    );

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("MeetMash server listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
