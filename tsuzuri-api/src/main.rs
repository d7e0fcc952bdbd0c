//! tsuzuri-api - typing practice backend
//!
//! Configuration priority: command line, then environment, then the TOML
//! file, then built-in defaults.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tsuzuri_api::services::OpenAiClient;
use tsuzuri_api::{build_router, AppState};
use tsuzuri_common::config::TomlConfig;
use tsuzuri_common::db::init_database;

/// Command-line arguments for tsuzuri-api
#[derive(Parser, Debug)]
#[command(name = "tsuzuri-api")]
#[command(about = "Typing practice backend")]
#[command(version)]
struct Args {
    /// Configuration file (default: ~/.config/tsuzuri/config.toml)
    #[arg(short, long, env = "TSUZURI_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;
    config
        .apply_env()
        .context("Failed to apply environment overrides")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database) = args.database {
        config.database_path = Some(database);
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                let level = &config.logging.level;
                format!("tsuzuri_api={level},tsuzuri_common={level},tower_http=info").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tsuzuri-api v{}", env!("CARGO_PKG_VERSION"));
    // Config is read before the subscriber exists, so report its origin here
    match &config.source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No config file found, using built-in defaults"),
    }

    let db_path = config.resolved_database_path();
    info!("Database: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let generator = OpenAiClient::new(&config.generative)
        .context("Failed to build generative client")?;
    info!(
        endpoint = generator.endpoint(),
        model = %config.generative.model,
        "Generative client ready"
    );
    if config
        .generative
        .api_key
        .as_deref()
        .map_or(true, |key| key.trim().is_empty())
    {
        warn!("No API key configured; /api/prompt will answer 502");
    }

    let state = AppState::new(pool, Arc::new(generator), &config);
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/api/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
