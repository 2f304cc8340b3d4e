//! `gasworkd` — the calibration-workshop server binary.
//!
//! Usage:
//!   gasworkd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/gaswork/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod bootstrap;
mod certificate;
mod config;
mod login;
mod routes;

use std::sync::Arc;

use clap::Parser;
use jsonwebtoken::{DecodingKey, Validation};
use gaswork_core::Module;
use tracing::info;

use auth_middleware::JwtState;
use certificate::JsonCertificateRenderer;
use config::ServerConfig;
use routes::AppState;

/// Gas-detector calibration workshop server.
#[derive(Parser, Debug)]
#[command(name = "gasworkd", about = "Calibration workshop server")]
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

    let sql = gaswork_sql::SqliteStore::open(&server_config.sqlite_path())
        .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?;

    let workshop_service = gaswork_workshop::service::WorkshopService::new(Box::new(sql))
        .map_err(|e| anyhow::anyhow!("failed to initialize workshop service: {}", e))?
        .with_renderer(Box::new(JsonCertificateRenderer));
    let workshop_module = gaswork_workshop::WorkshopModule::new(workshop_service);
    info!("Workshop module initialized");

    let module_routes = vec![(workshop_module.name(), workshop_module.routes())];

    // Build JWT state for middleware.
    let jwt_state = Arc::new(JwtState {
        decoding_key: DecodingKey::from_secret(server_config.jwt.secret.as_bytes()),
        validation: Validation::default(),
    });

    let server_config = Arc::new(server_config);

    // Build application state.
    let app_state = AppState {
        jwt_state,
        server_config,
    };

    // Build router.
    let app = routes::build_router(app_state, module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("gaswork server listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
