use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use podscout_core::{
    load_config, validate_config, ContentProvider, ItunesClient, PodcastCatalog, SqliteCatalog,
};
use podscout_server::{api::create_router, state::AppState};

/// Environment variable naming an explicit config file.
const CONFIG_ENV: &str = "PODSCOUT_CONFIG";

/// Config file picked up from the working directory when present.
const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path: explicit env var, else ./config.toml if present
    let config_path = match std::env::var(CONFIG_ENV) {
        Ok(path) => Some(PathBuf::from(path)),
        Err(_) => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        }
    };

    match &config_path {
        Some(path) => info!("Loading configuration from {:?}", path),
        None => info!("No config file, using defaults and environment"),
    }
    let config = load_config(config_path.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");

    // Create SQLite catalog
    let catalog: Arc<dyn PodcastCatalog> = Arc::new(
        SqliteCatalog::new(&config.database.path, config.database.busy_timeout())
            .context("Failed to open podcast catalog")?,
    );
    info!("Podcast catalog initialized at {:?}", config.database.path);

    // Create iTunes client
    let provider: Arc<dyn ContentProvider> = Arc::new(
        ItunesClient::new(&config.provider).context("Failed to create iTunes client")?,
    );
    info!("Using content provider at {}", config.provider.base_url);

    let addr = SocketAddr::new(config.server.host, config.server.port);

    // Create app state and router
    let state = Arc::new(AppState::new(config, provider, catalog));
    info!(
        config = %serde_json::to_string(&state.sanitized_config()).unwrap_or_default(),
        "Effective configuration"
    );
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) if e.kind() == ErrorKind::AddrInUse => {
            bail!(
                "Address {} is already in use; stop the other process or set PODSCOUT_SERVER__PORT",
                addr
            );
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to bind to {}", addr)),
    };

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
