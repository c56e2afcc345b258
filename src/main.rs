//! # Storefront Server Main Driver
//!
//! ## Purpose
//! Main entry point for the storefront catalog server. Loads configuration,
//! builds the catalog and query engine, and starts the web server.
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Load the product catalog (embedded reference data or a configured file)
//! 4. Wire up the query engine and application state
//! 5. Start the REST API server
//! 6. Handle shutdown signals gracefully

use clap::{Arg, Command};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use storefront_catalog::{
    api::ApiServer,
    catalog::{CatalogSource, StaticCatalog},
    config::Config,
    engine::QueryEngine,
    errors::{CatalogError, Result},
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("storefront-server")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Storefront Team")
        .about("Demo e-commerce storefront backend with an in-memory catalog query engine")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Server port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("check-health")
                .long("check-health")
                .help("Validate configuration and catalog data, then exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // Load configuration
    let config_path = matches.get_one::<String>("config").unwrap();
    let mut config = Config::from_file(config_path)?;

    // Override port if specified
    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }

    let config = Arc::new(config);

    // Initialize logging
    init_logging(&config)?;

    info!("Starting Storefront Catalog Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", config_path);

    // Run health checks if requested
    if matches.get_flag("check-health") {
        return run_health_checks(&config);
    }

    // Initialize application components
    let app_state = initialize_components(config.clone())?;

    // Start the API server
    let server = ApiServer::new(app_state);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("Server error: {}", e);
        }
    });

    info!(
        "Storefront Catalog Server started on {}:{}",
        config.server.host, config.server.port
    );

    // Wait for shutdown signal
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = server_handle => {
            warn!("Server stopped unexpectedly");
        }
    }

    info!("Storefront Catalog Server shut down");
    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    let log_level: tracing::Level =
        config
            .logging
            .level
            .parse()
            .map_err(|_| CatalogError::Config {
                message: format!("Invalid log level: {}", config.logging.level),
            })?;

    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true);

    if config.logging.json_format {
        tracing_subscriber::registry()
            .with(fmt_layer.json().with_filter(filter))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt_layer.with_filter(filter))
            .init();
    }

    info!("Logging initialized with level: {}", config.logging.level);
    Ok(())
}

/// Initialize all application components
fn initialize_components(config: Arc<Config>) -> Result<AppState> {
    info!("Initializing application components...");

    info!("Loading product catalog...");
    let catalog = Arc::new(StaticCatalog::load(&config.catalog)?);

    info!("Initializing query engine...");
    let engine = Arc::new(QueryEngine::new(catalog));

    info!(
        "All components initialized ({} products)",
        engine.products().len()
    );

    Ok(AppState { config, engine })
}

/// Validate configuration and catalog data without starting the server
fn run_health_checks(config: &Config) -> Result<()> {
    info!("Running health checks...");

    info!("✓ Configuration is valid");

    let catalog = StaticCatalog::load(&config.catalog)?;
    info!("✓ Catalog loads ({} products)", catalog.all().len());

    info!("All health checks passed!");
    Ok(())
}
