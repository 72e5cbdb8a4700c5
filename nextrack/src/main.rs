//! nextrack - Main entry point
//!
//! Startup sequence: load and validate configuration, open the
//! key-value store, ingest the catalog and precomputed recommendation
//! files, wire the recommender chains, serve HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use nextrack_common::catalog::Catalog;
use nextrack_common::config::{load_toml, resolve_config_path};
use nextrack_common::store::{KvStore, MemoryStore, ModelStore, SqliteStore};
use tokio::signal;
use tracing::info;

use nextrack::config::ServiceConfig;
use nextrack::datalog::DataLogger;
use nextrack::ingest::{self, RecordKey};
use nextrack::recommend::{Method, TopPop};
use nextrack::{build_recommenders, build_router, AppState, CONTEXT_NAMESPACE, TRACKS_NAMESPACE};

/// Command-line arguments for nextrack
#[derive(Parser, Debug)]
#[command(name = "nextrack")]
#[command(about = "Next-track music recommendation service")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured listen address
    #[arg(short, long, env = "NEXTRACK_BIND_ADDR")]
    bind_addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Starting nextrack v{}", env!("CARGO_PKG_VERSION"));

    let config_path = resolve_config_path(
        args.config.as_deref(),
        "NEXTRACK_CONFIG",
        "nextrack.toml",
    );

    let mut config: ServiceConfig = if config_path.exists() {
        info!("Loading configuration from {}", config_path.display());
        load_toml(&config_path)?
    } else {
        info!(
            "No config file at {}, using defaults",
            config_path.display()
        );
        ServiceConfig::default()
    };
    if let Some(bind_addr) = args.bind_addr {
        config.bind_addr = bind_addr;
    }
    config.validate().context("Invalid configuration")?;

    // Open the key-value store
    let store: Arc<dyn KvStore> = match &config.store_path {
        Some(path) => Arc::new(SqliteStore::open(path).await?),
        None => {
            info!("No store_path configured, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    // Load the catalog and ingest everything into the store
    let catalog = Arc::new(Catalog::load(&config.catalog_path)?);
    info!(
        "Loaded catalog with {} tracks from {}",
        catalog.len(),
        config.catalog_path.display()
    );

    ingest::upload_tracks(&catalog, &ModelStore::new(store.clone(), TRACKS_NAMESPACE)).await?;

    let user_keyed = [
        (Method::Lgcf.as_str(), &config.recommendations.lgcf),
        (Method::Lfm.as_str(), &config.recommendations.lfm),
        (Method::Dssm.as_str(), &config.recommendations.dssm),
    ];
    for (name, path) in user_keyed {
        if let Some(path) = path {
            ingest::upload_recommendations(
                path,
                &ModelStore::new(store.clone(), name),
                RecordKey::User,
            )
            .await?;
        }
    }
    if let Some(path) = &config.recommendations.contextual {
        ingest::upload_recommendations(
            path,
            &ModelStore::new(store.clone(), CONTEXT_NAMESPACE),
            RecordKey::Track,
        )
        .await?;
    }

    let top_tracks = match &config.top_tracks_path {
        Some(path) => {
            let tracks = TopPop::load_from_json(path)?;
            info!("Loaded {} top tracks from {}", tracks.len(), path.display());
            tracks
        }
        None => Vec::new(),
    };

    // Wire the serving chains
    let (session, control) =
        build_recommenders(store.clone(), &catalog, top_tracks, config.dionis.clone())?;

    let data_logger = Arc::new(DataLogger::open(&config.data_log_path).await?);

    let state = AppState {
        tracks: ModelStore::new(store, TRACKS_NAMESPACE),
        session,
        control,
        data_logger,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!("nextrack listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
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
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
