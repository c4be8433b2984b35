//! Coverlab Router
//!
//! Classroom HTTP service: accepts student samples, computes their
//! confidence intervals and appends them to the shared ledger, and serves
//! the class-wide coverage summary.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::RouterConfig;
use coverlab_store::{CachedLedger, LedgerHandle, LedgerWriter, MemoryLedger, SqliteLedger, StoreError};
use handlers::{create_router, AppState};
use tokio::net::TcpListener;
use tracing::info;

/// Router error
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Ledger backend could not be opened
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Open the configured ledger and build the shared state.
///
/// Must be called from within a tokio runtime; the ledger worker is spawned
/// here.
pub fn build_state(config: &RouterConfig) -> Result<AppState, RouterError> {
    let params = config.population_parameters()?;
    let writer = LedgerWriter::new(config.ledger.timeout()).with_queue_depth(config.ledger.queue_depth);

    let handle: LedgerHandle = match &config.ledger.path {
        Some(path) => {
            info!("Ledger: SQLite at {}", path.display());
            writer.spawn(SqliteLedger::new(path)?)
        }
        None => {
            info!("Ledger: in memory (records are lost on restart)");
            writer.spawn(MemoryLedger::new())
        }
    };

    info!(
        "Ledger call timeout: {} ms, queue depth: {}",
        handle.timeout().as_millis(),
        config.ledger.queue_depth
    );
    let ledger = CachedLedger::new(handle, config.ledger.cache_ttl());
    info!("Results cache TTL: {} s", ledger.ttl().as_secs());
    Ok(AppState::new(params, ledger, config.reveal_population_mean))
}

/// Start the Router HTTP server
///
/// Opens the ledger, builds the routes and serves until the process exits.
pub async fn start_server(config: RouterConfig) -> Result<(), RouterError> {
    info!("Starting Coverlab Router");
    info!("Bind address: {}", config.bind_addr());
    info!(
        "Population: σ = {}, n = {}, range [{}, {}]",
        config.population.std_dev,
        config.population.sample_size,
        config.population.min_allowed_value,
        config.population.max_allowed_value
    );

    let state = build_state(&config)?;
    let app = create_router(state);

    // Bind and serve
    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Router listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| RouterError::Server(e.to_string()))?;

    Ok(())
}
