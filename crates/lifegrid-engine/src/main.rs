//! LifeGrid server binary.
//!
//! Wires together configuration, logging, the shared simulation state,
//! the ticker, and the HTTP + `WebSocket` server, then runs until
//! `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `lifegrid-config.yaml` (or `LIFEGRID_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the shared application state
//! 4. Bind and spawn the server; a bind failure exits the process
//! 5. Spawn the ticker
//! 6. Wait for `Ctrl-C`, then stop the ticker and drain the server

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lifegrid_core::config::{LifeGridConfig, LoggingConfig};
use lifegrid_server::{AppState, ServerError, spawn_server, spawn_ticker};
use tokio::sync::watch;
use tokio::task::JoinError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Config file read when `LIFEGRID_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "lifegrid-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the listener cannot be
/// bound, or the server fails while running.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it, so this comes first.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging)?;
    info!("lifegrid starting");
    match &config_path {
        Some(path) => info!(path = %path.display(), "Configuration file loaded"),
        None => info!("Config file not found, using defaults"),
    }

    config.validate().map_err(EngineError::from)?;
    info!(
        rows = config.grid.rows,
        cols = config.grid.cols,
        tick_interval_ms = config.grid.tick_interval_ms,
        random_density = config.grid.random_density,
        "Simulation configured"
    );

    // 3. Create the shared state.
    let state = Arc::new(AppState::new(&config));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // 4. Bind and spawn the server.
    let server = spawn_server(&config.server, Arc::clone(&state), shutdown_rx.clone())
        .await
        .map_err(EngineError::from)?;
    info!(addr = %server.addr, "LifeGrid ready, simulation endpoint at /ws");

    // 5. Spawn the ticker.
    let ticker = spawn_ticker(Arc::clone(&state), config.grid.tick_interval(), shutdown_rx);

    // 6. Run until Ctrl-C or until the server dies on its own.
    let mut server_task = server.task;
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(EngineError::from)?;
            info!("Shutdown requested");
        }
        result = &mut server_task => {
            warn!("Server task exited unexpectedly");
            let _ = shutdown_tx.send(true);
            server_result(result)?;
            return Ok(());
        }
    }

    let _ = shutdown_tx.send(true);
    ticker.await.map_err(|e| EngineError::Task {
        message: format!("ticker: {e}"),
    })?;
    server_result(server_task.await)?;

    info!(
        sessions = state.sessions().len(),
        generation = state.generation().await,
        "lifegrid shutdown complete"
    );
    Ok(())
}

/// Load configuration from `LIFEGRID_CONFIG` or `lifegrid-config.yaml`.
fn load_config() -> Result<(LifeGridConfig, Option<PathBuf>), EngineError> {
    resolve_config(
        std::env::var_os("LIFEGRID_CONFIG").map(PathBuf::from),
        Path::new(DEFAULT_CONFIG_PATH),
    )
}

/// Read the explicitly named config file, or the default one if present.
///
/// An explicit path must exist. Only a missing default file falls back to
/// built-in defaults (plus environment overrides), reported as `None`.
fn resolve_config(
    explicit: Option<PathBuf>,
    default_path: &Path,
) -> Result<(LifeGridConfig, Option<PathBuf>), EngineError> {
    if let Some(path) = explicit {
        let config = LifeGridConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    if default_path.exists() {
        let config = LifeGridConfig::from_file(default_path)?;
        Ok((config, Some(default_path.to_path_buf())))
    } else {
        let mut config = LifeGridConfig::default();
        config.server.apply_env_overrides()?;
        Ok((config, None))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level).map_err(|e| EngineError::Logging {
            message: format!("invalid log level {:?}: {e}", logging.level),
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let result = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}

fn server_result(result: Result<Result<(), ServerError>, JoinError>) -> Result<(), EngineError> {
    match result {
        Ok(inner) => inner.map_err(EngineError::from),
        Err(e) => Err(EngineError::Task {
            message: format!("server: {e}"),
        }),
    }
}
