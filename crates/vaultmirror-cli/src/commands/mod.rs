//! CLI commands and the session they share
//!
//! Every command that touches the stores goes through [`Session::open`],
//! which connects the node store and the object store once, starts the
//! engine and hands back everything needed to run. [`Session::close`]
//! releases the database pool.

pub mod config;
pub mod push;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use vaultmirror_blob::S3BlobStore;
use vaultmirror_core::config::Config;
use vaultmirror_store::DatabasePool;
use vaultmirror_sync::{EngineOptions, LocalVault, SyncEngine};

/// Logged and returned when either store cannot be brought up
const STARTUP_FAILURE: &str = "The database could not be initialized. Please check the settings";

/// Flags accepted by every subcommand
#[derive(Debug, Args)]
pub struct GlobalOptions {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Vault root, overriding `vault.root`
    #[arg(long, global = true)]
    pub vault: Option<PathBuf>,

    /// Keep nodes in a local SQLite file instead of PostgreSQL
    #[arg(long, global = true)]
    pub local_db: Option<PathBuf>,
}

impl GlobalOptions {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Loads the config file (defaults when absent) and applies overrides
    pub fn load_config(&self) -> Result<Config> {
        let path = self.config_path();
        let mut config = if path.exists() {
            Config::load(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        } else {
            Config::default()
        };

        if let Some(vault) = &self.vault {
            config.vault.root = vault.clone();
        }
        Ok(config)
    }
}

/// Stores and engine for one command run
pub struct Session {
    pub config: Config,
    pub pool: DatabasePool,
    pub engine: Arc<SyncEngine>,
    pub vault: LocalVault,
}

impl Session {
    /// Connects both stores and starts the engine
    ///
    /// Any store failure is logged with the startup notice and aborts the
    /// command; the engine never runs against a half-initialized backend.
    pub async fn open(config: Config, local_db: Option<&Path>) -> Result<Self> {
        let root = expand_tilde(&config.vault.root);
        if !root.is_dir() {
            bail!("Vault root {} is not a directory", root.display());
        }

        let pool = match local_db {
            Some(path) => DatabasePool::open_sqlite(path).await,
            None => DatabasePool::connect(&config.connection).await,
        }
        .map_err(|e| startup_failure(e.into()))?;

        let blobs = match S3BlobStore::connect(&config.connection).await {
            Ok(blobs) => blobs,
            Err(e) => {
                pool.close().await;
                return Err(startup_failure(e.into()));
            }
        };

        let vault = LocalVault::new(root);
        let engine = match SyncEngine::start(
            pool.node_store(),
            Arc::new(blobs),
            Arc::new(vault.clone()),
            EngineOptions::from(&config.vault),
        )
        .await
        {
            Ok(engine) => engine,
            Err(e) => {
                pool.close().await;
                return Err(startup_failure(e.into()));
            }
        };

        info!(vault = %vault.root().display(), "Session opened");
        Ok(Self {
            config,
            pool,
            engine: Arc::new(engine),
            vault,
        })
    }

    pub async fn close(self) {
        self.pool.close().await;
        info!("Session closed");
    }
}

fn startup_failure(e: anyhow::Error) -> anyhow::Error {
    error!(error = %format!("{e:#}"), "{}", STARTUP_FAILURE);
    e.context(STARTUP_FAILURE)
}

/// Expands a leading `~` to the user's home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(raw) = path.to_str() else {
        return path.to_path_buf();
    };
    if let Some(stripped) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    } else if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    path.to_path_buf()
}

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
pub async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}
