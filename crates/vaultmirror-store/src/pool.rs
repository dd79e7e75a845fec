//! Database connection pool management
//!
//! Wraps either a PostgreSQL or a SQLite `sqlx` pool:
//! - PostgreSQL built from the connection settings for production use
//! - SQLite file databases with automatic directory creation
//! - In-memory SQLite for testing
//!
//! The pool is constructed once at startup, handed to the node store and
//! closed explicitly on shutdown.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use vaultmirror_core::config::Settings;
use vaultmirror_core::ports::INodeStore;

use crate::repository::{PgNodeStore, SqliteNodeStore};
use crate::StoreError;

/// A pool of connections to the relational store
#[derive(Clone)]
pub enum DatabasePool {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl DatabasePool {
    /// Connects to PostgreSQL using the `POSTGRES_*` settings
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConnectionFailed` if the port is invalid or the
    /// server cannot be reached.
    pub async fn connect(settings: &Settings) -> Result<Self, StoreError> {
        let port = settings
            .postgres_port()
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let options = PgConnectOptions::new()
            .host(&settings.postgres_host)
            .port(port)
            .database(&settings.postgres_database)
            .username(&settings.postgres_username)
            .password(&settings.postgres_password);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| {
                StoreError::ConnectionFailed(format!(
                    "Failed to connect to {}:{}/{}: {}",
                    settings.postgres_host, port, settings.postgres_database, e
                ))
            })?;

        tracing::info!(
            host = %settings.postgres_host,
            port,
            database = %settings.postgres_database,
            "Database pool initialized"
        );

        Ok(DatabasePool::Postgres(pool))
    }

    /// Opens (or creates) a SQLite database file
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConnectionFailed` if the directory or the database
    /// cannot be created.
    pub async fn open_sqlite(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::ConnectionFailed(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| {
                StoreError::ConnectionFailed(format!(
                    "Failed to connect to database at {}: {}",
                    db_path.display(),
                    e
                ))
            })?;

        tracing::info!(path = %db_path.display(), "Database pool initialized");

        Ok(DatabasePool::Sqlite(pool))
    }

    /// Creates an in-memory SQLite pool for testing
    ///
    /// Uses a single connection that is never recycled, since an in-memory
    /// database lives exactly as long as its connection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConnectionFailed` if the connection cannot be established.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| {
                StoreError::ConnectionFailed(format!("Failed to create in-memory database: {}", e))
            })?;

        tracing::debug!("In-memory database pool initialized");

        Ok(DatabasePool::Sqlite(pool))
    }

    /// Node store backed by this pool
    pub fn node_store(&self) -> Arc<dyn INodeStore> {
        match self {
            DatabasePool::Postgres(pool) => Arc::new(PgNodeStore::new(pool.clone())),
            DatabasePool::Sqlite(pool) => Arc::new(SqliteNodeStore::new(pool.clone())),
        }
    }

    /// Closes every connection; in-flight queries finish first
    pub async fn close(&self) {
        match self {
            DatabasePool::Postgres(pool) => pool.close().await,
            DatabasePool::Sqlite(pool) => pool.close().await,
        }
        tracing::debug!("Database pool closed");
    }
}
