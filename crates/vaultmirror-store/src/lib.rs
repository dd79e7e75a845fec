//! vaultmirror Store - Relational mirror of the vault tree
//!
//! Persists the vault's folder/file structure in a single self-referential
//! `node` table:
//! - One row per folder, file and content-shadow entry
//! - `parent_id` references `node.id` with `ON DELETE CASCADE`
//! - `(parent_id, data)` is unique, so inserts are idempotent upserts
//!
//! ## Architecture
//!
//! This crate implements the `INodeStore` port from `vaultmirror-core` using
//! `sqlx`. It is a driven (secondary) adapter in the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool for PostgreSQL or SQLite
//! - [`PgNodeStore`] - `INodeStore` over PostgreSQL (production)
//! - [`SqliteNodeStore`] - `INodeStore` over SQLite (local runs and tests)
//! - [`StoreError`] - Error types for store operations
//!
//! ## Usage
//!
//! ```no_run
//! use vaultmirror_core::config::Settings;
//! use vaultmirror_store::DatabasePool;
//!
//! # async fn example(settings: &Settings) -> anyhow::Result<()> {
//! let pool = DatabasePool::connect(settings).await?;
//! let nodes = pool.node_store();
//! let root = nodes.ensure_schema().await?;
//! # let _ = root;
//! pool.close().await;
//! # Ok(())
//! # }
//! ```

pub mod pool;
pub mod repository;

pub use pool::DatabasePool;
pub use repository::{PgNodeStore, SqliteNodeStore};

use vaultmirror_core::domain::NodeId;

/// Errors that can occur during node store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Creating the node table or the root row failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// An insert or update referenced a parent that does not exist
    #[error("Parent node {0} not found")]
    ParentNotFound(NodeId),

    /// An update targeted a node that does not exist
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    /// An update would give two siblings the same name
    #[error("Node {parent} already has a child named {data:?}")]
    NameTaken { parent: NodeId, data: String },
}

impl StoreError {
    /// Whether the error means a referenced node is missing
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::ParentNotFound(_) | StoreError::NodeNotFound(_)
        )
    }

    /// Maps a failed insert/update, classifying constraint violations
    pub(crate) fn from_write(e: sqlx::Error, parent: NodeId, data: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_foreign_key_violation() {
                return StoreError::ParentNotFound(parent);
            }
            if db_err.is_unique_violation() {
                return StoreError::NameTaken {
                    parent,
                    data: data.to_string(),
                };
            }
        }
        StoreError::from(e)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::QueryFailed(e.to_string())
    }
}
