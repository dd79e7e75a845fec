//! vaultmirror Sync - Tree-to-relational mirror engine
//!
//! Keeps the node table and the object store consistent with the live vault:
//! - Classifies entries as images, drawing exports or tracked documents
//! - Resolves vault paths to node ids, creating missing ancestors
//! - Applies create/delete/modify/rename events to both stores
//! - Watches the vault on disk and feeds events to the engine
//!
//! ## Modules
//!
//! - [`classify`] - Entry classification and upload content types
//! - [`content`] - Link rewriting and comment stripping for uploads
//! - [`resolver`] - Path Resolver over the node store
//! - [`engine`] - Sync Engine event handlers
//! - [`filesystem`] - Local vault reader
//! - [`watcher`] - `notify`-based watcher and event coalescing
//! - [`dispatcher`] - Watch loop feeding events to the engine

pub mod classify;
pub mod content;
pub mod dispatcher;
pub mod engine;
pub mod filesystem;
pub mod resolver;
pub mod watcher;

pub use classify::EntryClass;
pub use content::ContentProcessor;
pub use dispatcher::{DispatchStats, EventDispatcher};
pub use engine::{EngineOptions, PushSummary, SyncEngine, SyncOutcome};
pub use filesystem::LocalVault;
pub use resolver::PathResolver;
pub use watcher::{ChangeEvent, FileWatcher};

use thiserror::Error;

/// Errors that can occur while setting up or running the mirror
#[derive(Debug, Error)]
pub enum SyncError {
    /// A backing store could not be initialized; the mirror stays disabled
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The filesystem watcher failed
    #[error("Watch error: {0}")]
    Watch(String),

    /// An I/O error occurred while reading the vault
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A domain-level error propagated from vaultmirror-core
    #[error("Domain error: {0}")]
    Domain(#[from] vaultmirror_core::domain::DomainError),
}
