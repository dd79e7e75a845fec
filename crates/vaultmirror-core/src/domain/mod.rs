//! Domain types
//!
//! - Newtypes for node identifiers, blob keys and vault paths
//! - Vault entries and the filesystem events that carry them
//! - Domain-specific error types

pub mod entry;
pub mod errors;
pub mod newtypes;

pub use entry::{EntryKind, EntryRef, VaultEntry, VaultEvent};
pub use errors::DomainError;
pub use newtypes::{BlobKey, NodeId, VaultPath};
