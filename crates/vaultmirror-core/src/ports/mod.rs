//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. The sync engine depends on these traits; their
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`INodeStore`] - Relational table mirroring the vault's folder/file tree
//! - [`IBlobStore`] - Object store holding images and processed document content
//! - [`IVaultReader`] - Read access to the live vault on disk

pub mod blob_store;
pub mod node_store;
pub mod vault_reader;

pub use blob_store::IBlobStore;
pub use node_store::INodeStore;
pub use vault_reader::IVaultReader;
