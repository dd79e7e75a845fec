//! vaultmirror Core - Domain types and port definitions
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `NodeId`, `VaultPath`, `VaultEntry`, `VaultEvent`, `BlobKey`
//! - **Port definitions** - Traits for adapters: `INodeStore`, `IBlobStore`, `IVaultReader`
//! - **Configuration** - Connection settings and vault options loaded from YAML
//!
//! # Architecture
//!
//! The domain module contains pure types with no I/O. Ports define the trait
//! interfaces that the store, blob and sync crates implement or consume.

pub mod config;
pub mod domain;
pub mod ports;
