//! Vault reader port (driven/secondary port)
//!
//! Read-only access to the live vault. Entries handed out by the reader are
//! vault-relative; adapters decide how they map to real storage.

use crate::domain::{VaultEntry, VaultPath};

/// Port trait for reading the vault
#[async_trait::async_trait]
pub trait IVaultReader: Send + Sync {
    /// Reads the full textual content of a document
    async fn read_text(&self, entry: &VaultEntry) -> anyhow::Result<String>;

    /// Reads the raw bytes of a file
    async fn read_bytes(&self, entry: &VaultEntry) -> anyhow::Result<Vec<u8>>;

    /// Lists the direct children of a folder
    async fn list_children(&self, folder: &VaultEntry) -> anyhow::Result<Vec<VaultEntry>>;

    /// Resolves a folder by path, `None` if no folder exists there
    async fn folder(&self, path: &VaultPath) -> anyhow::Result<Option<VaultEntry>>;
}
