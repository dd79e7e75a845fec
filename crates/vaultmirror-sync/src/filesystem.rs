//! Local vault adapter (secondary/driven adapter)
//!
//! Implements [`IVaultReader`] over a directory on disk using `tokio::fs`,
//! and converts absolute watcher paths into vault entries and events.
//!
//! Hidden entries (any path segment starting with `.`) are never part of
//! the vault; editor state folders such as `.obsidian` or `.trash` stay out
//! of the mirror.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use vaultmirror_core::domain::{EntryKind, VaultEntry, VaultEvent, VaultPath};
use vaultmirror_core::ports::IVaultReader;

use crate::watcher::ChangeEvent;

/// A vault rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalVault {
    root: PathBuf,
}

impl LocalVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a vault path
    pub fn absolute(&self, path: &VaultPath) -> PathBuf {
        if path.is_root() {
            self.root.clone()
        } else {
            self.root.join(path.as_str())
        }
    }

    /// Vault path of an absolute location
    ///
    /// Returns `None` for locations outside the vault, hidden entries and
    /// names that are not valid UTF-8.
    pub fn relative(&self, absolute: &Path) -> Option<VaultPath> {
        let rel = absolute.strip_prefix(&self.root).ok()?;
        let mut segments = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(name) => {
                    let name = name.to_str()?;
                    if name.starts_with('.') {
                        return None;
                    }
                    segments.push(name);
                }
                Component::CurDir => {}
                _ => return None,
            }
        }
        VaultPath::new(segments.join("/")).ok()
    }

    /// Entry at an absolute location, with its kind read from disk
    ///
    /// Locations that no longer exist get `missing_kind`.
    pub async fn entry_at(&self, absolute: &Path, missing_kind: EntryKind) -> Option<VaultEntry> {
        let path = self.relative(absolute)?;
        let kind = match tokio::fs::metadata(absolute).await {
            Ok(meta) if meta.is_dir() => EntryKind::Folder,
            Ok(_) => EntryKind::File,
            Err(_) => missing_kind,
        };
        Some(VaultEntry::new(path, kind))
    }

    /// Converts a watcher event into a vault event
    ///
    /// Deleted entries cannot be inspected anymore and are reported as
    /// files. Renames out of the vault become deletions and renames into it
    /// become creations.
    pub async fn event_for(&self, change: &ChangeEvent) -> Option<VaultEvent> {
        match change {
            ChangeEvent::Created(path) => self
                .entry_at(path, EntryKind::File)
                .await
                .map(VaultEvent::Created),
            ChangeEvent::Modified(path) => self
                .entry_at(path, EntryKind::File)
                .await
                .map(VaultEvent::Modified),
            ChangeEvent::Deleted(path) => self
                .relative(path)
                .map(|p| VaultEvent::Deleted(VaultEntry::file(p))),
            ChangeEvent::Renamed { old, new } => {
                let entry = self.entry_at(new, EntryKind::File).await;
                match (self.relative(old), entry) {
                    (Some(old_path), Some(entry)) => Some(VaultEvent::Renamed { entry, old_path }),
                    (None, Some(entry)) => Some(VaultEvent::Created(entry)),
                    (Some(old_path), None) => Some(VaultEvent::Deleted(VaultEntry::file(old_path))),
                    (None, None) => None,
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl IVaultReader for LocalVault {
    async fn read_text(&self, entry: &VaultEntry) -> Result<String> {
        let path = self.absolute(entry.path());
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    async fn read_bytes(&self, entry: &VaultEntry) -> Result<Vec<u8>> {
        let path = self.absolute(entry.path());
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    async fn list_children(&self, folder: &VaultEntry) -> Result<Vec<VaultEntry>> {
        let dir = self.absolute(folder.path());
        let mut reader = tokio::fs::read_dir(&dir)
            .await
            .with_context(|| format!("Failed to list {}", dir.display()))?;

        let mut children = Vec::new();
        while let Some(item) = reader.next_entry().await? {
            let Some(name) = item.file_name().to_str().map(str::to_owned) else {
                debug!(path = %item.path().display(), "Skipping non UTF-8 name");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let kind = if item.file_type().await?.is_dir() {
                EntryKind::Folder
            } else {
                EntryKind::File
            };
            children.push(VaultEntry::new(folder.path().join(&name)?, kind));
        }

        children.sort_by(|a, b| a.path().as_str().cmp(b.path().as_str()));
        Ok(children)
    }

    async fn folder(&self, path: &VaultPath) -> Result<Option<VaultEntry>> {
        match tokio::fs::metadata(self.absolute(path)).await {
            Ok(meta) if meta.is_dir() => Ok(Some(VaultEntry::folder(path.clone()))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
