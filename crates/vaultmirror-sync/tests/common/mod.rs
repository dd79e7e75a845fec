//! Shared fixtures for sync engine tests
//!
//! The engine runs against the real SQLite node store, an in-memory object
//! store and an in-memory vault.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use vaultmirror_core::domain::{EntryKind, EntryRef, NodeId, VaultEntry, VaultPath};
use vaultmirror_core::ports::{IBlobStore, INodeStore, IVaultReader};
use vaultmirror_store::DatabasePool;
use vaultmirror_sync::{EngineOptions, SyncEngine};

pub const BASE_URL: &str = "http://blobs.test/vault/";

// ============================================================================
// MemoryBlobStore
// ============================================================================

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    fail_removes: AtomicBool,
}

impl MemoryBlobStore {
    pub fn text(&self, key: &str) -> Option<String> {
        let objects = self.objects.lock().unwrap();
        objects
            .get(key)
            .map(|(bytes, _)| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        let objects = self.objects.lock().unwrap();
        objects.get(key).map(|(_, content_type)| content_type.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Makes every following `remove` fail with a server error
    pub fn fail_removes(&self) {
        self.fail_removes.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl IBlobStore for MemoryBlobStore {
    async fn put(
        &self,
        key: &vaultmirror_core::domain::BlobKey,
        content: Vec<u8>,
        content_type: &str,
    ) -> anyhow::Result<()> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (content, content_type.to_string()));
        Ok(())
    }

    async fn remove(&self, key: &vaultmirror_core::domain::BlobKey) -> anyhow::Result<bool> {
        if self.fail_removes.load(Ordering::SeqCst) {
            anyhow::bail!("object store unreachable");
        }
        Ok(self.objects.lock().unwrap().remove(key.as_str()).is_some())
    }

    fn base_url(&self) -> String {
        BASE_URL.to_string()
    }
}

// ============================================================================
// MemoryVault
// ============================================================================

/// Vault held in memory; `None` marks a folder
#[derive(Default)]
pub struct MemoryVault {
    entries: Mutex<BTreeMap<String, Option<Vec<u8>>>>,
}

impl MemoryVault {
    pub fn add_file(&self, path: &str, content: impl Into<Vec<u8>>) -> VaultEntry {
        let path = vault_path(path);
        let mut entries = self.entries.lock().unwrap();
        insert_parents(&mut entries, &path);
        entries.insert(path.as_str().to_string(), Some(content.into()));
        VaultEntry::file(path)
    }

    pub fn add_folder(&self, path: &str) -> VaultEntry {
        let path = vault_path(path);
        let mut entries = self.entries.lock().unwrap();
        insert_parents(&mut entries, &path);
        entries.insert(path.as_str().to_string(), None);
        VaultEntry::folder(path)
    }

    pub fn write(&self, path: &str, content: impl Into<Vec<u8>>) {
        self.entries
            .lock()
            .unwrap()
            .insert(vault_path(path).as_str().to_string(), Some(content.into()));
    }

    /// Removes an entry and everything below it
    pub fn remove(&self, path: &str) {
        let prefix = format!("{path}/");
        self.entries
            .lock()
            .unwrap()
            .retain(|key, _| key != path && !key.starts_with(&prefix));
    }

    /// Moves an entry and everything below it, returning the moved entry
    pub fn rename(&self, old: &str, new: &str) -> VaultEntry {
        let new_path = vault_path(new);
        let prefix = format!("{old}/");
        let mut entries = self.entries.lock().unwrap();

        let moved: Vec<(String, Option<Vec<u8>>)> = entries
            .iter()
            .filter(|(key, _)| key.as_str() == old || key.starts_with(&prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        assert!(!moved.is_empty(), "nothing to rename at {old}");

        insert_parents(&mut entries, &new_path);
        let mut kind = EntryKind::File;
        for (key, value) in moved {
            entries.remove(&key);
            if key == old && value.is_none() {
                kind = EntryKind::Folder;
            }
            let renamed = format!("{new}{}", &key[old.len()..]);
            entries.insert(renamed, value);
        }
        VaultEntry::new(new_path, kind)
    }
}

fn insert_parents(entries: &mut BTreeMap<String, Option<Vec<u8>>>, path: &VaultPath) {
    let mut current = path.parent();
    while let Some(parent) = current {
        if parent.is_root() {
            break;
        }
        entries.entry(parent.as_str().to_string()).or_insert(None);
        current = parent.parent();
    }
}

#[async_trait::async_trait]
impl IVaultReader for MemoryVault {
    async fn read_text(&self, entry: &VaultEntry) -> anyhow::Result<String> {
        let bytes = self.read_bytes(entry).await?;
        Ok(String::from_utf8(bytes)?)
    }

    async fn read_bytes(&self, entry: &VaultEntry) -> anyhow::Result<Vec<u8>> {
        match self.entries.lock().unwrap().get(entry.path().as_str()) {
            Some(Some(bytes)) => Ok(bytes.clone()),
            Some(None) => anyhow::bail!("{entry} is a folder"),
            None => anyhow::bail!("{entry} does not exist"),
        }
    }

    async fn list_children(&self, folder: &VaultEntry) -> anyhow::Result<Vec<VaultEntry>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .filter_map(|(key, value)| {
                let path = vault_path(key);
                (path.parent().as_ref() == Some(folder.path())).then(|| match value {
                    Some(_) => VaultEntry::file(path),
                    None => VaultEntry::folder(path),
                })
            })
            .collect())
    }

    async fn folder(&self, path: &VaultPath) -> anyhow::Result<Option<VaultEntry>> {
        if path.is_root() {
            return Ok(Some(VaultEntry::root()));
        }
        let entries = self.entries.lock().unwrap();
        Ok(match entries.get(path.as_str()) {
            Some(None) => Some(VaultEntry::folder(path.clone())),
            _ => None,
        })
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub engine: SyncEngine,
    pub nodes: Arc<dyn INodeStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub vault: Arc<MemoryVault>,
    pub root: NodeId,
}

impl Harness {
    /// Node of the entry at `path`, without creating anything
    pub async fn node_at(&self, path: &str) -> Option<NodeId> {
        let entry = VaultEntry::file(vault_path(path));
        self.engine
            .resolver()
            .lookup(EntryRef::ByHandle(&entry))
            .await
            .unwrap()
    }
}

pub async fn harness() -> Harness {
    let pool = DatabasePool::in_memory()
        .await
        .expect("Failed to create in-memory database");
    let nodes = pool.node_store();
    let blobs = Arc::new(MemoryBlobStore::default());
    let vault = Arc::new(MemoryVault::default());

    let engine = SyncEngine::start(
        Arc::clone(&nodes),
        blobs.clone(),
        vault.clone(),
        EngineOptions::default(),
    )
    .await
    .expect("Failed to start engine");
    let root = engine.resolver().root();

    Harness {
        engine,
        nodes,
        blobs,
        vault,
        root,
    }
}

pub fn vault_path(s: &str) -> VaultPath {
    VaultPath::new(s).unwrap()
}

pub fn file(s: &str) -> VaultEntry {
    VaultEntry::file(vault_path(s))
}

pub fn folder(s: &str) -> VaultEntry {
    VaultEntry::folder(vault_path(s))
}
