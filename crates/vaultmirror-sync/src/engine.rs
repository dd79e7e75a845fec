//! Sync Engine
//!
//! The [`SyncEngine`] applies one filesystem mutation at a time to the node
//! table and the object store. It holds no state of its own beyond handles
//! to the two stores and the vault reader.
//!
//! ## Event handling
//!
//! | Event  | Image                        | Drawing export | Document                                    |
//! |--------|------------------------------|----------------|---------------------------------------------|
//! | create | put under file name          | ignored        | resolve + shadow node, upload content        |
//! | delete | remove by file name          | ignored        | delete node (cascade), remove shadow object  |
//! | modify | remove, then put             | ignored        | remove shadow object, upload content again   |
//! | rename | remove old name, put new     | ignored        | same parent: update row; else delete + create |
//!
//! ## Failure semantics
//!
//! Create, modify and rename propagate every store error. Delete treats a
//! missing node or object as success ([`SyncOutcome::AlreadyDeleted`]) but
//! propagates any other failure. The two stores are not updated atomically;
//! a crash between steps leaves an orphan object or a stale one.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use vaultmirror_core::config::VaultConfig;
use vaultmirror_core::domain::{
    BlobKey, EntryKind, EntryRef, NodeId, VaultEntry, VaultEvent, VaultPath,
};
use vaultmirror_core::ports::{IBlobStore, INodeStore, IVaultReader};

use crate::classify::{classify, content_type_for, EntryClass, MARKDOWN_CONTENT_TYPE};
use crate::content::ContentProcessor;
use crate::resolver::PathResolver;
use crate::SyncError;

// ============================================================================
// Options and results
// ============================================================================

/// Engine settings taken from the vault configuration
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Folder name whose contents are uploaded as images
    pub image_folder: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            image_folder: "images".to_string(),
        }
    }
}

impl From<&VaultConfig> for EngineOptions {
    fn from(config: &VaultConfig) -> Self {
        Self {
            image_folder: config.image_folder.clone(),
        }
    }
}

/// What a handler did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// An object was uploaded under this key
    Uploaded(BlobKey),
    /// The folder's node exists; nothing was uploaded
    Mirrored(NodeId),
    /// The entry's node and object were removed
    Removed,
    /// The node was renamed in place
    Renamed(NodeId),
    /// The old node (if any) was dropped and the entry recreated
    Moved { from: Option<NodeId>, to: NodeId },
    /// The entry is not mirrored
    Ignored,
    /// The delete target was already gone
    AlreadyDeleted,
}

/// Totals of a bulk push
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushSummary {
    pub uploaded: usize,
    pub mirrored: usize,
    pub ignored: usize,
}

impl PushSummary {
    fn record(&mut self, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Uploaded(_) => self.uploaded += 1,
            SyncOutcome::Mirrored(_) => self.mirrored += 1,
            SyncOutcome::Ignored => self.ignored += 1,
            _ => {}
        }
    }
}

// ============================================================================
// SyncEngine
// ============================================================================

/// Keeps the node table and the object store in step with the vault
pub struct SyncEngine {
    nodes: Arc<dyn INodeStore>,
    blobs: Arc<dyn IBlobStore>,
    vault: Arc<dyn IVaultReader>,
    resolver: PathResolver,
    content: ContentProcessor,
    options: EngineOptions,
}

impl SyncEngine {
    /// Prepares the node table and builds the engine
    ///
    /// # Errors
    /// Returns `SyncError::StoreUnavailable` if the schema cannot be created;
    /// the mirror must not be activated in that case.
    pub async fn start(
        nodes: Arc<dyn INodeStore>,
        blobs: Arc<dyn IBlobStore>,
        vault: Arc<dyn IVaultReader>,
        options: EngineOptions,
    ) -> Result<Self, SyncError> {
        let root = nodes
            .ensure_schema()
            .await
            .map_err(|e| SyncError::StoreUnavailable(format!("{e:#}")))?;

        let content = ContentProcessor::new(blobs.base_url());
        info!(
            root = %root,
            image_folder = %options.image_folder,
            "Sync engine started"
        );

        Ok(Self {
            resolver: PathResolver::new(Arc::clone(&nodes), root),
            nodes,
            blobs,
            vault,
            content,
            options,
        })
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn classify(&self, entry: &VaultEntry) -> EntryClass {
        classify(entry, &self.options.image_folder)
    }

    /// Routes an event to its handler
    pub async fn dispatch(&self, event: &VaultEvent) -> Result<SyncOutcome> {
        match event {
            VaultEvent::Created(entry) => self.on_create(entry).await,
            VaultEvent::Deleted(entry) => self.on_delete(entry).await,
            VaultEvent::Modified(entry) => self.on_modify(entry).await,
            VaultEvent::Renamed { entry, old_path } => self.on_rename(entry, old_path).await,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn on_create(&self, entry: &VaultEntry) -> Result<SyncOutcome> {
        match self.classify(entry) {
            EntryClass::Image => self.upload_image(entry).await,
            EntryClass::DrawingExport => Ok(SyncOutcome::Ignored),
            EntryClass::Document => {
                let id = self
                    .resolver
                    .ensure(entry)
                    .await
                    .with_context(|| format!("Failed to mirror {entry}"))?;
                if entry.is_folder() {
                    debug!(node_id = %id, "Folder mirrored");
                    return Ok(SyncOutcome::Mirrored(id));
                }
                self.upload_document(entry, id).await
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn on_delete(&self, entry: &VaultEntry) -> Result<SyncOutcome> {
        let outcome = match self.classify(entry) {
            EntryClass::Image if entry.is_folder() => SyncOutcome::Ignored,
            EntryClass::Image => self.remove_image(entry.name()).await?,
            EntryClass::DrawingExport => SyncOutcome::Ignored,
            EntryClass::Document => {
                self.forget_document(EntryRef::ByHandle(entry), entry.kind())
                    .await?
            }
        };

        if outcome == SyncOutcome::AlreadyDeleted {
            info!(path = %entry, "file already deleted");
        }
        Ok(outcome)
    }

    #[tracing::instrument(skip(self))]
    pub async fn on_modify(&self, entry: &VaultEntry) -> Result<SyncOutcome> {
        match self.classify(entry) {
            EntryClass::Image if entry.is_folder() => Ok(SyncOutcome::Ignored),
            EntryClass::Image => {
                self.remove_image(entry.name()).await?;
                self.upload_image(entry).await
            }
            EntryClass::DrawingExport => Ok(SyncOutcome::Ignored),
            EntryClass::Document => {
                let id = self
                    .resolver
                    .ensure(entry)
                    .await
                    .with_context(|| format!("Failed to resolve {entry}"))?;
                if entry.is_folder() {
                    return Ok(SyncOutcome::Mirrored(id));
                }
                self.blobs.remove(&BlobKey::for_node(id)).await?;
                self.upload_document(entry, id).await
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn on_rename(&self, entry: &VaultEntry, old_path: &VaultPath) -> Result<SyncOutcome> {
        if entry.path() == old_path {
            return Ok(SyncOutcome::Ignored);
        }

        let old = VaultEntry::new(old_path.clone(), entry.kind());
        match (self.classify(&old), self.classify(entry)) {
            (EntryClass::Document, EntryClass::Document) => {
                self.relocate_document(entry, old_path).await
            }
            (old_class, _) => {
                // Whatever the old name published is withdrawn, then the new
                // name is published as if freshly created
                match old_class {
                    EntryClass::Image if !old.is_folder() => {
                        self.remove_image(old.name()).await?;
                    }
                    EntryClass::Document => {
                        self.forget_document(EntryRef::ByPath(old_path), old.kind())
                            .await?;
                    }
                    _ => {}
                }
                self.on_create(entry).await
            }
        }
    }

    /// Uploads every direct child of the image folder
    ///
    /// Returns `None` when the vault has no image folder.
    #[tracing::instrument(skip(self))]
    pub async fn push_images(&self) -> Result<Option<PushSummary>> {
        let path = VaultPath::new(&self.options.image_folder)?;
        let Some(folder) = self.vault.folder(&path).await? else {
            info!(folder = %path, "No images folder found");
            return Ok(None);
        };

        let mut summary = PushSummary::default();
        for child in self.vault.list_children(&folder).await? {
            let outcome = self.on_create(&child).await?;
            summary.record(&outcome);
        }

        info!(uploaded = summary.uploaded, "Images pushed");
        Ok(Some(summary))
    }

    /// Runs the create handler over the whole vault
    #[tracing::instrument(skip(self))]
    pub async fn push_all(&self) -> Result<PushSummary> {
        let summary = self.mirror_tree(&VaultEntry::root()).await?;
        info!(
            uploaded = summary.uploaded,
            folders = summary.mirrored,
            ignored = summary.ignored,
            "Vault pushed"
        );
        Ok(summary)
    }

    /// Runs the create handler for `top` and everything below it
    pub async fn mirror_tree(&self, top: &VaultEntry) -> Result<PushSummary> {
        let mut summary = PushSummary::default();
        let mut pending = vec![top.clone()];

        while let Some(entry) = pending.pop() {
            let outcome = self.on_create(&entry).await?;
            summary.record(&outcome);
            if entry.is_folder() {
                let children = self.vault.list_children(&entry).await?;
                pending.extend(children.into_iter().rev());
            }
        }
        Ok(summary)
    }

    // ------------------------------------------------------------------------
    // Document moves and renames
    // ------------------------------------------------------------------------

    async fn relocate_document(&self, entry: &VaultEntry, old_path: &VaultPath) -> Result<SyncOutcome> {
        let moved = old_path.parent() != entry.path().parent();

        if moved {
            let from = self.resolver.lookup(EntryRef::ByPath(old_path)).await?;
            if let Some(old_id) = from {
                self.nodes.delete(old_id).await?;
                if !entry.is_folder() {
                    self.blobs.remove(&BlobKey::for_node(old_id)).await?;
                }
            }
            let to = self
                .recreate(entry)
                .await
                .with_context(|| format!("Failed to recreate {entry} after move"))?;
            info!(from = %old_path, to = %entry, node_id = %to, "Entry moved");
            return Ok(SyncOutcome::Moved { from, to });
        }

        let Some(id) = self.resolver.lookup(EntryRef::ByPath(old_path)).await? else {
            warn!(from = %old_path, to = %entry, "Renamed entry was never mirrored, creating it");
            let to = self.recreate(entry).await?;
            return Ok(SyncOutcome::Moved { from: None, to });
        };

        let parent = match entry.parent() {
            Some(parent) if !parent.is_root() => self.resolver.ensure_path(parent.path()).await?,
            _ => self.resolver.root(),
        };
        self.nodes
            .update(id, entry.name(), parent)
            .await
            .with_context(|| format!("Failed to rename {old_path} to {entry}"))?;

        info!(from = %old_path, to = %entry, node_id = %id, "Entry renamed");
        Ok(SyncOutcome::Renamed(id))
    }

    /// Mirrors a document entry at its current location, folders with their contents
    async fn recreate(&self, entry: &VaultEntry) -> Result<NodeId> {
        let id = self.resolver.ensure(entry).await?;
        if entry.is_folder() {
            for child in self.vault.list_children(entry).await? {
                self.mirror_tree(&child).await?;
            }
        } else {
            self.upload_document(entry, id).await?;
        }
        Ok(id)
    }

    /// Deletes a document's node subtree and its content object
    async fn forget_document(&self, target: EntryRef<'_>, kind: EntryKind) -> Result<SyncOutcome> {
        if target.path().is_root() {
            return Ok(SyncOutcome::Ignored);
        }
        let Some(id) = self.resolver.lookup(target).await? else {
            return Ok(SyncOutcome::AlreadyDeleted);
        };
        if !self.nodes.delete(id).await? {
            return Ok(SyncOutcome::AlreadyDeleted);
        }
        if kind == EntryKind::File {
            self.blobs.remove(&BlobKey::for_node(id)).await?;
        }
        debug!(node_id = %id, "Node removed");
        Ok(SyncOutcome::Removed)
    }

    // ------------------------------------------------------------------------
    // Object store helpers
    // ------------------------------------------------------------------------

    async fn upload_image(&self, entry: &VaultEntry) -> Result<SyncOutcome> {
        if entry.is_folder() {
            return Ok(SyncOutcome::Ignored);
        }
        let bytes = self
            .vault
            .read_bytes(entry)
            .await
            .with_context(|| format!("Failed to read {entry}"))?;
        let key = BlobKey::for_image(entry.name());
        self.blobs
            .put(&key, bytes, &content_type_for(entry.name()))
            .await?;

        info!(key = %key, "Image uploaded");
        Ok(SyncOutcome::Uploaded(key))
    }

    async fn remove_image(&self, name: &str) -> Result<SyncOutcome> {
        if self.blobs.remove(&BlobKey::for_image(name)).await? {
            Ok(SyncOutcome::Removed)
        } else {
            Ok(SyncOutcome::AlreadyDeleted)
        }
    }

    async fn upload_document(&self, entry: &VaultEntry, id: NodeId) -> Result<SyncOutcome> {
        let text = self
            .vault
            .read_text(entry)
            .await
            .with_context(|| format!("Failed to read {entry}"))?;
        let processed = self.content.process(&text);
        let key = BlobKey::for_node(id);
        self.blobs
            .put(&key, processed.into_bytes(), MARKDOWN_CONTENT_TYPE)
            .await?;

        debug!(key = %key, path = %entry, "Document uploaded");
        Ok(SyncOutcome::Uploaded(key))
    }
}
