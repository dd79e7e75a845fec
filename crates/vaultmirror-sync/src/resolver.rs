//! Path Resolver
//!
//! Maps vault entries to node ids. Resolution walks the path root-first, one
//! segment per node, so a path can never resolve through a cycle.
//!
//! ## Resolution modes
//!
//! | Call               | Ancestors | Leaf                           |
//! |--------------------|-----------|--------------------------------|
//! | `ensure`           | created   | created, plus shadow for files |
//! | `lookup(ByHandle)` | looked up | looked up                      |
//! | `lookup(ByPath)`   | created   | looked up                      |
//!
//! `ByPath` serves old paths of renames: the entry no longer exists under
//! that name but its parent folder must still be resolvable.
//!
//! Every insert is idempotent, so concurrent resolution of the same path
//! converges on the same ids.

use std::sync::Arc;

use anyhow::Result;

use vaultmirror_core::domain::{EntryRef, NodeId, VaultEntry, VaultPath};
use vaultmirror_core::ports::INodeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    Create,
    Find,
}

/// Resolves vault entries to node ids
#[derive(Clone)]
pub struct PathResolver {
    nodes: Arc<dyn INodeStore>,
    root: NodeId,
}

impl PathResolver {
    /// `root` is the id returned by [`INodeStore::ensure_schema`]
    pub fn new(nodes: Arc<dyn INodeStore>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Resolves `entry`, creating every missing node on the way
    ///
    /// Files also get their content-shadow node. Returns the entry's own id,
    /// never the shadow's.
    pub async fn ensure(&self, entry: &VaultEntry) -> Result<NodeId> {
        let id = self.ensure_path(entry.path()).await?;
        if !entry.is_folder() && !entry.is_root() {
            let shadow = self.nodes.insert(&id.shadow_name(), id).await?;
            tracing::trace!(node_id = %id, shadow = %shadow, "Shadow node ensured");
        }
        Ok(id)
    }

    /// Resolves a folder path, creating missing folders
    pub async fn ensure_path(&self, path: &VaultPath) -> Result<NodeId> {
        match self.walk(path, Walk::Create).await? {
            Some(id) => Ok(id),
            None => anyhow::bail!("path {path} did not resolve while creating"),
        }
    }

    /// Looks up the node of an entry without creating it
    ///
    /// For [`EntryRef::ByPath`] the parent folders are created if needed;
    /// only the leaf may be absent.
    pub async fn lookup(&self, target: EntryRef<'_>) -> Result<Option<NodeId>> {
        match target {
            EntryRef::ByHandle(entry) => self.walk(entry.path(), Walk::Find).await,
            EntryRef::ByPath(path) => {
                let Some(parent) = path.parent() else {
                    return Ok(Some(self.root));
                };
                let parent_id = self.ensure_path(&parent).await?;
                self.nodes.find_child(parent_id, path.name()).await
            }
        }
    }

    /// Content-shadow node of a file node
    pub async fn shadow_of(&self, id: NodeId) -> Result<Option<NodeId>> {
        self.nodes.find_only_child(id).await
    }

    async fn walk(&self, path: &VaultPath, mode: Walk) -> Result<Option<NodeId>> {
        let mut id = self.root;
        for segment in path.segments() {
            id = match mode {
                Walk::Create => self.nodes.insert(segment, id).await?,
                Walk::Find => match self.nodes.find(segment, id).await? {
                    Some(child) => child,
                    None => return Ok(None),
                },
            };
        }
        Ok(Some(id))
    }
}
