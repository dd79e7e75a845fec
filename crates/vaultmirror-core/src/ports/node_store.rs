//! Node store port (driven/secondary port)
//!
//! The node store owns the single `node` table: one row per folder, file and
//! content-shadow entry, linked to its parent by `parent_id`.
//!
//! ## Design Notes
//!
//! - `(parent_id, data)` is unique, so a name identifies at most one child.
//! - [`INodeStore::insert`] is an idempotent upsert on that key. Concurrent
//!   creators of the same child all observe the winner's id.
//! - Lookups return `Ok(None)` on a miss; `Err` always means the store
//!   itself failed.
//! - Deleting a node cascades to its whole subtree.

use crate::domain::NodeId;

/// Port trait for the relational tree table
#[async_trait::async_trait]
pub trait INodeStore: Send + Sync {
    /// Creates the node table if absent and inserts the root row if missing
    ///
    /// Safe to call on every startup. Returns the id of the root node.
    async fn ensure_schema(&self) -> anyhow::Result<NodeId>;

    /// Looks up the child named `data` under `parent`
    async fn find(&self, data: &str, parent: NodeId) -> anyhow::Result<Option<NodeId>>;

    /// Inserts `data` under `parent`, returning the existing id on conflict
    ///
    /// # Errors
    /// Fails with a not-found class error if `parent` does not exist
    async fn insert(&self, data: &str, parent: NodeId) -> anyhow::Result<NodeId>;

    /// Looks up a child by name, argument order matching path traversal
    async fn find_child(&self, parent: NodeId, data: &str) -> anyhow::Result<Option<NodeId>>;

    /// Returns the single child of `parent`, if any
    ///
    /// Used to reach a file's content-shadow node from the file node.
    async fn find_only_child(&self, parent: NodeId) -> anyhow::Result<Option<NodeId>>;

    /// Renames and/or reparents `id` in one statement
    ///
    /// # Errors
    /// Fails if `id` or `parent` does not exist, or if `parent` already has a
    /// child named `data`
    async fn update(&self, id: NodeId, data: &str, parent: NodeId) -> anyhow::Result<NodeId>;

    /// Deletes `id` and, through the cascade, every descendant
    ///
    /// Returns `false` if no such node existed.
    async fn delete(&self, id: NodeId) -> anyhow::Result<bool>;
}
