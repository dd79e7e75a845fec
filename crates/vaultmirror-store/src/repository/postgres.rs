//! PostgreSQL implementation of INodeStore

use sqlx::PgPool;

use vaultmirror_core::domain::NodeId;
use vaultmirror_core::ports::INodeStore;

use super::{INSERT_ATTEMPTS, ROOT_DATA};
use crate::StoreError;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS node (
    id        BIGSERIAL PRIMARY KEY,
    parent_id BIGINT REFERENCES node (id) ON DELETE CASCADE,
    data      TEXT NOT NULL,
    UNIQUE (parent_id, data)
)
"#;

/// At most one parentless row; NULL parents never collide under `UNIQUE`
const CREATE_ROOT_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS node_single_root ON node ((parent_id IS NULL)) \
     WHERE parent_id IS NULL";

/// Node store over a PostgreSQL pool
pub struct PgNodeStore {
    pool: PgPool,
}

impl PgNodeStore {
    /// Creates a new store instance with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn try_insert(&self, data: &str, parent: NodeId) -> Result<Option<NodeId>, StoreError> {
        let id: Option<i64> = sqlx::query_scalar(
            "INSERT INTO node (parent_id, data) VALUES ($1, $2) \
             ON CONFLICT (parent_id, data) DO NOTHING RETURNING id",
        )
        .bind(parent.get())
        .bind(data)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, parent, data))?;

        Ok(id.map(NodeId::new))
    }
}

#[async_trait::async_trait]
impl INodeStore for PgNodeStore {
    async fn ensure_schema(&self) -> anyhow::Result<NodeId> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(format!("Failed to create node table: {e}")))?;

        sqlx::query(CREATE_ROOT_INDEX)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(format!("Failed to create root index: {e}")))?;

        sqlx::query("INSERT INTO node (data) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(ROOT_DATA)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(format!("Failed to insert root node: {e}")))?;

        let root: i64 = sqlx::query_scalar(
            "SELECT id FROM node WHERE parent_id IS NULL AND data = $1",
        )
        .bind(ROOT_DATA)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)?;

        tracing::debug!(root = root, "Node schema ready");
        Ok(NodeId::new(root))
    }

    async fn find(&self, data: &str, parent: NodeId) -> anyhow::Result<Option<NodeId>> {
        let id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM node WHERE parent_id = $1 AND data = $2")
                .bind(parent.get())
                .bind(data)
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::from)?;

        Ok(id.map(NodeId::new))
    }

    async fn insert(&self, data: &str, parent: NodeId) -> anyhow::Result<NodeId> {
        for _ in 0..INSERT_ATTEMPTS {
            if let Some(id) = self.try_insert(data, parent).await? {
                tracing::trace!(node_id = %id, parent = %parent, data, "Inserted node");
                return Ok(id);
            }
            if let Some(id) = self.find(data, parent).await? {
                return Ok(id);
            }
        }
        Err(StoreError::QueryFailed(format!(
            "Node {data:?} under {parent} kept disappearing during insert"
        ))
        .into())
    }

    async fn find_child(&self, parent: NodeId, data: &str) -> anyhow::Result<Option<NodeId>> {
        self.find(data, parent).await
    }

    async fn find_only_child(&self, parent: NodeId) -> anyhow::Result<Option<NodeId>> {
        let id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM node WHERE parent_id = $1 ORDER BY id LIMIT 1")
                .bind(parent.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::from)?;

        Ok(id.map(NodeId::new))
    }

    async fn update(&self, id: NodeId, data: &str, parent: NodeId) -> anyhow::Result<NodeId> {
        let updated: Option<i64> =
            sqlx::query_scalar("UPDATE node SET data = $1, parent_id = $2 WHERE id = $3 RETURNING id")
                .bind(data)
                .bind(parent.get())
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::from_write(e, parent, data))?;

        match updated {
            Some(id) => Ok(NodeId::new(id)),
            None => Err(StoreError::NodeNotFound(id).into()),
        }
    }

    async fn delete(&self, id: NodeId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM node WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;

        Ok(result.rows_affected() > 0)
    }
}
