//! Blob store port (driven/secondary port)
//!
//! Objects are addressed by [`BlobKey`]. The store holds no state beyond its
//! connection handle; every call is a side effect on the remote bucket.

use crate::domain::BlobKey;

/// Port trait for the object store
#[async_trait::async_trait]
pub trait IBlobStore: Send + Sync {
    /// Uploads an object, replacing any existing object under `key`
    async fn put(&self, key: &BlobKey, content: Vec<u8>, content_type: &str) -> anyhow::Result<()>;

    /// Removes an object
    ///
    /// Returns `Ok(false)` if the object was already absent.
    async fn remove(&self, key: &BlobKey) -> anyhow::Result<bool>;

    /// Public URL prefix of the bucket, ending with `/`
    fn base_url(&self) -> String;

    /// Public URL of the object stored under `key`
    fn public_url(&self, key: &BlobKey) -> String {
        format!("{}{}", self.base_url(), key)
    }
}
