//! S3 implementation of IBlobStore

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use vaultmirror_core::config::Settings;
use vaultmirror_core::domain::BlobKey;
use vaultmirror_core::ports::IBlobStore;

use crate::BlobError;

/// Blob store over an S3-compatible bucket
///
/// Uses path-style addressing (`<endpoint>/<bucket>/<key>`), which MinIO
/// requires and which matches the public URLs handed out by
/// [`IBlobStore::public_url`].
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    base_url: String,
}

impl S3BlobStore {
    /// Builds a client from the `S3_*` settings without contacting the server
    ///
    /// # Errors
    ///
    /// Returns `BlobError::ConnectionFailed` if the port setting is invalid.
    pub fn new(settings: &Settings) -> Result<Self, BlobError> {
        let endpoint = settings
            .s3_endpoint()
            .map_err(|e| BlobError::ConnectionFailed(e.to_string()))?;
        let base_url = settings
            .s3_base_url()
            .map_err(|e| BlobError::ConnectionFailed(e.to_string()))?;

        let credentials = Credentials::new(
            settings.s3_access_key.clone(),
            settings.s3_secret_key.clone(),
            None,
            None,
            "vaultmirror",
        );

        let config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.s3_region.clone()))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(config),
            bucket: settings.s3_bucket.clone(),
            base_url,
        })
    }

    /// Builds the client and verifies that the bucket is reachable
    ///
    /// # Errors
    ///
    /// Returns `BlobError::BucketUnavailable` if the bucket does not exist or
    /// the server rejects the credentials.
    pub async fn connect(settings: &Settings) -> Result<Self, BlobError> {
        let store = Self::new(settings)?;

        store
            .client
            .head_bucket()
            .bucket(&store.bucket)
            .send()
            .await
            .map_err(|e| BlobError::BucketUnavailable {
                bucket: store.bucket.clone(),
                message: DisplayErrorContext(e).to_string(),
            })?;

        tracing::info!(
            endpoint = %settings.s3_url,
            bucket = %store.bucket,
            "Object store connected"
        );
        Ok(store)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn exists(&self, key: &BlobKey) -> Result<bool, BlobError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(BlobError::RemoveFailed {
                key: key.to_string(),
                message: DisplayErrorContext(e).to_string(),
            }),
        }
    }
}

#[async_trait::async_trait]
impl IBlobStore for S3BlobStore {
    async fn put(&self, key: &BlobKey, content: Vec<u8>, content_type: &str) -> anyhow::Result<()> {
        let size = content.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .content_type(content_type)
            .body(ByteStream::from(content))
            .send()
            .await
            .map_err(|e| BlobError::PutFailed {
                key: key.to_string(),
                message: DisplayErrorContext(e).to_string(),
            })?;

        tracing::debug!(key = %key, size, content_type, "Uploaded object");
        Ok(())
    }

    async fn remove(&self, key: &BlobKey) -> anyhow::Result<bool> {
        // S3 deletes succeed on missing keys, so absence is checked first
        if !self.exists(key).await? {
            tracing::debug!(key = %key, "Object already absent");
            return Ok(false);
        }

        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .send()
            .await
        {
            Ok(_) => {
                tracing::debug!(key = %key, "Removed object");
                Ok(true)
            }
            Err(e) if e.code() == Some("NoSuchKey") => Ok(false),
            Err(e) => Err(BlobError::RemoveFailed {
                key: key.to_string(),
                message: DisplayErrorContext(e).to_string(),
            }
            .into()),
        }
    }

    fn base_url(&self) -> String {
        self.base_url.clone()
    }
}
