//! vaultmirror Blob - Object store adapter
//!
//! Implements the `IBlobStore` port over any S3-compatible service (MinIO in
//! the usual deployment). Objects live flat in one bucket:
//!
//! - `<file name>` for images copied verbatim from the image folder
//! - `<node id>.md` for the processed content of tracked documents
//!
//! ## Key Components
//!
//! - [`S3BlobStore`] - `IBlobStore` implementation over `aws-sdk-s3`
//! - [`BlobError`] - Error types for object store operations

pub mod s3;

pub use s3::S3BlobStore;

/// Errors that can occur during object store operations
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// The client could not be configured from the settings
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The configured bucket is missing or unreachable
    #[error("Bucket {bucket} unavailable: {message}")]
    BucketUnavailable { bucket: String, message: String },

    /// Uploading an object failed
    #[error("Failed to upload {key}: {message}")]
    PutFailed { key: String, message: String },

    /// Removing an object failed for a reason other than its absence
    #[error("Failed to remove {key}: {message}")]
    RemoveFailed { key: String, message: String },
}
