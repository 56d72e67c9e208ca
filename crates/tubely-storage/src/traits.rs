//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;
use tubely_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Signing failed: {0}")]
    SignFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Malformed storage reference: {0}")]
    MalformedReference(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::SignFailed(msg) => AppError::SignFailure(msg),
            StorageError::NotFound(key) => AppError::NotFound(format!("Object not found: {}", key)),
            StorageError::MalformedReference(msg) => AppError::MalformedReference(msg),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            other => AppError::StoreFailure(other.to_string()),
        }
    }
}

/// Storage abstraction trait
///
/// Every backend writes into a single configured bucket and can mint read-only,
/// time-limited URLs for objects. Key naming is the caller's business; backends
/// only reject keys the underlying store cannot hold.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Bucket that `put` writes into.
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Stream an object into the bucket under `storage_key`.
    ///
    /// The reader is consumed until EOF. The write is all-or-nothing: on error no
    /// object exists under the key that a caller should rely on.
    async fn put(
        &self,
        storage_key: &str,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
        content_type: &str,
        content_length: Option<u64>,
    ) -> StorageResult<()>;

    /// Generate a presigned GET URL valid for `expires_in` from now.
    ///
    /// The URL may be used any number of times until it expires.
    async fn sign(&self, bucket: &str, storage_key: &str, expires_in: Duration)
        -> StorageResult<String>;

    /// Check if an object exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;
}
