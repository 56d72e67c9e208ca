use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use uuid::Uuid;

/// Local filesystem storage implementation
///
/// Objects live under `base_path/{key}` and are served from `base_url/{key}`.
/// Presigned URLs are plain URLs: there is nothing to sign without a real object
/// store, so the expiry is not enforced.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    bucket: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/tubely/storage")
    /// * `base_url` - Base URL for serving objects (e.g., "http://localhost:8091/media")
    /// * `bucket` - Name reported as this store's bucket in `{bucket},{key}` references
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        bucket: String,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
            bucket,
        })
    }

    /// Convert storage key to filesystem path.
    ///
    /// Only plain relative components are accepted, so a key can never resolve
    /// outside the base directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(format!(
                "Storage key {:?} contains invalid characters",
                storage_key
            )));
        }

        let relative = Path::new(storage_key);
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(format!(
                "Storage key {:?} resolves outside storage directory",
                storage_key
            )));
        }

        Ok(self.base_path.join(relative))
    }

    /// Generate public URL for an object
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Copy the reader into `partial`, then rename it over `path`.
    ///
    /// A short or long stream against `content_length` fails before the rename.
    async fn write_then_rename(
        partial: &Path,
        path: &Path,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
        content_length: Option<u64>,
    ) -> StorageResult<u64> {
        let mut file = fs::File::create(partial).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create file {}: {}",
                partial.display(),
                e
            ))
        })?;

        let bytes_copied = tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to write stream to file {}: {}",
                partial.display(),
                e
            ))
        })?;

        file.flush().await?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to sync file {}: {}",
                partial.display(),
                e
            ))
        })?;
        drop(file);

        if let Some(expected) = content_length {
            if expected != bytes_copied {
                return Err(StorageError::UploadFailed(format!(
                    "Stream ended after {} bytes, expected {}",
                    bytes_copied, expected
                )));
            }
        }

        fs::rename(partial, path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to move {} into place: {}",
                path.display(),
                e
            ))
        })?;

        Ok(bytes_copied)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }

    async fn put(
        &self,
        storage_key: &str,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
        content_type: &str,
        content_length: Option<u64>,
    ) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        self.ensure_parent_dir(&path).await?;

        let mut partial = path.clone().into_os_string();
        partial.push(format!(".partial-{}", Uuid::new_v4()));
        let partial = PathBuf::from(partial);

        let written = Self::write_then_rename(&partial, &path, reader, content_length).await;
        let bytes_copied = match written {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&partial).await;
                tracing::error!(
                    error = %e,
                    key = %storage_key,
                    path = %path.display(),
                    "Local storage upload failed"
                );
                return Err(e);
            }
        };

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            content_type = %content_type,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }

    async fn sign(
        &self,
        bucket: &str,
        storage_key: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        if bucket != self.bucket {
            return Err(StorageError::SignFailed(format!(
                "Unknown bucket {:?} for local storage",
                bucket
            )));
        }
        self.key_to_path(storage_key)?;
        Ok(self.generate_url(storage_key))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }
}
