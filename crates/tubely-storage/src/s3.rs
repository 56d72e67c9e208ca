use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutMultipartOptions,
    Result as ObjectResult, WriteMultipart,
};
use std::pin::Pin;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};

const READ_CHUNK_SIZE: usize = 1024 * 1024;

/// Parts buffered or in flight at once; bounds memory per upload to a few parts.
const MAX_CONCURRENT_PARTS: usize = 4;

/// Stream `reader` into `location` as a multipart upload.
///
/// Memory stays bounded by the part size times [`MAX_CONCURRENT_PARTS`]. On any
/// failure the multipart upload is aborted so no object appears under the key.
pub(crate) async fn stream_upload<S>(
    store: &S,
    location: &Path,
    mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    content_type: &str,
    content_length: Option<u64>,
) -> StorageResult<u64>
where
    S: ObjectStore + ?Sized,
{
    let mut attributes = Attributes::new();
    attributes.insert(Attribute::ContentType, content_type.to_string().into());
    let options = PutMultipartOptions {
        attributes,
        ..Default::default()
    };

    let upload = store
        .put_multipart_opts(location, options)
        .await
        .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
    let mut writer = WriteMultipart::new(upload);

    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    let mut total: u64 = 0;

    let failure = loop {
        let bytes_read = match reader.read(&mut buf).await {
            Ok(0) => break None,
            Ok(n) => n,
            Err(e) => {
                break Some(StorageError::UploadFailed(format!(
                    "Failed to read from stream: {}",
                    e
                )))
            }
        };
        if let Err(e) = writer.wait_for_capacity(MAX_CONCURRENT_PARTS).await {
            break Some(StorageError::UploadFailed(e.to_string()));
        }
        writer.write(&buf[..bytes_read]);
        total += bytes_read as u64;
    };

    let failure = failure.or_else(|| match content_length {
        Some(expected) if expected != total => Some(StorageError::UploadFailed(format!(
            "Stream ended after {} bytes, expected {}",
            total, expected
        ))),
        _ => None,
    });

    if let Some(err) = failure {
        if let Err(abort_err) = writer.abort().await {
            tracing::warn!(
                error = %abort_err,
                location = %location,
                "Failed to abort multipart upload"
            );
        }
        return Err(err);
    }

    writer
        .finish()
        .await
        .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

    Ok(total)
}

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let store = Self::build_store(&bucket, &region, endpoint_url.as_deref())?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Build an AmazonS3 object store from environment credentials and explicit settings.
    fn build_store(
        bucket: &str,
        region: &str,
        endpoint_url: Option<&str>,
    ) -> StorageResult<AmazonS3> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket);

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))
    }

    fn object_path(storage_key: &str) -> StorageResult<Path> {
        Path::parse(storage_key).map_err(|e| StorageError::InvalidKey(e.to_string()))
    }

    fn signer_for(&self, bucket: &str) -> StorageResult<AmazonS3> {
        if bucket == self.bucket {
            return Ok(self.store.clone());
        }
        Self::build_store(bucket, &self.region, self.endpoint_url.as_deref())
    }
}

#[async_trait]
impl Storage for S3Storage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }

    async fn put(
        &self,
        storage_key: &str,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
        content_type: &str,
        content_length: Option<u64>,
    ) -> StorageResult<()> {
        let location = Self::object_path(storage_key)?;
        let start = std::time::Instant::now();

        let result =
            stream_upload(&self.store, &location, reader, content_type, content_length).await;

        let size = result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            e
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn sign(
        &self,
        bucket: &str,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let location = Self::object_path(storage_key)?;
        let store = self.signer_for(bucket)?;

        let url_result: ObjectResult<_> = store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| {
                tracing::warn!(
                    error = %e,
                    bucket = %bucket,
                    key = %storage_key,
                    "S3 presign failed"
                );
                StorageError::SignFailed(e.to_string())
            })?
            .to_string();

        Ok(url)
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let location = Self::object_path(storage_key)?;
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use std::io::Cursor;

    fn reader(data: Vec<u8>) -> Pin<Box<dyn AsyncRead + Send + Unpin>> {
        Box::pin(Cursor::new(data))
    }

    #[tokio::test]
    async fn test_stream_upload_writes_all_parts_with_content_type() {
        let store = InMemory::new();
        let location = Path::from("landscape/abc.mp4");
        // Larger than one 5 MiB part so the upload spans several parts.
        let data: Vec<u8> = (0..12 * 1024 * 1024).map(|i| (i % 251) as u8).collect();

        let size = stream_upload(
            &store,
            &location,
            reader(data.clone()),
            "video/mp4",
            Some(data.len() as u64),
        )
        .await
        .unwrap();

        assert_eq!(size, data.len() as u64);
        let stored = store.get(&location).await.unwrap();
        let content_type = stored
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| v.as_ref().to_string());
        assert_eq!(content_type.as_deref(), Some("video/mp4"));
        assert_eq!(stored.bytes().await.unwrap().as_ref(), data.as_slice());
    }

    #[tokio::test]
    async fn test_stream_upload_length_mismatch_leaves_no_object() {
        let store = InMemory::new();
        let location = Path::from("portrait/abc.mp4");

        let result = stream_upload(
            &store,
            &location,
            reader(vec![1u8; 1024]),
            "video/mp4",
            Some(4096),
        )
        .await;

        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert!(matches!(
            store.head(&location).await,
            Err(ObjectStoreError::NotFound { .. })
        ));
    }
}
