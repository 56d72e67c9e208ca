use bytes::Bytes;
use chrono::Utc;
use futures::Stream;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use tubely_core::{AppError, VideoRecord};
use tubely_db::VideoRepository;
use tubely_storage::{Storage, StorageObjectKey};

use super::location::VideoLocationStrategy;
use super::staging::{BodyError, ScratchPath, StagedUpload};
use crate::inspector::MediaInspector;
use crate::normalizer::MediaNormalizer;
use crate::validator::validate_video_content_type;

/// Extension of every stored video object.
const STORED_EXTENSION: &str = "mp4";

/// Takes one upload from request body to a recorded, stored object.
///
/// A run either ends with the record pointing at a fully written object, or
/// leaves the record as it was. Scratch files never outlive the call.
pub struct VideoUploadPipeline {
    repository: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    inspector: Arc<dyn MediaInspector>,
    normalizer: Arc<dyn MediaNormalizer>,
    locations: VideoLocationStrategy,
    staging_dir: PathBuf,
}

impl VideoUploadPipeline {
    pub fn new(
        repository: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        inspector: Arc<dyn MediaInspector>,
        normalizer: Arc<dyn MediaNormalizer>,
        locations: VideoLocationStrategy,
        staging_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repository,
            storage,
            inspector,
            normalizer,
            locations,
            staging_dir: staging_dir.into(),
        }
    }

    pub fn locations(&self) -> &VideoLocationStrategy {
        &self.locations
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Run the upload for `video_id` on behalf of `user_id`.
    ///
    /// Ownership is checked before a single body byte is read. The body is staged
    /// to disk, classified, normalized, then streamed to storage under a fresh
    /// key; only then is the record's location replaced.
    #[tracing::instrument(skip_all, fields(video_id = %video_id, user_id = %user_id))]
    pub async fn handle_upload<S>(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        body: S,
        declared_content_type: Option<&str>,
        max_bytes: u64,
    ) -> Result<VideoRecord, AppError>
    where
        S: Stream<Item = Result<Bytes, BodyError>> + Send + Unpin,
    {
        let start = Instant::now();

        let record = self.authorize(user_id, video_id).await?;
        let content_type = validate_video_content_type(declared_content_type)?;

        let mut staged = StagedUpload::create(&self.staging_dir)?;
        let size_bytes = staged.write_stream(body, max_bytes).await?;
        staged.rewind().await?;
        tracing::debug!(
            size_bytes = size_bytes,
            path = %staged.path().display(),
            "Upload staged"
        );

        let classification = self.inspector.inspect(staged.path()).await?;
        tracing::debug!(classification = %classification, "Upload classified");

        let output = ScratchPath::new(self.normalizer.output_path_for(staged.path()));
        let normalized = self.normalizer.normalize(staged.path()).await?;
        let _relocated_output = (normalized.as_path() != output.path())
            .then(|| ScratchPath::new(normalized.clone()));

        let key = StorageObjectKey::for_classification(classification, STORED_EXTENSION);
        let stored_bytes = self.store(&normalized, &key, content_type).await?;

        let location = self.locations.location_for(self.storage.bucket(), &key);
        let updated = self.persist(&record, location, &key).await?;

        tracing::info!(
            bucket = %self.storage.bucket(),
            key = %key,
            classification = %classification,
            size_bytes = size_bytes,
            stored_bytes = stored_bytes,
            duration_ms = start.elapsed().as_millis() as u64,
            "Video upload completed"
        );

        Ok(updated)
    }

    /// Look up `video_id` and check that `user_id` owns it.
    pub async fn authorize(&self, user_id: Uuid, video_id: Uuid) -> Result<VideoRecord, AppError> {
        let record = self
            .repository
            .get_video(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

        if !record.is_owned_by(user_id) {
            return Err(AppError::Forbidden(
                "Only the owner of a video can upload its file".to_string(),
            ));
        }

        Ok(record)
    }

    async fn store(
        &self,
        path: &Path,
        key: &StorageObjectKey,
        content_type: &str,
    ) -> Result<u64, AppError> {
        let file = tokio::fs::File::open(path).await.map_err(|e| {
            AppError::StoreFailure(format!(
                "Failed to open normalized file {}: {}",
                path.display(),
                e
            ))
        })?;
        let length = file
            .metadata()
            .await
            .map_err(|e| AppError::StoreFailure(format!("Failed to stat normalized file: {}", e)))?
            .len();

        self.storage
            .put(key.as_str(), Box::pin(file), content_type, Some(length))
            .await
            .map_err(|e| AppError::StoreFailure(e.to_string()))?;

        Ok(length)
    }

    async fn persist(
        &self,
        record: &VideoRecord,
        location: String,
        key: &StorageObjectKey,
    ) -> Result<VideoRecord, AppError> {
        match self
            .repository
            .update_video_location(record.id, location, Utc::now(), record.version)
            .await
        {
            Ok(updated) => Ok(updated),
            Err(err) => {
                // The object stays in the bucket; nothing references it.
                tracing::warn!(
                    error = %err,
                    bucket = %self.storage.bucket(),
                    key = %key,
                    "Stored video is orphaned: recording its location failed"
                );
                match err {
                    AppError::Conflict(msg) => Err(AppError::Conflict(msg)),
                    other => Err(AppError::PersistFailure(other.to_string())),
                }
            }
        }
    }
}
