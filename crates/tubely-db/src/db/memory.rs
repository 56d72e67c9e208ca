use super::video::VideoRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tubely_core::{AppError, VideoRecord};
use uuid::Uuid;

/// In-process video repository
///
/// Same semantics as [`super::PgVideoRepository`], including the version check.
/// Records live as long as the process.
#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: RwLock<HashMap<Uuid, VideoRecord>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record as-is.
    pub async fn insert(&self, record: VideoRecord) {
        self.videos.write().await.insert(record.id, record);
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create_video(
        &self,
        owner_id: Uuid,
        title: String,
        description: Option<String>,
    ) -> Result<VideoRecord, AppError> {
        let record = VideoRecord::draft(owner_id, title, description);
        self.insert(record.clone()).await;
        Ok(record)
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn list_videos_for_owner(&self, owner_id: Uuid) -> Result<Vec<VideoRecord>, AppError> {
        let mut records: Vec<VideoRecord> = self
            .videos
            .read()
            .await
            .values()
            .filter(|v| v.owner_id == owner_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn update_video_location(
        &self,
        id: Uuid,
        video_location: String,
        updated_at: DateTime<Utc>,
        expected_version: i64,
    ) -> Result<VideoRecord, AppError> {
        let mut videos = self.videos.write().await;
        let record = videos
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;

        if record.version != expected_version {
            return Err(AppError::Conflict(format!(
                "Video {} was modified concurrently (version {} != {})",
                id, record.version, expected_version
            )));
        }

        record.video_location = Some(video_location);
        record.updated_at = updated_at;
        record.version += 1;
        Ok(record.clone())
    }
}
