use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use tubely_core::{AppError, VideoRecord};
use uuid::Uuid;

/// Key-value style access to video metadata records.
///
/// `update_video_location` is a compare-and-set on the record's version: it only
/// succeeds if nobody else has updated the record since it was read.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create_video(
        &self,
        owner_id: Uuid,
        title: String,
        description: Option<String>,
    ) -> Result<VideoRecord, AppError>;

    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError>;

    async fn list_videos_for_owner(&self, owner_id: Uuid) -> Result<Vec<VideoRecord>, AppError>;

    /// Set `video_location` and `updated_at`, bumping the version.
    ///
    /// Fails with `Conflict` if the stored version is no longer `expected_version`
    /// and with `NotFound` if the record is gone.
    async fn update_video_location(
        &self,
        id: Uuid,
        video_location: String,
        updated_at: DateTime<Utc>,
        expected_version: i64,
    ) -> Result<VideoRecord, AppError>;
}

/// PostgreSQL-backed video repository
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self, description), fields(db.table = "videos", db.operation = "insert"))]
    async fn create_video(
        &self,
        owner_id: Uuid,
        title: String,
        description: Option<String>,
    ) -> Result<VideoRecord, AppError> {
        let draft = VideoRecord::draft(owner_id, title, description);

        let record = sqlx::query_as::<Postgres, VideoRecord>(
            r#"
            INSERT INTO videos (id, owner_id, title, description, created_at, updated_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(draft.id)
        .bind(draft.owner_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.created_at)
        .bind(draft.updated_at)
        .bind(draft.version)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, VideoRecord>("SELECT * FROM videos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_videos_for_owner(&self, owner_id: Uuid) -> Result<Vec<VideoRecord>, AppError> {
        let records = sqlx::query_as::<Postgres, VideoRecord>(
            "SELECT * FROM videos WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    #[tracing::instrument(skip(self, video_location), fields(db.table = "videos", db.operation = "update"))]
    async fn update_video_location(
        &self,
        id: Uuid,
        video_location: String,
        updated_at: DateTime<Utc>,
        expected_version: i64,
    ) -> Result<VideoRecord, AppError> {
        let updated = sqlx::query_as::<Postgres, VideoRecord>(
            r#"
            UPDATE videos
            SET video_location = $1, updated_at = $2, version = version + 1
            WHERE id = $3 AND version = $4
            RETURNING *
            "#,
        )
        .bind(&video_location)
        .bind(updated_at)
        .bind(id)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(record) => Ok(record),
            None => match self.get_video(id).await? {
                Some(current) => Err(AppError::Conflict(format!(
                    "Video {} was modified concurrently (version {} != {})",
                    id, current.version, expected_version
                ))),
                None => Err(AppError::NotFound(format!("Video {} not found", id))),
            },
        }
    }
}
