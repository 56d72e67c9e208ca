use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A video's metadata record as held by the metadata store.
///
/// `video_location` is either absent, a public URL, or a `{bucket},{key}`
/// reference, depending on the deployment's URL mode. `version` is bumped on every
/// location update and guards against concurrent uploads to the same record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VideoRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_location: Option<String>,
    pub thumbnail_location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

impl VideoRecord {
    /// A fresh draft record with no media attached.
    pub fn draft(owner_id: Uuid, title: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title,
            description,
            video_location: None,
            thumbnail_location: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVideoRequest {
    pub title: String,
    pub description: Option<String>,
}

/// Client-facing view of a [`VideoRecord`].
///
/// `video_url` is already resolved: in signed mode it holds a presigned URL rather
/// than the stored reference.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoResponse {
    pub fn from_record(record: VideoRecord, video_url: Option<String>) -> Self {
        Self {
            id: record.id,
            owner_id: record.owner_id,
            title: record.title,
            description: record.description,
            video_url,
            thumbnail_url: record.thumbnail_location,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
