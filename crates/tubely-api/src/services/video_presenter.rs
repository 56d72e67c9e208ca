//! Turns stored records into client-facing responses.

use tubely_core::{AppError, VideoRecord, VideoResponse};

use crate::state::AppState;

/// Resolve the record's stored location into a fetchable URL.
///
/// In signed mode this mints a fresh presigned URL on every call.
pub async fn present_video(state: &AppState, record: VideoRecord) -> Result<VideoResponse, AppError> {
    let video_url = state
        .locations()
        .resolve(state.storage.as_ref(), record.video_location.as_deref())
        .await?;
    Ok(VideoResponse::from_record(record, video_url))
}
