use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use futures::StreamExt;
use std::sync::Arc;
use tubely_core::{AppError, VideoResponse};
use tubely_processing::BodyError;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::constants::VIDEO_FIELD;
use crate::error::HttpAppError;
use crate::services::present_video;
use crate::state::AppState;
use tubely_infra::ErrorResponse;

fn multipart_error(err: MultipartError, max_bytes: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "Video exceeds the maximum upload size of {} bytes",
            max_bytes
        ))
    } else {
        AppError::BadRequest(format!("Failed to read multipart body: {}", err.body_text()))
    }
}

fn body_error(err: MultipartError) -> BodyError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        BodyError::LimitExceeded
    } else {
        BodyError::Read(err.body_text())
    }
}

#[utoipa::path(
    post,
    path = "/api/videos/{video_id}/upload",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Multipart form with an MP4 file in the `video` field"),
    responses(
        (status = 200, description = "Video uploaded", body = VideoResponse),
        (status = 400, description = "Invalid video ID or missing `video` field", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Video belongs to another user", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 409, description = "Video was updated concurrently", body = ErrorResponse),
        (status = 413, description = "Video too large", body = ErrorResponse),
        (status = 415, description = "Not an MP4 video", body = ErrorResponse),
        (status = 422, description = "File is not a readable video", body = ErrorResponse),
        (status = 502, description = "Object storage failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %user.user_id, video_id = %video_id))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video_id = Uuid::parse_str(&video_id).map_err(AppError::from)?;
    let max_bytes = state.config.max_video_upload_bytes();

    // Fail on ownership before reading any part of the body.
    state.pipeline.authorize(user.user_id, video_id).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let body = Box::pin(field.map(|chunk| chunk.map_err(body_error)));

        let record = state
            .pipeline
            .handle_upload(
                user.user_id,
                video_id,
                body,
                content_type.as_deref(),
                max_bytes,
            )
            .await?;

        return Ok(Json(present_video(&state, record).await?));
    }

    Err(AppError::BadRequest(format!("Missing multipart field '{}'", VIDEO_FIELD)).into())
}
