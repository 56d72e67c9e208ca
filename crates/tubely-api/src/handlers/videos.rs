use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tubely_core::{AppError, CreateVideoRequest, VideoResponse};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{HttpAppError, ValidatedJson};
use crate::services::present_video;
use crate::state::AppState;
use tubely_infra::ErrorResponse;

const MAX_TITLE_LEN: usize = 255;

#[utoipa::path(
    post,
    path = "/api/videos",
    tag = "videos",
    request_body = CreateVideoRequest,
    responses(
        (status = 201, description = "Draft video created", body = VideoResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn create_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let title = request.title.trim().to_string();
    if title.is_empty() || title.len() > MAX_TITLE_LEN {
        return Err(AppError::BadRequest(format!(
            "Title must be between 1 and {} characters",
            MAX_TITLE_LEN
        ))
        .into());
    }

    let record = state
        .repository
        .create_video(user.user_id, title, request.description)
        .await?;
    tracing::info!(video_id = %record.id, "Draft video created");

    let response = present_video(&state, record).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "Videos owned by the caller, newest first", body = Vec<VideoResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<VideoResponse>>, HttpAppError> {
    let records = state.repository.list_videos_for_owner(user.user_id).await?;

    let mut videos = Vec::with_capacity(records.len());
    for record in records {
        videos.push(present_video(&state, record).await?);
    }

    Ok(Json(videos))
}

#[utoipa::path(
    get,
    path = "/api/videos/{video_id}",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video found", body = VideoResponse),
        (status = 403, description = "Video belongs to another user", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Stored location could not be resolved", body = ErrorResponse),
        (status = 502, description = "URL signing failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %user.user_id, video_id = %video_id))]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video_id = Uuid::parse_str(&video_id).map_err(AppError::from)?;
    let record = state.pipeline.authorize(user.user_id, video_id).await?;

    Ok(Json(present_video(&state, record).await?))
}
