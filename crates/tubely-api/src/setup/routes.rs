//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::auth::{auth_middleware, AuthState};
use crate::constants::{API_BASE, MULTIPART_OVERHEAD_BYTES};
use crate::error::redact_error_details;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubely_core::{Config, StorageBackend};
use tubely_infra::request_id_middleware;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let config = &state.config;
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState {
        jwt_secret: config.jwt_secret().to_string(),
        jwt_issuer: config.jwt_issuer().to_string(),
    });

    let protected_routes = video_routes(config).layer(axum::middleware::from_fn_with_state(
        auth_state,
        auth_middleware,
    ));

    let mut app = public_routes()
        .merge(protected_routes)
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"));

    if config.storage_backend() == StorageBackend::Local {
        app = local_media_routes(app, config);
    }

    if config.is_production() {
        app = app.layer(axum::middleware::from_fn(redact_error_details));
    }

    let app = app
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Public routes (no authentication required)
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
}

/// Path component of the local media base URL, without a trailing slash.
///
/// `None` when the base URL points at the server root.
fn media_mount_path(base_url: &str) -> Option<String> {
    let without_scheme = base_url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(base_url);
    let path = without_scheme
        .find('/')
        .map(|idx| &without_scheme[idx..])
        .unwrap_or("")
        .trim_end_matches('/');

    (!path.is_empty()).then(|| path.to_string())
}

/// Serve objects written by the local backend under its public base URL.
fn local_media_routes(app: Router<Arc<AppState>>, config: &Config) -> Router<Arc<AppState>> {
    let files = ServeDir::new(config.local_storage_path());

    match media_mount_path(config.local_storage_base_url()) {
        Some(mount) => {
            tracing::info!(
                mount = %mount,
                path = %config.local_storage_path(),
                "Serving local media"
            );
            app.nest_service(&mount, files)
        }
        None => {
            tracing::info!(path = %config.local_storage_path(), "Serving local media at root");
            app.fallback_service(files)
        }
    }
}

/// Video routes; the upload route lifts axum's default body limit to the video cap.
fn video_routes(config: &Config) -> Router<Arc<AppState>> {
    let upload_limit = usize::try_from(config.max_video_upload_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route(
            &format!("{}/videos", API_BASE),
            post(handlers::videos::create_video).get(handlers::videos::list_videos),
        )
        .route(
            &format!("{}/videos/{{video_id}}", API_BASE),
            get(handlers::videos::get_video),
        )
        .route(
            &format!("{}/videos/{{video_id}}/upload", API_BASE),
            post(handlers::video_upload::upload_video).layer(DefaultBodyLimit::max(upload_limit)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_mount_path() {
        assert_eq!(
            media_mount_path("http://localhost:8091/media").as_deref(),
            Some("/media")
        );
        assert_eq!(
            media_mount_path("https://cdn.example.com/static/videos/").as_deref(),
            Some("/static/videos")
        );
        assert_eq!(media_mount_path("http://localhost:8091"), None);
        assert_eq!(media_mount_path("http://localhost:8091/"), None);
    }
}
