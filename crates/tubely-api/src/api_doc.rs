//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use tubely_core::models;
use tubely_infra::ErrorResponse;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely API",
        version = "0.1.0",
        description = "Video upload service. Uploaded MP4s are classified by aspect ratio, remuxed for fast start and stored in object storage."
    ),
    paths(
        handlers::health::health_check,
        handlers::videos::create_video,
        handlers::videos::list_videos,
        handlers::videos::get_video,
        handlers::video_upload::upload_video,
    ),
    components(schemas(
        models::CreateVideoRequest,
        models::VideoResponse,
        handlers::health::HealthResponse,
        ErrorResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "videos", description = "Video records and uploads"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
