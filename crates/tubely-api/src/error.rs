//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; anything that
//! converts into `AppError` can be propagated with `?` and renders the same
//! JSON body, status and log line.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use tubely_core::{AppError, ErrorMetadata, LogLevel};
use tubely_infra::ErrorResponse;
use tubely_storage::StorageError;

/// Wrapper type for AppError to implement IntoResponse
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::BadRequest(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that rejects with our ErrorResponse format (400) instead of
/// axum's plain-text rejection.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, code = code, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, code = code, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error,
                details = %error.detailed_message(),
                error_type = error_type,
                code = code,
                "Request failed"
            );
        }
    }
}

/// Error body attached to a rendered error response.
#[derive(Debug, Clone)]
struct RenderedError(ErrorResponse);

/// Build the client-facing body; `details` only outside production and never for
/// sensitive errors.
pub fn error_response(app_error: &AppError, is_production: bool) -> ErrorResponse {
    let expose = !is_production && !app_error.is_sensitive();
    ErrorResponse {
        error: app_error.client_message(),
        details: expose.then(|| app_error.detailed_message()),
        error_type: expose.then(|| app_error.error_type().to_string()),
        code: app_error.error_code().to_string(),
        recoverable: app_error.is_recoverable(),
        suggested_action: app_error.suggested_action().map(String::from),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = error_response(app_error, false);
        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(RenderedError(body));
        response
    }
}

/// Strip `details` and `error_type` from every error body; installed in production.
pub async fn redact_error_details(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let Some(RenderedError(body)) = response.extensions_mut().remove::<RenderedError>() else {
        return response;
    };

    let redacted = ErrorResponse {
        details: None,
        error_type: None,
        ..body
    };
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Json(redacted).into_response().into_body())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error_sign_failed() {
        let HttpAppError(app_err) = StorageError::SignFailed("expired creds".to_string()).into();
        match app_err {
            AppError::SignFailure(msg) => assert_eq!(msg, "expired creds"),
            other => panic!("Expected SignFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_from_storage_error_malformed_reference() {
        let HttpAppError(app_err) =
            StorageError::MalformedReference("no comma".to_string()).into();
        assert!(matches!(app_err, AppError::MalformedReference(_)));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (
                AppError::UnsupportedMediaType("x".into()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                AppError::PayloadTooLarge("x".into()),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                AppError::ProbeFailure("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppError::StoreFailure("x".into()), StatusCode::BAD_GATEWAY),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
        ];

        for (err, expected) in cases {
            let response = HttpAppError(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_details_hidden_in_production() {
        let err = AppError::BadRequest("Missing multipart field".to_string());

        let dev = error_response(&err, false);
        assert!(dev.details.is_some());
        assert_eq!(dev.code, err.error_code());

        let prod = error_response(&err, true);
        assert!(prod.details.is_none());
        assert!(prod.error_type.is_none());
        assert_eq!(prod.code, dev.code);
    }

    #[tokio::test]
    async fn test_redact_error_details_strips_diagnostics() {
        use axum::{routing::get, Router};
        use axum_test::TestServer;

        let app = Router::new()
            .route(
                "/fail",
                get(|| async {
                    Err::<(), _>(HttpAppError(AppError::BadRequest(
                        "internal detail /var/tmp/x".to_string(),
                    )))
                }),
            )
            .route("/ok", get(|| async { "fine" }))
            .layer(axum::middleware::from_fn(redact_error_details));
        let server = TestServer::new(app.into_make_service()).unwrap();

        let response = server.get("/fail").await;
        assert_eq!(response.status_code(), 400);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "BAD_REQUEST");
        assert!(body.get("details").is_none());
        assert!(body.get("error_type").is_none());

        let response = server.get("/ok").await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.text(), "fine");
    }

    #[test]
    fn test_sensitive_errors_hide_details() {
        let err = AppError::PersistFailure("connection refused at 10.0.0.3:5432".to_string());
        let body = error_response(&err, false);

        assert!(body.details.is_none());
        assert!(!body.error.contains("10.0.0.3"));
    }

    #[test]
    fn test_error_response_shape() {
        let err = AppError::NotFound("Video not found".to_string());
        let json = serde_json::to_value(error_response(&err, false)).unwrap();

        assert!(json.get("error").and_then(|v| v.as_str()).is_some());
        assert!(json.get("code").and_then(|v| v.as_str()).is_some());
        assert!(json.get("recoverable").and_then(|v| v.as_bool()).is_some());
    }
}
