//! Error types module
//!
//! All failures that can reach a client are unified under [`AppError`]. Each
//! variant describes its own HTTP presentation through [`ErrorMetadata`], so the
//! API layer never has to match on variants itself.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for client-caused failures worth noticing
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "PROBE_FAILURE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Probe failed: {0}")]
    ProbeFailure(String),

    #[error("No stream found: {0}")]
    NoStreamFound(String),

    #[error("Normalize failed: {0}")]
    NormalizeFailure(String),

    #[error("Staging failed: {0}")]
    StagingFailure(String),

    #[error("Store failed: {0}")]
    StoreFailure(String),

    #[error("Sign failed: {0}")]
    SignFailure(String),

    #[error("Persist failed: {0}")]
    PersistFailure(String),

    #[error("Malformed reference: {0}")]
    MalformedReference(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::BadRequest(format!("Invalid identifier: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Provide a valid bearer token"),
            false,
            LogLevel::Debug,
        ),
        AppError::Forbidden(_) => (
            403,
            "FORBIDDEN",
            false,
            Some("Only the owner of a video can modify it"),
            false,
            LogLevel::Warn,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Conflict(_) => (
            409,
            "CONFLICT",
            true,
            Some("Reload the video and retry the upload"),
            false,
            LogLevel::Warn,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedMediaType(_) => (
            415,
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Upload an MP4 video"),
            false,
            LogLevel::Debug,
        ),
        AppError::ProbeFailure(_) => (
            422,
            "PROBE_FAILURE",
            false,
            Some("Check that the file is a valid video"),
            false,
            LogLevel::Warn,
        ),
        AppError::NoStreamFound(_) => (
            422,
            "NO_STREAM_FOUND",
            false,
            Some("Upload a file that contains a video stream"),
            false,
            LogLevel::Warn,
        ),
        AppError::NormalizeFailure(_) => (
            500,
            "NORMALIZE_FAILURE",
            false,
            Some("Contact support if this error persists"),
            true,
            LogLevel::Error,
        ),
        AppError::StagingFailure(_) => (
            500,
            "STAGING_FAILURE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::StoreFailure(_) => (
            502,
            "STORE_FAILURE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::SignFailure(_) => (
            502,
            "SIGN_FAILURE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::PersistFailure(_) => (
            500,
            "PERSIST_FAILURE",
            true,
            Some("Retry the upload after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::MalformedReference(_) => (
            500,
            "MALFORMED_REFERENCE",
            false,
            Some("Re-upload the video"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::BadRequest(_) => "BadRequest",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden(_) => "Forbidden",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::UnsupportedMediaType(_) => "UnsupportedMediaType",
            AppError::ProbeFailure(_) => "ProbeFailure",
            AppError::NoStreamFound(_) => "NoStreamFound",
            AppError::NormalizeFailure(_) => "NormalizeFailure",
            AppError::StagingFailure(_) => "StagingFailure",
            AppError::StoreFailure(_) => "StoreFailure",
            AppError::SignFailure(_) => "SignFailure",
            AppError::PersistFailure(_) => "PersistFailure",
            AppError::MalformedReference(_) => "MalformedReference",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::Forbidden(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Conflict(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::UnsupportedMediaType(ref msg) => msg.clone(),
            AppError::ProbeFailure(_) => "Could not read video metadata".to_string(),
            AppError::NoStreamFound(_) => "The uploaded file contains no streams".to_string(),
            AppError::NormalizeFailure(_) => "Failed to prepare video for playback".to_string(),
            AppError::StagingFailure(_) => "Failed to receive upload".to_string(),
            AppError::StoreFailure(_) => "Failed to store video".to_string(),
            AppError::SignFailure(_) => "Failed to create video URL".to_string(),
            AppError::PersistFailure(_) => "Failed to save video metadata".to_string(),
            AppError::MalformedReference(_) => "Stored video location is invalid".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn every_variant() -> Vec<AppError> {
        vec![
            #[cfg(feature = "sqlx")]
            AppError::Database(sqlx::Error::PoolClosed),
            #[cfg(not(feature = "sqlx"))]
            AppError::Database("pool closed".to_string()),
            AppError::BadRequest("x".to_string()),
            AppError::Unauthorized("x".to_string()),
            AppError::Forbidden("x".to_string()),
            AppError::NotFound("x".to_string()),
            AppError::Conflict("x".to_string()),
            AppError::PayloadTooLarge("x".to_string()),
            AppError::UnsupportedMediaType("x".to_string()),
            AppError::ProbeFailure("x".to_string()),
            AppError::NoStreamFound("x".to_string()),
            AppError::NormalizeFailure("x".to_string()),
            AppError::StagingFailure("x".to_string()),
            AppError::StoreFailure("x".to_string()),
            AppError::SignFailure("x".to_string()),
            AppError::PersistFailure("x".to_string()),
            AppError::MalformedReference("x".to_string()),
            AppError::Internal("x".to_string()),
        ]
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let variants = every_variant();
        let codes: HashSet<_> = variants.iter().map(|e| e.error_code()).collect();
        assert_eq!(codes.len(), variants.len());
    }

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_upload_rejections() {
        let err = AppError::UnsupportedMediaType("image/png is not accepted".to_string());
        assert_eq!(err.http_status_code(), 415);
        assert_eq!(err.client_message(), "image/png is not accepted");
        assert!(!err.is_sensitive());

        let err = AppError::PayloadTooLarge("limit is 10 bytes".to_string());
        assert_eq!(err.http_status_code(), 413);

        let err = AppError::Forbidden("not yours".to_string());
        assert_eq!(err.http_status_code(), 403);
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_media_failures_hide_tool_output() {
        let err = AppError::ProbeFailure("ffprobe exited with 1: moov atom not found".to_string());
        assert_eq!(err.http_status_code(), 422);
        assert!(!err.client_message().contains("moov"));

        let err = AppError::NormalizeFailure("ffmpeg exited with 1".to_string());
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("ffmpeg"));
    }

    #[test]
    fn test_error_metadata_suggested_actions() {
        let err = AppError::NotFound("test".to_string());
        assert_eq!(err.suggested_action(), Some("Verify the resource ID exists"));

        let err = AppError::Conflict("test".to_string());
        assert!(err.is_recoverable());
        assert_eq!(err.http_status_code(), 409);
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let err = AppError::from(anyhow::anyhow!("root cause").context("outer"));
        let details = err.detailed_message();
        assert!(details.contains("Internal error with source"));
        assert!(details.contains("Caused by: outer"));
    }
}
