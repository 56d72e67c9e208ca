//! Declared content-type checks for uploads.
//!
//! The declared type comes from the client and only decides whether the upload
//! is routed into the video pipeline; nothing downstream trusts it for security.

use tubely_core::AppError;

/// The only media type the video pipeline accepts.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Strip parameters and whitespace and lowercase a content type.
///
/// `"Video/MP4; codecs=avc1"` becomes `"video/mp4"`.
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// Accept exactly `video/mp4`, returning the canonical form.
pub fn validate_video_content_type(declared: Option<&str>) -> Result<&'static str, AppError> {
    let declared = declared.ok_or_else(|| {
        AppError::UnsupportedMediaType("Missing content type; expected video/mp4".to_string())
    })?;

    if normalize_content_type(declared) == VIDEO_CONTENT_TYPE {
        Ok(VIDEO_CONTENT_TYPE)
    } else {
        Err(AppError::UnsupportedMediaType(format!(
            "Invalid content type {:?}; expected video/mp4",
            declared
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_content_type() {
        assert_eq!(normalize_content_type("video/mp4"), "video/mp4");
        assert_eq!(normalize_content_type(" Video/MP4 ; codecs=avc1"), "video/mp4");
        assert_eq!(normalize_content_type(""), "");
    }

    #[test]
    fn test_only_mp4_is_accepted() {
        assert_eq!(
            validate_video_content_type(Some("video/mp4; charset=binary")).unwrap(),
            "video/mp4"
        );
        for declared in [
            Some("video/quicktime"),
            Some("image/png"),
            Some("video/mp4x"),
            Some("application/octet-stream"),
            None,
        ] {
            assert!(
                matches!(
                    validate_video_content_type(declared),
                    Err(AppError::UnsupportedMediaType(_))
                ),
                "{:?}",
                declared
            );
        }
    }
}
