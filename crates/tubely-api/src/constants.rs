//! API constants

/// API base path prefix
pub const API_BASE: &str = "/api";

/// Multipart field that carries the uploaded video file.
pub const VIDEO_FIELD: &str = "video";

/// Room for multipart boundaries and part headers on top of the video size cap.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
