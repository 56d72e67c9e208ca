//! Tubely Processing Library
//!
//! The video upload pipeline and the media tools it drives:
//!
//! - [`FfprobeInspector`] classifies a staged file by display aspect ratio.
//! - [`FfmpegNormalizer`] remuxes it into a fast-start MP4 without re-encoding.
//! - [`VideoUploadPipeline`] stages, inspects, normalizes, stores and records an
//!   upload, deleting every scratch file it created on the way out.

pub mod error;
pub mod inspector;
pub mod normalizer;
mod tool;
pub mod upload;
pub mod validator;

pub use error::MediaError;
pub use inspector::{classify_probe_output, FfprobeInspector, MediaInspector, ProbeReport, ProbeStream};
pub use normalizer::{faststart_output_path, FfmpegNormalizer, MediaNormalizer, NORMALIZED_SUFFIX};
pub use upload::{
    BodyError, ScratchPath, StagedUpload, VideoLocationStrategy, VideoUploadPipeline,
    STAGED_UPLOAD_PREFIX,
};
pub use validator::{normalize_content_type, validate_video_content_type, VIDEO_CONTENT_TYPE};
