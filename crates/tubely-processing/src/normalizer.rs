//! Fast-start remuxing via ffmpeg.

use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::MediaError;
use crate::tool::run_tool;

/// Suffix appended to the input path to name the remuxed copy.
pub const NORMALIZED_SUFFIX: &str = ".processing";

/// `input` with [`NORMALIZED_SUFFIX`] appended.
pub fn faststart_output_path(input: &Path) -> PathBuf {
    let mut path = input.as_os_str().to_owned();
    path.push(NORMALIZED_SUFFIX);
    PathBuf::from(path)
}

/// Produces a playback-optimized copy of a local media file.
///
/// The copy lands at `output_path_for(input)` and belongs to the caller, who must
/// delete it, including after a failed run that may have left a partial file.
#[async_trait]
pub trait MediaNormalizer: Send + Sync {
    fn output_path_for(&self, input: &Path) -> PathBuf {
        faststart_output_path(input)
    }

    async fn normalize(&self, input: &Path) -> Result<PathBuf, MediaError>;
}

/// Copies audio and video streams as-is into an MP4 with the moov atom first.
pub struct FfmpegNormalizer {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegNormalizer {
    pub fn new(ffmpeg_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl MediaNormalizer for FfmpegNormalizer {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn normalize(&self, input: &Path) -> Result<PathBuf, MediaError> {
        let start = std::time::Instant::now();
        let output_path = self.output_path_for(input);

        let args: Vec<&OsStr> = vec![
            OsStr::new("-y"),
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-i"),
            input.as_os_str(),
            OsStr::new("-c"),
            OsStr::new("copy"),
            OsStr::new("-movflags"),
            OsStr::new("faststart"),
            OsStr::new("-f"),
            OsStr::new("mp4"),
            output_path.as_os_str(),
        ];
        run_tool(&self.ffmpeg_path, args, self.timeout)
            .await
            .map_err(|e| MediaError::NormalizeFailed(e.to_string()))?;

        tracing::debug!(
            output = %output_path.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "ffmpeg remux finished"
        );

        Ok(output_path)
    }
}
