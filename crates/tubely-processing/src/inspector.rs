//! Media inspection via ffprobe.

use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tubely_core::AspectClassification;

use crate::error::MediaError;
use crate::tool::run_tool;

/// Stream listing as printed by `ffprobe -print_format json -show_streams`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeReport {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeStream {
    pub index: Option<u32>,
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub display_aspect_ratio: Option<String>,
}

impl ProbeReport {
    /// Parse raw `ffprobe -print_format json` stdout.
    pub fn parse(stdout: &[u8]) -> Result<Self, MediaError> {
        serde_json::from_slice(stdout)
            .map_err(|e| MediaError::ProbeFailed(format!("unparsable ffprobe output: {}", e)))
    }

    /// Classify by the first video stream's display aspect ratio.
    ///
    /// Streams without a `codec_type` are treated as video. A report with zero
    /// streams is an error rather than `Other`.
    pub fn classify(&self) -> Result<AspectClassification, MediaError> {
        if self.streams.is_empty() {
            return Err(MediaError::NoStreamFound);
        }

        let ratio = self
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref().map_or(true, |t| t == "video"))
            .and_then(|s| s.display_aspect_ratio.as_deref());

        Ok(AspectClassification::from_display_aspect_ratio(ratio))
    }
}

/// Parse raw ffprobe stdout and classify it.
pub fn classify_probe_output(stdout: &[u8]) -> Result<AspectClassification, MediaError> {
    ProbeReport::parse(stdout)?.classify()
}

/// Reads stream geometry from a local media file.
#[async_trait]
pub trait MediaInspector: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<ProbeReport, MediaError>;

    async fn inspect(&self, path: &Path) -> Result<AspectClassification, MediaError> {
        self.probe(path).await?.classify()
    }
}

pub struct FfprobeInspector {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeInspector {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl MediaInspector for FfprobeInspector {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> Result<ProbeReport, MediaError> {
        let start = std::time::Instant::now();

        let args: Vec<&OsStr> = vec![
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-print_format"),
            OsStr::new("json"),
            OsStr::new("-show_streams"),
            path.as_os_str(),
        ];
        let output = run_tool(&self.ffprobe_path, args, self.timeout)
            .await
            .map_err(|e| MediaError::ProbeFailed(e.to_string()))?;

        let report = ProbeReport::parse(&output.stdout)?;

        tracing::debug!(
            streams = report.streams.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "ffprobe finished"
        );

        Ok(report)
    }
}
