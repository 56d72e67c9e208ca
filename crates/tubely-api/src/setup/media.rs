//! Media tool and staging directory setup

use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_processing::{FfmpegNormalizer, FfprobeInspector, MediaInspector, MediaNormalizer};

/// Build the ffprobe/ffmpeg adapters and make sure the staging directory exists.
///
/// Missing binaries only produce a warning; uploads fail with a probe error until
/// they are installed.
pub async fn setup_media_tools(
    config: &Config,
) -> Result<(Arc<dyn MediaInspector>, Arc<dyn MediaNormalizer>)> {
    tokio::fs::create_dir_all(config.staging_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to create staging directory {}",
                config.staging_dir().display()
            )
        })?;

    for tool in [config.ffprobe_path(), config.ffmpeg_path()] {
        let available = tokio::process::Command::new(tool)
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false);
        if !available {
            tracing::warn!(tool = %tool, "Media tool not found or not runnable");
        }
    }

    let timeout = config.media_tool_timeout();
    tracing::info!(
        ffprobe = %config.ffprobe_path(),
        ffmpeg = %config.ffmpeg_path(),
        timeout_secs = timeout.as_secs(),
        staging_dir = %config.staging_dir().display(),
        "Media tools configured"
    );

    Ok((
        Arc::new(FfprobeInspector::new(config.ffprobe_path(), timeout)),
        Arc::new(FfmpegNormalizer::new(config.ffmpeg_path(), timeout)),
    ))
}
