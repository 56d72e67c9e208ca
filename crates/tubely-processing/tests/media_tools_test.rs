//! Drives the ffprobe and ffmpeg adapters against shell-script stand-ins.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;
use tokio::sync::Mutex;
use tubely_core::AspectClassification;
use tubely_processing::{
    faststart_output_path, FfmpegNormalizer, FfprobeInspector, MediaError, MediaInspector,
    MediaNormalizer,
};

// Scripts are written then executed immediately; running tests one at a time
// keeps a concurrent fork from holding a script open for writing.
static LOCK: Mutex<()> = Mutex::const_new(());

const TIMEOUT: Duration = Duration::from_secs(10);

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn staged_file(dir: &Path) -> PathBuf {
    let path = dir.join("tubely-upload-test.mp4");
    std::fs::write(&path, b"not really an mp4").unwrap();
    path
}

#[tokio::test]
async fn test_ffprobe_output_is_classified() {
    let _guard = LOCK.lock().await;
    let dir = tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "ffprobe",
        r#"cat <<'JSON'
{"streams":[{"index":0,"codec_type":"audio"},{"index":1,"codec_type":"video","width":1080,"height":1920,"display_aspect_ratio":"9:16"}]}
JSON"#,
    );
    let inspector = FfprobeInspector::new(script.to_string_lossy(), TIMEOUT);

    let classification = inspector.inspect(&staged_file(dir.path())).await.unwrap();

    assert_eq!(classification, AspectClassification::Portrait);
}

#[tokio::test]
async fn test_ffprobe_without_streams() {
    let _guard = LOCK.lock().await;
    let dir = tempdir().unwrap();
    let script = write_script(dir.path(), "ffprobe", r#"echo '{"streams":[]}'"#);
    let inspector = FfprobeInspector::new(script.to_string_lossy(), TIMEOUT);

    let result = inspector.inspect(&staged_file(dir.path())).await;

    assert!(matches!(result, Err(MediaError::NoStreamFound)));
}

#[tokio::test]
async fn test_ffprobe_garbage_output() {
    let _guard = LOCK.lock().await;
    let dir = tempdir().unwrap();
    let script = write_script(dir.path(), "ffprobe", "echo 'streams: none'");
    let inspector = FfprobeInspector::new(script.to_string_lossy(), TIMEOUT);

    let result = inspector.inspect(&staged_file(dir.path())).await;

    match result {
        Err(MediaError::ProbeFailed(msg)) => assert!(msg.contains("unparsable"), "{}", msg),
        other => panic!("Expected ProbeFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_ffprobe_nonzero_exit() {
    let _guard = LOCK.lock().await;
    let dir = tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "ffprobe",
        "echo 'Invalid data found when processing input' >&2\nexit 1",
    );
    let inspector = FfprobeInspector::new(script.to_string_lossy(), TIMEOUT);

    let result = inspector.inspect(&staged_file(dir.path())).await;

    match result {
        Err(MediaError::ProbeFailed(msg)) => {
            assert!(msg.contains("Invalid data found"), "{}", msg)
        }
        other => panic!("expected ProbeFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_ffprobe_binary() {
    let dir = tempdir().unwrap();
    let inspector = FfprobeInspector::new(
        dir.path().join("does-not-exist").to_string_lossy(),
        TIMEOUT,
    );

    let result = inspector.inspect(&staged_file(dir.path())).await;

    assert!(matches!(result, Err(MediaError::ProbeFailed(_))));
}

#[tokio::test]
async fn test_ffprobe_timeout() {
    let _guard = LOCK.lock().await;
    let dir = tempdir().unwrap();
    let script = write_script(dir.path(), "ffprobe", "sleep 30");
    let inspector = FfprobeInspector::new(script.to_string_lossy(), Duration::from_millis(200));

    let result = inspector.inspect(&staged_file(dir.path())).await;

    match result {
        Err(MediaError::ProbeFailed(msg)) => assert!(msg.contains("timed out"), "{}", msg),
        other => panic!("expected ProbeFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_ffmpeg_writes_faststart_copy() {
    let _guard = LOCK.lock().await;
    let dir = tempdir().unwrap();
    // The output path is the last argument.
    let script = write_script(
        dir.path(),
        "ffmpeg",
        r#"for last; do :; done
echo "remuxed" > "$last""#,
    );
    let normalizer = FfmpegNormalizer::new(script.to_string_lossy(), TIMEOUT);
    let input = staged_file(dir.path());

    let output = normalizer.normalize(&input).await.unwrap();

    assert_eq!(output, faststart_output_path(&input));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "remuxed\n");
    assert!(input.exists());
}

#[tokio::test]
async fn test_ffmpeg_failure() {
    let _guard = LOCK.lock().await;
    let dir = tempdir().unwrap();
    let script = write_script(dir.path(), "ffmpeg", "echo 'moov atom not found' >&2\nexit 1");
    let normalizer = FfmpegNormalizer::new(script.to_string_lossy(), TIMEOUT);

    let result = normalizer.normalize(&staged_file(dir.path())).await;

    match result {
        Err(MediaError::NormalizeFailed(msg)) => {
            assert!(msg.contains("moov atom not found"), "{}", msg)
        }
        other => panic!("expected NormalizeFailed, got {:?}", other),
    }
}
