//! Scratch files owned by a single pipeline run.
//!
//! Both types delete their file on drop, so every exit path of the pipeline,
//! including early returns through `?`, leaves the staging directory clean.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tubely_core::AppError;

/// File name prefix of every staged upload.
pub const STAGED_UPLOAD_PREFIX: &str = "tubely-upload-";

/// Failure reported by the request body stream feeding a staged upload.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body exceeds the upload limit")]
    LimitExceeded,

    #[error("failed to read request body: {0}")]
    Read(String),
}

fn too_large(max_bytes: u64) -> AppError {
    AppError::PayloadTooLarge(format!(
        "Video exceeds the maximum upload size of {} bytes",
        max_bytes
    ))
}

/// Upload bytes written to a temporary file in the staging directory.
pub struct StagedUpload {
    // Declared before `path` so the handle is closed before the file is removed.
    file: File,
    path: TempPath,
    size_bytes: u64,
}

impl StagedUpload {
    pub fn create(dir: &Path) -> Result<Self, AppError> {
        let named = tempfile::Builder::new()
            .prefix(STAGED_UPLOAD_PREFIX)
            .suffix(".mp4")
            .tempfile_in(dir)
            .map_err(|e| {
                AppError::StagingFailure(format!(
                    "Failed to create staging file in {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        let (file, path) = named.into_parts();

        Ok(Self {
            file: File::from_std(file),
            path,
            size_bytes: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Copy `body` to disk, failing as soon as more than `max_bytes` arrive.
    pub async fn write_stream<S>(&mut self, mut body: S, max_bytes: u64) -> Result<u64, AppError>
    where
        S: Stream<Item = Result<Bytes, BodyError>> + Unpin,
    {
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| match e {
                BodyError::LimitExceeded => too_large(max_bytes),
                BodyError::Read(msg) => {
                    AppError::StagingFailure(format!("Failed to read upload body: {}", msg))
                }
            })?;

            let total = self.size_bytes + chunk.len() as u64;
            if total > max_bytes {
                return Err(too_large(max_bytes));
            }

            self.file.write_all(&chunk).await.map_err(|e| {
                AppError::StagingFailure(format!("Failed to write staging file: {}", e))
            })?;
            self.size_bytes = total;
        }

        self.file
            .flush()
            .await
            .map_err(|e| AppError::StagingFailure(format!("Failed to flush staging file: {}", e)))?;

        if self.size_bytes == 0 {
            return Err(AppError::BadRequest("Uploaded video is empty".to_string()));
        }

        Ok(self.size_bytes)
    }

    /// Seek back to the first byte before anything reads the staged file.
    pub async fn rewind(&mut self) -> Result<(), AppError> {
        self.file
            .seek(SeekFrom::Start(0))
            .await
            .map(|_| ())
            .map_err(|e| AppError::StagingFailure(format!("Failed to rewind staging file: {}", e)))
    }
}

/// Deletes whatever file sits at `path` when dropped.
///
/// Claimed before the file is created so a partially written output is removed too.
#[derive(Debug)]
pub struct ScratchPath {
    path: PathBuf,
}

impl ScratchPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchPath {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed scratch file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                error = %e,
                path = %self.path.display(),
                "Failed to remove scratch file"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use tempfile::tempdir;

    fn body(chunks: &[&'static str]) -> impl Stream<Item = Result<Bytes, BodyError>> + Unpin {
        stream::iter(
            chunks
                .iter()
                .map(|c| Ok(Bytes::from_static((*c).as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_staged_upload_is_removed_on_drop() {
        let dir = tempdir().unwrap();
        let mut staged = StagedUpload::create(dir.path()).unwrap();
        let path = staged.path().to_path_buf();

        let written = staged
            .write_stream(body(&["abc", "def"]), 1024)
            .await
            .unwrap();
        staged.rewind().await.unwrap();

        assert_eq!(written, 6);
        assert_eq!(std::fs::read(&path).unwrap(), b"abcdef");
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(STAGED_UPLOAD_PREFIX));

        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_cap_is_enforced_while_reading() {
        let dir = tempdir().unwrap();
        let mut staged = StagedUpload::create(dir.path()).unwrap();

        let result = staged.write_stream(body(&["12345", "67890"]), 8).await;

        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
        assert_eq!(staged.size_bytes(), 5);
    }

    #[tokio::test]
    async fn test_upstream_limit_maps_to_payload_too_large() {
        let dir = tempdir().unwrap();
        let mut staged = StagedUpload::create(dir.path()).unwrap();

        let chunks: Vec<Result<Bytes, BodyError>> = vec![
            Ok(Bytes::from_static(b"abc")),
            Err(BodyError::LimitExceeded),
        ];
        let result = staged.write_stream(stream::iter(chunks), 1024).await;

        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
    }

    #[tokio::test]
    async fn test_empty_body_is_rejected() {
        let dir = tempdir().unwrap();
        let mut staged = StagedUpload::create(dir.path()).unwrap();

        let result = staged.write_stream(body(&[]), 1024).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_scratch_path_removes_file_and_tolerates_missing() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("present.processing");
        std::fs::write(&present, b"partial").unwrap();

        drop(ScratchPath::new(&present));
        drop(ScratchPath::new(dir.path().join("never-created.processing")));

        assert!(!present.exists());
    }
}
