use thiserror::Error;
use tubely_core::AppError;

/// Failures of the external media tools
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    #[error("Probe reported no streams")]
    NoStreamFound,

    #[error("Normalize failed: {0}")]
    NormalizeFailed(String),
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::ProbeFailed(msg) => AppError::ProbeFailure(msg),
            MediaError::NoStreamFound => {
                AppError::NoStreamFound("probe reported zero streams".to_string())
            }
            MediaError::NormalizeFailed(msg) => AppError::NormalizeFailure(msg),
        }
    }
}
