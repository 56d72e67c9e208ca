use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Defined in core because both configuration and the storage factory need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

/// How an uploaded video's location is recorded on its metadata record.
///
/// `Distribution` stores a public URL under the configured distribution endpoint.
/// `Signed` stores a `{bucket},{key}` reference that is exchanged for a presigned
/// URL every time the record is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoUrlMode {
    Distribution,
    Signed,
}

impl FromStr for VideoUrlMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "distribution" | "public" => Ok(VideoUrlMode::Distribution),
            "signed" | "presigned" => Ok(VideoUrlMode::Signed),
            _ => Err(anyhow::anyhow!("Invalid video URL mode: {}", s)),
        }
    }
}

impl Display for VideoUrlMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            VideoUrlMode::Distribution => write!(f, "distribution"),
            VideoUrlMode::Signed => write!(f, "signed"),
        }
    }
}
