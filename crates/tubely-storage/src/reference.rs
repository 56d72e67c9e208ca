//! `{bucket},{key}` references.
//!
//! Deployments that serve videos through presigned URLs persist this composite
//! string instead of a URL and resolve it on every read.

use crate::traits::{StorageError, StorageResult};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

const SEPARATOR: char = ',';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageReference {
    pub bucket: String,
    pub key: String,
}

impl StorageReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Split a stored reference on the literal comma.
    ///
    /// Exactly two non-empty fields are required.
    pub fn parse(value: &str) -> StorageResult<Self> {
        let mut parts = value.split(SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(bucket), Some(key), None) if !bucket.is_empty() && !key.is_empty() => {
                Ok(Self::new(bucket, key))
            }
            _ => Err(StorageError::MalformedReference(format!(
                "expected \"bucket,key\", got {:?}",
                value
            ))),
        }
    }
}

impl FromStr for StorageReference {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for StorageReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}{}", self.bucket, SEPARATOR, self.key)
    }
}
