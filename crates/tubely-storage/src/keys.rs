//! Object key generation for uploaded videos.
//!
//! Key format: `{prefix}/{hex of 32 random bytes}.{extension}`. The random part comes
//! from a cryptographically secure generator so keys are neither guessable nor
//! sequential.

use rand::RngCore;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tubely_core::AspectClassification;

/// Number of random bytes in every generated key (256 bits).
pub const KEY_ENTROPY_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageObjectKey(String);

impl StorageObjectKey {
    /// Generate a fresh key under `prefix`.
    pub fn generate(prefix: &str, extension: &str) -> Self {
        let mut bytes = [0u8; KEY_ENTROPY_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(format!("{}/{}.{}", prefix, hex::encode(bytes), extension))
    }

    /// Generate a fresh key under the classification's path prefix.
    pub fn for_classification(classification: AspectClassification, extension: &str) -> Self {
        Self::generate(classification.as_prefix(), extension)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for StorageObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for StorageObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}
