use std::time::Duration;
use tubely_core::{AppError, Config, VideoUrlMode};
use tubely_storage::{Storage, StorageObjectKey, StorageReference};

/// How a stored object's location is written to, and read back from, a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoLocationStrategy {
    /// Public `{base_url}/{key}` URLs behind a distribution endpoint.
    Distribution { base_url: String },
    /// `{bucket},{key}` references, exchanged for a presigned URL valid for `ttl`
    /// on every read.
    Signed { ttl: Duration },
}

impl VideoLocationStrategy {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        match config.video_url_mode() {
            VideoUrlMode::Distribution => {
                let base_url = config.distribution_url().ok_or_else(|| {
                    AppError::Internal("S3_CF_DISTRIBUTION not configured".to_string())
                })?;
                Ok(VideoLocationStrategy::Distribution {
                    base_url: base_url.trim_end_matches('/').to_string(),
                })
            }
            VideoUrlMode::Signed => Ok(VideoLocationStrategy::Signed {
                ttl: config.signed_url_ttl(),
            }),
        }
    }

    pub fn mode(&self) -> VideoUrlMode {
        match self {
            VideoLocationStrategy::Distribution { .. } => VideoUrlMode::Distribution,
            VideoLocationStrategy::Signed { .. } => VideoUrlMode::Signed,
        }
    }

    /// The value persisted as `video_location` for an object stored under `key`.
    pub fn location_for(&self, bucket: &str, key: &StorageObjectKey) -> String {
        match self {
            VideoLocationStrategy::Distribution { base_url } => {
                format!("{}/{}", base_url.trim_end_matches('/'), key)
            }
            VideoLocationStrategy::Signed { .. } => {
                StorageReference::new(bucket, key.as_str()).to_string()
            }
        }
    }

    /// Turn a persisted `video_location` into a URL a client can fetch.
    ///
    /// An absent location stays absent.
    pub async fn resolve(
        &self,
        storage: &dyn Storage,
        stored: Option<&str>,
    ) -> Result<Option<String>, AppError> {
        let stored = match stored {
            Some(stored) => stored,
            None => return Ok(None),
        };

        match self {
            VideoLocationStrategy::Distribution { .. } => Ok(Some(stored.to_string())),
            VideoLocationStrategy::Signed { ttl } => {
                let reference = StorageReference::parse(stored)?;
                let url = storage
                    .sign(&reference.bucket, &reference.key, *ttl)
                    .await
                    .map_err(|e| AppError::SignFailure(e.to_string()))?;
                Ok(Some(url))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tubely_core::AspectClassification;
    use tubely_storage::LocalStorage;

    #[test]
    fn test_distribution_location() {
        let strategy = VideoLocationStrategy::Distribution {
            base_url: "https://d111111abcdef8.cloudfront.net/".to_string(),
        };
        let key = StorageObjectKey::for_classification(AspectClassification::Landscape, "mp4");

        let location = strategy.location_for("ignored", &key);
        assert_eq!(
            location,
            format!("https://d111111abcdef8.cloudfront.net/{}", key)
        );
        assert!(location.contains("/landscape/"));
    }

    #[test]
    fn test_signed_location_is_a_reference() {
        let strategy = VideoLocationStrategy::Signed {
            ttl: Duration::from_secs(60),
        };
        let key = StorageObjectKey::for_classification(AspectClassification::Portrait, "mp4");

        let location = strategy.location_for("tubely-videos", &key);
        let reference = StorageReference::parse(&location).unwrap();
        assert_eq!(reference.bucket, "tubely-videos");
        assert_eq!(reference.key, key.as_str());
    }

    #[tokio::test]
    async fn test_resolve() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(
            dir.path(),
            "http://localhost:8091/media".to_string(),
            "local".to_string(),
        )
        .await
        .unwrap();
        let signed = VideoLocationStrategy::Signed {
            ttl: Duration::from_secs(60),
        };

        assert_eq!(signed.resolve(&storage, None).await.unwrap(), None);
        assert_eq!(
            signed
                .resolve(&storage, Some("local,other/abc.mp4"))
                .await
                .unwrap()
                .as_deref(),
            Some("http://localhost:8091/media/other/abc.mp4")
        );
        assert!(matches!(
            signed.resolve(&storage, Some("https://cdn/other/abc.mp4")).await,
            Err(AppError::MalformedReference(_))
        ));
        assert!(matches!(
            signed.resolve(&storage, Some("elsewhere,other/abc.mp4")).await,
            Err(AppError::SignFailure(_))
        ));

        let public = VideoLocationStrategy::Distribution {
            base_url: "https://cdn".to_string(),
        };
        assert_eq!(
            public
                .resolve(&storage, Some("https://cdn/other/abc.mp4"))
                .await
                .unwrap()
                .as_deref(),
            Some("https://cdn/other/abc.mp4")
        );
    }
}
