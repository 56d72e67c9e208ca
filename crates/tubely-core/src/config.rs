//! Configuration module
//!
//! Settings for the HTTP server, authentication, the metadata store, object storage
//! and the video upload pipeline. Everything is read from the process environment
//! after an optional `.env` file has been loaded.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::storage_types::{StorageBackend, VideoUrlMode};

const SERVER_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_ISSUER: &str = "tubely-access";
const DEFAULT_REGION: &str = "us-east-1";
const LOCAL_STORAGE_PATH: &str = "./storage";
const LOCAL_STORAGE_BUCKET: &str = "local";
const MAX_VIDEO_UPLOAD_BYTES: u64 = 1 << 30;
const SIGNED_URL_TTL_SECS: u64 = 4 * 60 * 60;
const MEDIA_TOOL_TIMEOUT_SECS: u64 = 600;

/// Server, authentication and database settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// When unset the service runs against an in-memory metadata store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
}

/// Object storage settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, R2, ...)
    pub aws_region: Option<String>,
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    pub local_storage_bucket: String,
    pub distribution_url: Option<String>,
    pub video_url_mode: VideoUrlMode,
    pub signed_url_ttl_seconds: u64,
}

/// Upload pipeline settings
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub max_video_upload_bytes: u64,
    pub staging_dir: PathBuf,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    pub media_tool_timeout_seconds: u64,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// `from_env` is this over the process environment; tests pass a map instead.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match var("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let cors_origins: Vec<String> = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port,
            environment,
            cors_origins,
            jwt_secret: var("JWT_SECRET")
                .ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_issuer: var("JWT_ISSUER").unwrap_or_else(|| JWT_ISSUER.to_string()),
            database_url: var("DATABASE_URL"),
            db_max_connections: parse_var(&var, "DB_MAX_CONNECTIONS", MAX_CONNECTIONS)?,
            db_timeout_seconds: parse_var(&var, "DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS)?,
        };

        let backend = match var("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let video_url_mode = match var("VIDEO_URL_MODE") {
            Some(value) => value.parse::<VideoUrlMode>()?,
            None => VideoUrlMode::Distribution,
        };

        let storage = StorageConfig {
            backend,
            s3_bucket: var("S3_BUCKET"),
            s3_region: var("S3_REGION"),
            s3_endpoint: var("S3_ENDPOINT"),
            aws_region: var("AWS_REGION"),
            local_storage_path: var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|| LOCAL_STORAGE_PATH.to_string()),
            local_storage_base_url: var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}/media", server_port)),
            local_storage_bucket: var("LOCAL_STORAGE_BUCKET")
                .unwrap_or_else(|| LOCAL_STORAGE_BUCKET.to_string()),
            distribution_url: var("S3_CF_DISTRIBUTION"),
            video_url_mode,
            signed_url_ttl_seconds: parse_var(&var, "SIGNED_URL_TTL_SECONDS", SIGNED_URL_TTL_SECS)?,
        };

        let upload = UploadConfig {
            max_video_upload_bytes: parse_var(
                &var,
                "MAX_VIDEO_UPLOAD_BYTES",
                MAX_VIDEO_UPLOAD_BYTES,
            )?,
            staging_dir: var("UPLOAD_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            ffprobe_path: var("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            ffmpeg_path: var("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            media_tool_timeout_seconds: parse_var(
                &var,
                "MEDIA_TOOL_TIMEOUT_SECONDS",
                MEDIA_TOOL_TIMEOUT_SECS,
            )?,
        };

        let config = Config {
            base,
            storage,
            upload,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if let Some(url) = self.base.database_url.as_deref() {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.upload.max_video_upload_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_VIDEO_UPLOAD_BYTES must be greater than zero"
            ));
        }

        if self.upload.media_tool_timeout_seconds == 0 {
            return Err(anyhow::anyhow!(
                "MEDIA_TOOL_TIMEOUT_SECONDS must be greater than zero"
            ));
        }

        if self.storage.signed_url_ttl_seconds == 0 {
            return Err(anyhow::anyhow!(
                "SIGNED_URL_TTL_SECONDS must be greater than zero"
            ));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.video_url_mode == VideoUrlMode::Distribution
                    && self.storage.distribution_url.is_none()
                {
                    return Err(anyhow::anyhow!(
                        "S3_CF_DISTRIBUTION must be set when VIDEO_URL_MODE is distribution"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_bucket.contains(',') {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BUCKET must not contain a comma"
                    ));
                }
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.base.jwt_secret
    }

    pub fn jwt_issuer(&self) -> &str {
        &self.base.jwt_issuer
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn database_url(&self) -> Option<&str> {
        self.base.database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.base.db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage.backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.storage.s3_bucket.as_deref()
    }

    /// S3 region, falling back to `AWS_REGION` and then `us-east-1`.
    pub fn s3_region(&self) -> &str {
        self.storage
            .s3_region
            .as_deref()
            .or(self.storage.aws_region.as_deref())
            .unwrap_or(DEFAULT_REGION)
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.storage.s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> &str {
        &self.storage.local_storage_path
    }

    pub fn local_storage_base_url(&self) -> &str {
        &self.storage.local_storage_base_url
    }

    pub fn local_storage_bucket(&self) -> &str {
        &self.storage.local_storage_bucket
    }

    pub fn video_url_mode(&self) -> VideoUrlMode {
        self.storage.video_url_mode
    }

    /// Base URL that public video locations are composed under.
    ///
    /// Local storage has no CDN in front of it, so it falls back to the local base URL.
    pub fn distribution_url(&self) -> Option<&str> {
        match (self.storage.distribution_url.as_deref(), self.storage.backend) {
            (Some(url), _) => Some(url),
            (None, StorageBackend::Local) => Some(self.storage.local_storage_base_url.as_str()),
            (None, StorageBackend::S3) => None,
        }
    }

    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.storage.signed_url_ttl_seconds)
    }

    pub fn max_video_upload_bytes(&self) -> u64 {
        self.upload.max_video_upload_bytes
    }

    pub fn staging_dir(&self) -> &Path {
        &self.upload.staging_dir
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.upload.ffprobe_path
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.upload.ffmpeg_path
    }

    pub fn media_tool_timeout(&self) -> Duration {
        Duration::from_secs(self.upload.media_tool_timeout_seconds)
    }
}

/// Parse an optional numeric setting; a present but unparsable value is an error.
fn parse_var<T, F>(var: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got {:?}", key, raw)),
        None => Ok(default),
    }
}
