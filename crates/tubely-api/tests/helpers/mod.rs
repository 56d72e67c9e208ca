//! Test application over an in-memory store, local storage in temp directories
//! and fake media tools.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::setup::routes::setup_routes;
use tubely_api::AppState;
use tubely_core::{Config, VideoRecord};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_processing::{
    MediaError, MediaInspector, MediaNormalizer, ProbeReport, ProbeStream,
};
use tubely_storage::LocalStorage;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret-test-secret-test-secret";
pub const JWT_ISSUER: &str = "tubely-access";
pub const BUCKET: &str = "tubely-test";
pub const MEDIA_BASE_URL: &str = "http://localhost:8091/media";

/// Reports a single video stream with a fixed display aspect ratio.
pub struct FakeInspector {
    pub ratio: Option<&'static str>,
}

#[async_trait]
impl MediaInspector for FakeInspector {
    async fn probe(&self, _path: &Path) -> Result<ProbeReport, MediaError> {
        Ok(ProbeReport {
            streams: vec![ProbeStream {
                index: Some(0),
                codec_type: Some("video".to_string()),
                display_aspect_ratio: self.ratio.map(str::to_string),
                ..Default::default()
            }],
        })
    }
}

/// Writes `faststart:` followed by the input bytes to the output path.
pub struct FakeNormalizer;

#[async_trait]
impl MediaNormalizer for FakeNormalizer {
    async fn normalize(&self, input: &Path) -> Result<PathBuf, MediaError> {
        let output = self.output_path_for(input);
        let mut data = b"faststart:".to_vec();
        data.extend(
            tokio::fs::read(input)
                .await
                .map_err(|e| MediaError::NormalizeFailed(e.to_string()))?,
        );
        tokio::fs::write(&output, data)
            .await
            .map_err(|e| MediaError::NormalizeFailed(e.to_string()))?;
        Ok(output)
    }
}

pub struct TestAppOptions {
    pub video_url_mode: &'static str,
    pub max_upload_bytes: u64,
    pub aspect_ratio: Option<&'static str>,
    pub app_env: Option<&'static str>,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self {
            video_url_mode: "distribution",
            max_upload_bytes: 1024 * 1024,
            aspect_ratio: Some("16:9"),
            app_env: None,
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub staging_dir: PathBuf,
    pub objects_dir: PathBuf,
    _temp_dirs: (TempDir, TempDir),
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn staging_is_empty(&self) -> bool {
        std::fs::read_dir(&self.staging_dir).unwrap().next().is_none()
    }

    pub async fn create_video(&self, owner: Uuid) -> VideoRecord {
        self.state
            .repository
            .create_video(owner, "Boot camp".to_string(), None)
            .await
            .unwrap()
    }

    pub async fn stored_video(&self, id: Uuid) -> VideoRecord {
        self.state.repository.get_video(id).await.unwrap().unwrap()
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestAppOptions::default()).await
}

pub async fn setup_test_app_with(options: TestAppOptions) -> TestApp {
    let staging = tempfile::tempdir().unwrap();
    let objects = tempfile::tempdir().unwrap();

    let mut vars: HashMap<&str, String> = HashMap::from([
        ("JWT_SECRET", JWT_SECRET.to_string()),
        ("JWT_ISSUER", JWT_ISSUER.to_string()),
        ("STORAGE_BACKEND", "local".to_string()),
        ("LOCAL_STORAGE_PATH", objects.path().display().to_string()),
        ("LOCAL_STORAGE_BASE_URL", MEDIA_BASE_URL.to_string()),
        ("LOCAL_STORAGE_BUCKET", BUCKET.to_string()),
        ("VIDEO_URL_MODE", options.video_url_mode.to_string()),
        ("UPLOAD_STAGING_DIR", staging.path().display().to_string()),
        (
            "MAX_VIDEO_UPLOAD_BYTES",
            options.max_upload_bytes.to_string(),
        ),
    ]);
    if let Some(app_env) = options.app_env {
        vars.insert("APP_ENV", app_env.to_string());
        vars.insert("CORS_ORIGINS", "https://tubely.example.com".to_string());
    }
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

    let repository: Arc<dyn VideoRepository> = Arc::new(InMemoryVideoRepository::new());
    let storage = Arc::new(
        LocalStorage::new(
            objects.path(),
            MEDIA_BASE_URL.to_string(),
            BUCKET.to_string(),
        )
        .await
        .unwrap(),
    );
    let state = Arc::new(
        AppState::new(
            config,
            repository,
            storage,
            Arc::new(FakeInspector {
                ratio: options.aspect_ratio,
            }),
            Arc::new(FakeNormalizer),
        )
        .unwrap(),
    );

    let app = setup_routes(state.clone()).unwrap();
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        staging_dir: staging.path().to_path_buf(),
        objects_dir: objects.path().to_path_buf(),
        _temp_dirs: (staging, objects),
    }
}

pub fn token_for(user_id: Uuid) -> String {
    tubely_api::auth::issue_access_token(
        user_id,
        JWT_SECRET,
        JWT_ISSUER,
        chrono::Duration::minutes(10),
    )
    .unwrap()
}

pub fn bearer(user_id: Uuid) -> String {
    format!("Bearer {}", token_for(user_id))
}

pub fn video_form(data: &[u8], mime_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "video",
        Part::bytes(data.to_vec())
            .file_name("clip.mp4")
            .mime_type(mime_type),
    )
}
