//! Application state shared by every handler.

use std::sync::Arc;
use tubely_core::{AppError, Config};
use tubely_db::VideoRepository;
use tubely_processing::{
    MediaInspector, MediaNormalizer, VideoLocationStrategy, VideoUploadPipeline,
};
use tubely_storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub repository: Arc<dyn VideoRepository>,
    pub storage: Arc<dyn Storage>,
    pub pipeline: Arc<VideoUploadPipeline>,
}

impl AppState {
    /// Wire the upload pipeline from its parts.
    ///
    /// The media tools are passed in so tests can swap ffprobe and ffmpeg for fakes.
    pub fn new(
        config: Config,
        repository: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        inspector: Arc<dyn MediaInspector>,
        normalizer: Arc<dyn MediaNormalizer>,
    ) -> Result<Self, AppError> {
        let locations = VideoLocationStrategy::from_config(&config)?;
        let pipeline = VideoUploadPipeline::new(
            repository.clone(),
            storage.clone(),
            inspector,
            normalizer,
            locations,
            config.staging_dir(),
        );

        Ok(Self {
            config,
            repository,
            storage,
            pipeline: Arc::new(pipeline),
        })
    }

    pub fn locations(&self) -> &VideoLocationStrategy {
        self.pipeline.locations()
    }
}
