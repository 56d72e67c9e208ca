//! Application setup and initialization

pub mod database;
pub mod media;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_infra::{init_telemetry, LogFormat};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    init_telemetry(LogFormat::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    config.validate().context("Configuration validation failed")?;
    tracing::info!(
        environment = %config.base.environment,
        "Configuration loaded and validated successfully"
    );

    let repository = database::setup_repository(&config).await?;
    let storage = storage::setup_storage(&config).await?;
    let (inspector, normalizer) = media::setup_media_tools(&config).await?;

    let state = Arc::new(
        AppState::new(config, repository, storage, inspector, normalizer)
            .context("Failed to build application state")?,
    );

    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
