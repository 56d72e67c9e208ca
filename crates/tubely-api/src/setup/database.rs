//! Metadata store setup

use anyhow::Result;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::{connect, run_migrations, InMemoryVideoRepository, PgVideoRepository, VideoRepository};

/// Connect to PostgreSQL and migrate, or fall back to an in-memory store when no
/// `DATABASE_URL` is configured.
pub async fn setup_repository(config: &Config) -> Result<Arc<dyn VideoRepository>> {
    match config.database_url() {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = connect(url, config.db_max_connections(), config.db_timeout_seconds()).await?;
            run_migrations(&pool).await?;
            Ok(Arc::new(PgVideoRepository::new(pool)))
        }
        None => {
            tracing::warn!(
                "DATABASE_URL not set; using an in-memory video store that is lost on restart"
            );
            Ok(Arc::new(InMemoryVideoRepository::new()))
        }
    }
}
