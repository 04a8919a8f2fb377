//! Service initialization and application state setup

use crate::auth::{AuthState, JwtService};
use crate::services::upload::UploadService;
use crate::state::{AppState, DbState, MediaConfig};
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use vidvault_core::Config;
use vidvault_db::{MediaRepository, ProgressRepository, UserRepository};
use vidvault_processing::{DurationProbe, FFmpegService, Remuxer};
use vidvault_services::{MetadataProvider, TmdbClient};
use vidvault_storage::Storage;

/// External tools used when finalizing uploads
#[derive(Clone)]
pub struct MediaTools {
    pub remuxer: Arc<dyn Remuxer>,
    pub probe: Arc<dyn DurationProbe>,
    pub metadata: Arc<dyn MetadataProvider>,
}

/// Initialize all services and repositories, returning the application state
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let db = DbState {
        users: Arc::new(UserRepository::new(pool.clone())),
        media: Arc::new(MediaRepository::new(pool.clone())),
        progress: Arc::new(ProgressRepository::new(pool)),
    };

    let ffmpeg = Arc::new(FFmpegService::new(config.ffmpeg_path(), config.ffprobe_path()));
    let tmdb = TmdbClient::new(config.tmdb().clone()).context("Failed to initialize TMDB client")?;

    tracing::info!(
        ffmpeg_path = %config.ffmpeg_path(),
        ffprobe_path = %config.ffprobe_path(),
        tmdb_enabled = config.tmdb().api_key.is_some(),
        tmdb_language = %config.tmdb().language,
        "Media tools initialized"
    );

    let tools = MediaTools {
        remuxer: ffmpeg.clone(),
        probe: ffmpeg,
        metadata: Arc::new(tmdb),
    };

    Ok(build_app_state(config.clone(), db, storage, tools))
}

/// Wire repositories, storage and tools into the shared state
pub fn build_app_state(
    config: Config,
    db: DbState,
    storage: Arc<dyn Storage>,
    tools: MediaTools,
) -> Arc<AppState> {
    let upload = UploadService::new(
        storage.clone(),
        db.media.clone(),
        tools.remuxer,
        tools.probe,
        tools.metadata,
        config.user_media_limit(),
    );

    let media = MediaConfig {
        storage,
        stream_chunk_size: config.stream_chunk_size_bytes(),
        max_chunk_size: config.max_chunk_size_bytes(),
        user_media_limit: config.user_media_limit(),
    };

    let auth = AuthState {
        jwt: JwtService::new(config.jwt_secret(), config.jwt_expiry_hours()),
    };

    Arc::new(AppState {
        is_production: config.is_production(),
        config,
        db,
        media,
        auth,
        upload,
    })
}
