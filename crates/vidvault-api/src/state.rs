//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only what they need
//! via Axum's `FromRef`.

use crate::auth::AuthState;
use crate::services::upload::UploadService;
use std::sync::Arc;
use vidvault_core::Config;
use vidvault_db::{MediaStore, ProgressStore, UserStore};
use vidvault_storage::Storage;

// ----- Sub-state types -----

/// Repositories, held as trait objects so tests can run on in-memory stores
#[derive(Clone)]
pub struct DbState {
    pub users: Arc<dyn UserStore>,
    pub media: Arc<dyn MediaStore>,
    pub progress: Arc<dyn ProgressStore>,
}

/// Stored media files and the limits that apply to them
#[derive(Clone)]
pub struct MediaConfig {
    pub storage: Arc<dyn Storage>,
    pub stream_chunk_size: usize,
    pub max_chunk_size: usize,
    pub user_media_limit: i64,
}

// ----- AppState -----

pub struct AppState {
    pub config: Config,
    pub is_production: bool,
    pub db: DbState,
    pub media: MediaConfig,
    pub auth: AuthState,
    pub upload: UploadService,
}

// ----- FromRef implementations for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for MediaConfig {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.media.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for AuthState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.auth.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for UploadService {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.upload.clone()
    }
}
