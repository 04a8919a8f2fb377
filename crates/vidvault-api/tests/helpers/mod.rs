//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p vidvault-api`. Stores are the
//! in-memory library from `vidvault-db` (feature `test-utils`) and files land
//! in a temp directory, so no database or ffmpeg install is needed.

#![allow(dead_code)]

pub mod auth;
pub mod tools;
pub mod workflows;

use axum_test::TestServer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use vidvault_api::setup::routes;
use vidvault_api::setup::services::{build_app_state, MediaTools};
use vidvault_api::state::DbState;
use vidvault_core::{BaseConfig, Config, TmdbConfig, VidvaultConfig};
use vidvault_db::test_helpers::InMemoryLibrary;
use vidvault_storage::{LocalStorage, Storage};

/// Per-user file limit used by [`setup_test_app`]
pub const TEST_MEDIA_LIMIT: i64 = 10;

/// Test application: server, stores, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub library: InMemoryLibrary,
    pub upload_dir: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Absolute path of a storage key
    pub fn file_path(&self, storage_key: &str) -> PathBuf {
        self.upload_dir.join(storage_key)
    }

    /// File names currently in a user's upload directory
    pub fn owner_files(&self, owner_id: uuid::Uuid) -> Vec<String> {
        list_dir(&self.upload_dir.join(owner_id.to_string()))
    }
}

fn list_dir(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|entry| {
                entry
                    .expect("Failed to read directory entry")
                    .file_name()
                    .to_string_lossy()
                    .to_string()
            })
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Setup test app with the default file limit.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_limit(TEST_MEDIA_LIMIT).await
}

/// Setup test app with in-memory stores and local storage.
pub async fn setup_test_app_with_limit(user_media_limit: i64) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let upload_dir = temp_dir.path().to_path_buf();
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(upload_dir.clone())
            .await
            .expect("Failed to create local storage"),
    );

    let config = create_test_config(&upload_dir, user_media_limit);

    let library = InMemoryLibrary::new();
    let db = DbState {
        users: Arc::new(library.clone()),
        media: Arc::new(library.clone()),
        progress: Arc::new(library.clone()),
    };

    let tools = MediaTools {
        remuxer: Arc::new(tools::CopyRemuxer),
        probe: Arc::new(tools::FixedProbe(tools::TEST_DURATION)),
        metadata: Arc::new(tools::ScriptedMetadata),
    };

    let state = build_app_state(config.clone(), db, storage, tools);

    let app = routes::setup_routes(&config, state).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        library,
        upload_dir,
        _temp_dir: temp_dir,
    }
}

fn create_test_config(upload_dir: &Path, user_media_limit: i64) -> Config {
    let base = BaseConfig {
        server_port: 4000,
        cors_origins: vec!["*".to_string()],
        db_max_connections: 5,
        db_timeout_seconds: 30,
        jwt_secret: "test-secret-key-min-32-characters-long-for-testing".to_string(),
        jwt_expiry_hours: 24,
        environment: "test".to_string(),
    };

    Config(Box::new(VidvaultConfig {
        base,
        database_url: "postgresql://localhost/vidvault-test".to_string(),
        upload_folder: upload_dir.to_path_buf(),
        user_media_limit,
        max_chunk_size_bytes: 4 * 1024 * 1024,
        stream_chunk_size_bytes: 1024 * 1024,
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        tmdb: TmdbConfig {
            api_key: None,
            base_url: "http://localhost:9/3".to_string(),
            image_base_url: "http://localhost:9/t/p/w500".to_string(),
            language: "da-DK".to_string(),
            timeout_secs: 1,
        },
    }))
}
