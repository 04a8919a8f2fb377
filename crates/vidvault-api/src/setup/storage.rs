//! Storage setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use vidvault_core::Config;
use vidvault_storage::{LocalStorage, Storage};

/// Create the upload folder if needed and open local storage on it
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = LocalStorage::new(config.upload_folder())
        .await
        .context("Failed to initialize upload storage")?;

    tracing::info!(
        upload_folder = %storage.base_path().display(),
        "Local storage initialized"
    );

    Ok(Arc::new(storage))
}
