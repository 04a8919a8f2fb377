//! Upload assembly service
//!
//! Chunks are appended to a per-session `.part` file. Finalize turns that
//! file into a library entry: quota check → remux → probe → parse → enrich →
//! record. The `.part` file is removed whatever the outcome, including when
//! the request future is dropped mid-way.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;
use vidvault_core::models::{Media, MediaFile, NewEpisode, NewMovie, NewTvShow};
use vidvault_core::{parse_media_filename, AppError, ParsedMediaInfo};
use vidvault_db::MediaStore;
use vidvault_processing::{DurationProbe, Remuxer};
use vidvault_services::MetadataProvider;
use vidvault_storage::{Storage, UploadSession};

use super::locks::KeyedLocks;
use super::types::{ChunkReceipt, FinalizedUpload, UploadLimit};
use crate::error::app_error_from_storage;

#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn Storage>,
    media: Arc<dyn MediaStore>,
    remuxer: Arc<dyn Remuxer>,
    probe: Arc<dyn DurationProbe>,
    metadata: Arc<dyn MetadataProvider>,
    locks: KeyedLocks,
    media_limit: i64,
}

/// Removes a stored file on drop unless disarmed.
///
/// Drop cannot await, so removal goes through the blocking filesystem API on
/// the file's local path.
struct FileCleanupGuard {
    storage: Arc<dyn Storage>,
    key: String,
    armed: bool,
}

impl FileCleanupGuard {
    fn new(storage: Arc<dyn Storage>, key: String) -> Self {
        Self {
            storage,
            key,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for FileCleanupGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(path) = self.storage.local_path(&self.key) else {
            return;
        };
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::info!(key = %self.key, "Removed file of abandoned upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(key = %self.key, error = %e, "Failed to remove upload file"),
        }
    }
}

/// Keyed on the sanitized id, so raw ids naming the same `.part` file share a lock
fn upload_lock_key(session: &UploadSession) -> String {
    format!("upload:{}:{}", session.owner_id(), session.upload_id())
}

fn owner_lock_key(owner_id: Uuid) -> String {
    format!("owner:{}", owner_id)
}

impl UploadService {
    pub fn new(
        storage: Arc<dyn Storage>,
        media: Arc<dyn MediaStore>,
        remuxer: Arc<dyn Remuxer>,
        probe: Arc<dyn DurationProbe>,
        metadata: Arc<dyn MetadataProvider>,
        media_limit: i64,
    ) -> Self {
        Self {
            storage,
            media,
            remuxer,
            probe,
            metadata,
            locks: KeyedLocks::new(),
            media_limit,
        }
    }

    /// Current usage against the per-user file limit. At the limit this is
    /// `QuotaExceeded`, so clients can stop before sending any bytes.
    pub async fn check_upload_limit(&self, owner_id: Uuid) -> Result<UploadLimit, AppError> {
        let file_count = self.media.count_media_files(owner_id).await?;
        if file_count >= self.media_limit {
            return Err(AppError::QuotaExceeded {
                used: file_count,
                limit: self.media_limit,
            });
        }

        Ok(UploadLimit {
            file_count,
            limit: self.media_limit,
            remaining: self.media_limit - file_count,
        })
    }

    /// Append `data` to the session's partial file.
    ///
    /// With `offset` set, the chunk is only written if it equals the bytes
    /// received so far (`Conflict` otherwise).
    #[tracing::instrument(skip(self, data), fields(chunk_bytes = data.len()))]
    pub async fn append_chunk(
        &self,
        owner_id: Uuid,
        upload_id: &str,
        original_filename: &str,
        data: &[u8],
        offset: Option<u64>,
    ) -> Result<ChunkReceipt, AppError> {
        let session = UploadSession::new(owner_id, upload_id, original_filename)
            .map_err(app_error_from_storage)?;

        let _upload_lock = self.locks.lock(upload_lock_key(&session)).await;

        let total_bytes = self
            .storage
            .append_chunk(&session, data, offset)
            .await
            .map_err(app_error_from_storage)?;

        Ok(ChunkReceipt {
            received_bytes: data.len() as u64,
            total_bytes,
        })
    }

    /// Turn a completed session into a library entry.
    #[tracing::instrument(skip(self))]
    pub async fn finalize(
        &self,
        owner_id: Uuid,
        upload_id: &str,
        original_filename: &str,
    ) -> Result<FinalizedUpload, AppError> {
        let start = Instant::now();
        let session = UploadSession::new(owner_id, upload_id, original_filename)
            .map_err(app_error_from_storage)?;

        let _upload_lock = self.locks.lock(upload_lock_key(&session)).await;

        if !self
            .storage
            .session_exists(&session)
            .await
            .map_err(app_error_from_storage)?
        {
            return Err(AppError::NotFound(format!(
                "Upload session '{}' not found",
                upload_id
            )));
        }
        let mut part_cleanup = FileCleanupGuard::new(self.storage.clone(), session.part_key());

        let result = self.finalize_session(&session, original_filename).await;

        if let Err(e) = self.storage.discard_session(&session).await {
            tracing::warn!(error = %e, key = %session.part_key(), "Failed to remove partial upload");
        } else {
            part_cleanup.disarm();
        }

        match &result {
            Ok(finalized) => {
                tracing::info!(
                    media_type = %finalized.media.kind(),
                    media_id = %finalized.media.id(),
                    duration = finalized.media.duration(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Upload finalized"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, error_type = e.error_type(), "Upload finalize failed");
            }
        }

        result
    }

    async fn finalize_session(
        &self,
        session: &UploadSession,
        original_filename: &str,
    ) -> Result<FinalizedUpload, AppError> {
        let owner_id = session.owner_id();

        // Held through record creation so count-and-insert is atomic per owner
        let _owner_lock = self.locks.lock(owner_lock_key(owner_id)).await;

        let used = self.media.count_media_files(owner_id).await?;
        if used >= self.media_limit {
            return Err(AppError::QuotaExceeded {
                used,
                limit: self.media_limit,
            });
        }

        let final_key = self
            .storage
            .reserve_final_key(session)
            .await
            .map_err(app_error_from_storage)?;
        let part_path = self
            .storage
            .local_path(&session.part_key())
            .map_err(app_error_from_storage)?;
        let final_path = self
            .storage
            .local_path(&final_key)
            .map_err(app_error_from_storage)?;

        let mut final_cleanup = FileCleanupGuard::new(self.storage.clone(), final_key.clone());

        self.remuxer
            .remux_faststart(&part_path, &final_path)
            .await
            .map_err(|e| AppError::RemuxFailed(format!("{:#}", e)))?;

        let duration = self.probe_duration(&final_path).await;

        let finalized = match parse_media_filename(original_filename) {
            ParsedMediaInfo::Movie { title, year } => {
                self.record_movie(owner_id, title, year, duration, &final_key)
                    .await?
            }
            ParsedMediaInfo::Episode {
                show_name,
                season,
                episode,
            } => {
                self.record_episode(owner_id, &show_name, season, episode, duration, &final_key)
                    .await?
            }
        };

        final_cleanup.disarm();
        Ok(finalized)
    }

    /// ffprobe failures leave the duration unknown rather than failing the upload
    async fn probe_duration(&self, path: &Path) -> f64 {
        match self.probe.probe_duration(path).await {
            Ok(duration) => duration,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Duration probe failed, storing 0");
                0.0
            }
        }
    }

    async fn record_movie(
        &self,
        owner_id: Uuid,
        title: String,
        year: Option<i32>,
        duration: f64,
        storage_path: &str,
    ) -> Result<FinalizedUpload, AppError> {
        let metadata = self.metadata.search_movie(&title, year).await;

        let new_movie = match metadata {
            Some(meta) => NewMovie {
                owner_id,
                title: meta.title,
                overview: meta.overview,
                poster_url: meta.poster_url,
                release_year: meta.release_year.or(year),
                duration,
                storage_path: storage_path.to_string(),
            },
            None => NewMovie {
                owner_id,
                title,
                overview: None,
                poster_url: None,
                release_year: year,
                duration,
                storage_path: storage_path.to_string(),
            },
        };

        let movie = self.media.create_movie(new_movie).await?;
        Ok(FinalizedUpload {
            media: Media::Movie(movie),
            show: None,
        })
    }

    async fn record_episode(
        &self,
        owner_id: Uuid,
        show_name: &str,
        season: i32,
        episode: i32,
        duration: f64,
        storage_path: &str,
    ) -> Result<FinalizedUpload, AppError> {
        let show = self
            .metadata
            .search_show(show_name)
            .await
            .ok_or_else(|| AppError::ShowNotFound(show_name.to_string()))?;

        let title = self
            .metadata
            .episode_details(show.tmdb_id, season, episode)
            .await
            .and_then(|details| details.title)
            .unwrap_or_else(|| format!("Episode {}", episode));

        let new_show = NewTvShow {
            owner_id,
            tmdb_id: show.tmdb_id,
            title: if show.title.is_empty() {
                show_name.to_string()
            } else {
                show.title
            },
            overview: show.overview,
            poster_url: show.poster_url,
        };
        let new_episode = NewEpisode {
            season_number: season,
            episode_number: episode,
            title,
            duration,
            storage_path: storage_path.to_string(),
        };

        let (show, episode) = self.media.create_episode(new_show, new_episode).await?;
        Ok(FinalizedUpload {
            media: Media::Episode(episode),
            show: Some(show),
        })
    }
}
