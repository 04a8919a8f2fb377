use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use std::collections::HashMap;
use uuid::Uuid;
use vidvault_core::models::{
    ContinueWatching, Episode, Media, MediaKind, Movie, PlaybackProgress, ProgressUpdate,
};
use vidvault_core::AppError;

use crate::traits::ProgressStore;

/// Playback progress, one row per (owner, media kind, media id)
#[derive(Clone)]
pub struct ProgressRepository {
    pool: PgPool,
}

impl ProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressStore for ProgressRepository {
    #[tracing::instrument(
        skip(self, update),
        fields(db.table = "playback_progress", db.operation = "upsert", media_id = %update.media_id)
    )]
    async fn save_progress(&self, update: ProgressUpdate) -> Result<PlaybackProgress, AppError> {
        let progress = sqlx::query_as::<Postgres, PlaybackProgress>(
            r#"
            INSERT INTO playback_progress
                (id, owner_id, media_kind, media_id, resume_position, is_watched, last_watched)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (owner_id, media_kind, media_id) DO UPDATE SET
                resume_position = EXCLUDED.resume_position,
                is_watched = EXCLUDED.is_watched,
                last_watched = EXCLUDED.last_watched
            RETURNING id, owner_id, media_kind, media_id, resume_position, is_watched, last_watched
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(update.owner_id)
        .bind(update.media_kind)
        .bind(update.media_id)
        .bind(update.resume_position)
        .bind(update.is_watched)
        .fetch_one(&self.pool)
        .await?;

        Ok(progress)
    }

    #[tracing::instrument(skip(self), fields(db.table = "playback_progress", db.operation = "select"))]
    async fn continue_watching(
        &self,
        owner_id: Uuid,
        min_position: f64,
    ) -> Result<Vec<ContinueWatching>, AppError> {
        let rows = sqlx::query_as::<Postgres, PlaybackProgress>(
            r#"
            SELECT id, owner_id, media_kind, media_id, resume_position, is_watched, last_watched
            FROM playback_progress
            WHERE owner_id = $1 AND is_watched = FALSE AND resume_position > $2
            ORDER BY last_watched DESC
            "#,
        )
        .bind(owner_id)
        .bind(min_position)
        .fetch_all(&self.pool)
        .await?;

        let ids_of = |kind: MediaKind| -> Vec<Uuid> {
            rows.iter()
                .filter(|p| p.media_kind == kind)
                .map(|p| p.media_id)
                .collect()
        };

        // Batch-load the referenced media instead of one query per row
        let movies = sqlx::query_as::<Postgres, Movie>(
            r#"
            SELECT id, owner_id, title, overview, poster_url, release_year, duration,
                   storage_path, created_at
            FROM movies
            WHERE owner_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(owner_id)
        .bind(ids_of(MediaKind::Movie))
        .fetch_all(&self.pool)
        .await?;

        let episodes = sqlx::query_as::<Postgres, Episode>(
            r#"
            SELECT e.id, e.show_id, s.owner_id, e.season_number, e.episode_number, e.title,
                   e.duration, e.storage_path, e.created_at
            FROM episodes e
            JOIN tv_shows s ON s.id = e.show_id
            WHERE s.owner_id = $1 AND e.id = ANY($2)
            "#,
        )
        .bind(owner_id)
        .bind(ids_of(MediaKind::Episode))
        .fetch_all(&self.pool)
        .await?;

        let mut media: HashMap<(MediaKind, Uuid), Media> = movies
            .into_iter()
            .map(|m| ((MediaKind::Movie, m.id), Media::from(m)))
            .chain(
                episodes
                    .into_iter()
                    .map(|e| ((MediaKind::Episode, e.id), Media::from(e))),
            )
            .collect();

        // Rows whose media has since been deleted are skipped
        Ok(rows
            .into_iter()
            .filter_map(|progress| {
                media
                    .remove(&(progress.media_kind, progress.media_id))
                    .map(|media| ContinueWatching { media, progress })
            })
            .collect())
    }
}
