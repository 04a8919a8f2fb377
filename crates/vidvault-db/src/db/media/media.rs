use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vidvault_core::models::{
    Episode, EpisodeWithProgress, LibraryListing, Media, MediaDeletion, MediaFile, MediaKind,
    Movie, NewEpisode, NewMovie, NewTvShow, TvShow,
};
use vidvault_core::AppError;

use crate::db::transaction::TransactionGuard;
use crate::traits::MediaStore;

/// Movie, show and episode records
///
/// Episodes carry no owner column; their owner is the owner of their show and
/// every episode query joins `tv_shows` to resolve it.
#[derive(Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "movies", db.operation = "select", db.record_id = %id))]
    async fn find_movie(&self, id: Uuid) -> Result<Option<Movie>, AppError> {
        let movie = sqlx::query_as::<Postgres, Movie>(
            r#"
            SELECT id, owner_id, title, overview, poster_url, release_year, duration,
                   storage_path, created_at
            FROM movies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movie)
    }

    #[tracing::instrument(skip(self), fields(db.table = "episodes", db.operation = "select", db.record_id = %id))]
    async fn find_episode(&self, id: Uuid) -> Result<Option<Episode>, AppError> {
        let episode = sqlx::query_as::<Postgres, Episode>(
            r#"
            SELECT e.id, e.show_id, s.owner_id, e.season_number, e.episode_number, e.title,
                   e.duration, e.storage_path, e.created_at
            FROM episodes e
            JOIN tv_shows s ON s.id = e.show_id
            WHERE e.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(episode)
    }
}

#[async_trait]
impl MediaStore for MediaRepository {
    #[tracing::instrument(skip(self), fields(db.table = "movies,episodes", db.operation = "count"))]
    async fn count_media_files(&self, owner_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM movies WHERE owner_id = $1)
              + (SELECT COUNT(*) FROM episodes e
                 JOIN tv_shows s ON s.id = e.show_id
                 WHERE s.owner_id = $1)
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self, movie), fields(db.table = "movies", db.operation = "insert", owner_id = %movie.owner_id))]
    async fn create_movie(&self, movie: NewMovie) -> Result<Movie, AppError> {
        let movie = sqlx::query_as::<Postgres, Movie>(
            r#"
            INSERT INTO movies (id, owner_id, title, overview, poster_url, release_year, duration, storage_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, owner_id, title, overview, poster_url, release_year, duration,
                      storage_path, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(movie.owner_id)
        .bind(&movie.title)
        .bind(&movie.overview)
        .bind(&movie.poster_url)
        .bind(movie.release_year)
        .bind(movie.duration)
        .bind(&movie.storage_path)
        .fetch_one(&self.pool)
        .await?;

        Ok(movie)
    }

    #[tracing::instrument(skip(self, show, episode), fields(db.table = "tv_shows,episodes", db.operation = "insert", tmdb_id = show.tmdb_id))]
    async fn create_episode(
        &self,
        show: NewTvShow,
        episode: NewEpisode,
    ) -> Result<(TvShow, Episode), AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        // The no-op update makes RETURNING yield the existing row on conflict
        let show = sqlx::query_as::<Postgres, TvShow>(
            r#"
            INSERT INTO tv_shows (id, owner_id, tmdb_id, title, overview, poster_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (owner_id, tmdb_id) DO UPDATE SET tmdb_id = EXCLUDED.tmdb_id
            RETURNING id, owner_id, tmdb_id, title, overview, poster_url, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(show.owner_id)
        .bind(show.tmdb_id)
        .bind(&show.title)
        .bind(&show.overview)
        .bind(&show.poster_url)
        .fetch_one(&mut **tx)
        .await?;

        let episode = sqlx::query_as::<Postgres, Episode>(
            r#"
            INSERT INTO episodes (id, show_id, season_number, episode_number, title, duration, storage_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, show_id, $8::uuid AS owner_id, season_number, episode_number, title,
                      duration, storage_path, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(show.id)
        .bind(episode.season_number)
        .bind(episode.episode_number)
        .bind(&episode.title)
        .bind(episode.duration)
        .bind(&episode.storage_path)
        .bind(show.owner_id)
        .fetch_one(&mut **tx)
        .await?;

        tx.commit().await?;

        Ok((show, episode))
    }

    async fn find_media(&self, kind: MediaKind, id: Uuid) -> Result<Option<Media>, AppError> {
        let media = match kind {
            MediaKind::Movie => self.find_movie(id).await?.map(Media::from),
            MediaKind::Episode => self.find_episode(id).await?.map(Media::from),
        };
        Ok(media)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tv_shows", db.operation = "select", db.record_id = %id))]
    async fn find_show(&self, id: Uuid) -> Result<Option<TvShow>, AppError> {
        let show = sqlx::query_as::<Postgres, TvShow>(
            r#"
            SELECT id, owner_id, tmdb_id, title, overview, poster_url, created_at
            FROM tv_shows
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(show)
    }

    #[tracing::instrument(skip(self), fields(db.table = "episodes", db.operation = "select"))]
    async fn list_episodes_with_progress(
        &self,
        show_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Vec<EpisodeWithProgress>, AppError> {
        let episodes = sqlx::query_as::<Postgres, EpisodeWithProgress>(
            r#"
            SELECT e.id, e.title, e.season_number, e.episode_number, e.duration,
                   COALESCE(p.resume_position, 0) AS resume_position,
                   COALESCE(p.is_watched, FALSE) AS is_watched
            FROM episodes e
            LEFT JOIN playback_progress p
                   ON p.media_kind = 'episode' AND p.media_id = e.id AND p.owner_id = $2
            WHERE e.show_id = $1
            ORDER BY e.season_number ASC, e.episode_number ASC
            "#,
        )
        .bind(show_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(episodes)
    }

    #[tracing::instrument(skip(self, media), fields(db.operation = "delete", media_kind = %media.kind(), db.record_id = %media.id()))]
    async fn delete_media(&self, media: &Media) -> Result<MediaDeletion, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        sqlx::query("DELETE FROM playback_progress WHERE media_kind = $1 AND media_id = $2")
            .bind(media.kind())
            .bind(media.id())
            .execute(&mut **tx)
            .await?;

        let removed_show_id = match media {
            Media::Movie(movie) => {
                let result = sqlx::query("DELETE FROM movies WHERE id = $1")
                    .bind(movie.id)
                    .execute(&mut **tx)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(AppError::NotFound("Movie not found".to_string()));
                }
                None
            }
            Media::Episode(episode) => {
                let result = sqlx::query("DELETE FROM episodes WHERE id = $1")
                    .bind(episode.id)
                    .execute(&mut **tx)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(AppError::NotFound("Episode not found".to_string()));
                }

                sqlx::query_scalar::<Postgres, Uuid>(
                    r#"
                    DELETE FROM tv_shows
                    WHERE id = $1
                      AND NOT EXISTS (SELECT 1 FROM episodes WHERE show_id = $1)
                    RETURNING id
                    "#,
                )
                .bind(episode.show_id)
                .fetch_optional(&mut **tx)
                .await?
            }
        };

        tx.commit().await?;

        Ok(MediaDeletion {
            storage_path: media.storage_path().to_string(),
            removed_show_id,
        })
    }

    #[tracing::instrument(skip(self, show), fields(db.table = "tv_shows", db.operation = "delete", db.record_id = %show.id))]
    async fn delete_show(&self, show: &TvShow) -> Result<Vec<String>, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let episodes = sqlx::query_as::<Postgres, (Uuid, String)>(
            "SELECT id, storage_path FROM episodes WHERE show_id = $1",
        )
        .bind(show.id)
        .fetch_all(&mut **tx)
        .await?;

        let episode_ids: Vec<Uuid> = episodes.iter().map(|(id, _)| *id).collect();
        sqlx::query(
            "DELETE FROM playback_progress WHERE media_kind = 'episode' AND media_id = ANY($1)",
        )
        .bind(&episode_ids)
        .execute(&mut **tx)
        .await?;

        // Episodes go with the show (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM tv_shows WHERE id = $1")
            .bind(show.id)
            .execute(&mut **tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("TV show not found".to_string()));
        }

        tx.commit().await?;

        Ok(episodes.into_iter().map(|(_, path)| path).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "movies,tv_shows", db.operation = "select"))]
    async fn library_listing(
        &self,
        owner_id: Uuid,
        recent_limit: i64,
    ) -> Result<LibraryListing, AppError> {
        let recently_added_movies = sqlx::query_as::<Postgres, Movie>(
            r#"
            SELECT id, owner_id, title, overview, poster_url, release_year, duration,
                   storage_path, created_at
            FROM movies
            WHERE owner_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(owner_id)
        .bind(recent_limit)
        .fetch_all(&self.pool)
        .await?;

        let recently_added_shows = sqlx::query_as::<Postgres, TvShow>(
            r#"
            SELECT id, owner_id, tmdb_id, title, overview, poster_url, created_at
            FROM tv_shows
            WHERE owner_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(owner_id)
        .bind(recent_limit)
        .fetch_all(&self.pool)
        .await?;

        let movies = sqlx::query_as::<Postgres, Movie>(
            r#"
            SELECT id, owner_id, title, overview, poster_url, release_year, duration,
                   storage_path, created_at
            FROM movies
            WHERE owner_id = $1
            ORDER BY title ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let shows = sqlx::query_as::<Postgres, TvShow>(
            r#"
            SELECT id, owner_id, tmdb_id, title, overview, poster_url, created_at
            FROM tv_shows
            WHERE owner_id = $1
            ORDER BY title ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(LibraryListing {
            recently_added_movies,
            recently_added_shows,
            movies,
            shows,
        })
    }
}
