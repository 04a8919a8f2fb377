//! Store traits
//!
//! The API holds its repositories as `Arc<dyn ...Store>`; the PostgreSQL
//! repositories in [`crate::db`] are the production implementations.

use async_trait::async_trait;
use uuid::Uuid;
use vidvault_core::models::{
    ContinueWatching, Episode, EpisodeWithProgress, LibraryListing, Media, MediaDeletion,
    MediaKind, Movie, NewEpisode, NewMovie, NewTvShow, PlaybackProgress, ProgressUpdate, TvShow,
    User,
};
use vidvault_core::AppError;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; a taken username is `AppError::Conflict`
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Movies plus episodes owned by `owner_id`
    async fn count_media_files(&self, owner_id: Uuid) -> Result<i64, AppError>;

    async fn create_movie(&self, movie: NewMovie) -> Result<Movie, AppError>;

    /// Find or create the owner's show for `show.tmdb_id` and insert the
    /// episode under it, atomically.
    async fn create_episode(
        &self,
        show: NewTvShow,
        episode: NewEpisode,
    ) -> Result<(TvShow, Episode), AppError>;

    async fn find_media(&self, kind: MediaKind, id: Uuid) -> Result<Option<Media>, AppError>;

    async fn find_show(&self, id: Uuid) -> Result<Option<TvShow>, AppError>;

    /// Episodes of a show ordered by season then episode, with `owner_id`'s progress
    async fn list_episodes_with_progress(
        &self,
        show_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Vec<EpisodeWithProgress>, AppError>;

    /// Delete a movie or episode with its progress rows. Deleting the last
    /// episode of a show deletes the show too.
    async fn delete_media(&self, media: &Media) -> Result<MediaDeletion, AppError>;

    /// Delete a show, its episodes and their progress. Returns the storage
    /// paths of the removed episodes.
    async fn delete_show(&self, show: &TvShow) -> Result<Vec<String>, AppError>;

    async fn library_listing(
        &self,
        owner_id: Uuid,
        recent_limit: i64,
    ) -> Result<LibraryListing, AppError>;
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Upsert on (owner, kind, media id), stamping `last_watched` with now
    async fn save_progress(&self, update: ProgressUpdate) -> Result<PlaybackProgress, AppError>;

    /// Unwatched items past `min_position` seconds, most recently watched first
    async fn continue_watching(
        &self,
        owner_id: Uuid,
        min_position: f64,
    ) -> Result<Vec<ContinueWatching>, AppError>;
}
