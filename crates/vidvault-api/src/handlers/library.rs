use crate::auth::models::UserContext;
use crate::constants::RECENTLY_ADDED_LIMIT;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::{DbState, MediaConfig};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use vidvault_core::models::{
    ContinueWatching, Media, MediaFile, MediaKind, Movie, TvShow, CONTINUE_WATCHING_MIN_POSITION,
};

/// A started but unfinished movie or episode
#[derive(Debug, Serialize, ToSchema)]
pub struct ContinueWatchingItem {
    pub media_type: MediaKind,
    pub media_id: Uuid,
    pub title: String,
    pub duration: f64,
    pub resume_position: f64,
    pub last_watched: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<i32>,
}

impl From<ContinueWatching> for ContinueWatchingItem {
    fn from(item: ContinueWatching) -> Self {
        let (show_id, season_number, episode_number) = match &item.media {
            Media::Episode(episode) => (
                Some(episode.show_id),
                Some(episode.season_number),
                Some(episode.episode_number),
            ),
            Media::Movie(_) => (None, None, None),
        };

        Self {
            media_type: item.media.kind(),
            media_id: item.media.id(),
            title: item.media.title().to_string(),
            duration: item.media.duration(),
            resume_position: item.progress.resume_position,
            last_watched: item.progress.last_watched,
            show_id,
            season_number,
            episode_number,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LibraryResponse {
    pub file_count: i64,
    pub limit: i64,
    pub continue_watching: Vec<ContinueWatchingItem>,
    pub recently_added_movies: Vec<Movie>,
    pub recently_added_shows: Vec<TvShow>,
    pub movies: Vec<Movie>,
    /// Ordered by title
    pub shows: Vec<TvShow>,
}

#[utoipa::path(
    get,
    path = "/api/library",
    tag = "library",
    responses(
        (status = 200, description = "Library overview of the caller", body = LibraryResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(db, media_config), fields(user_id = %user.user_id))]
pub async fn library_overview(
    user: UserContext,
    State(db): State<DbState>,
    State(media_config): State<MediaConfig>,
) -> Result<Json<LibraryResponse>, HttpAppError> {
    let file_count = db.media.count_media_files(user.user_id).await?;
    let continue_watching = db
        .progress
        .continue_watching(user.user_id, CONTINUE_WATCHING_MIN_POSITION)
        .await?;
    let listing = db
        .media
        .library_listing(user.user_id, RECENTLY_ADDED_LIMIT)
        .await?;

    Ok(Json(LibraryResponse {
        file_count,
        limit: media_config.user_media_limit,
        continue_watching: continue_watching.into_iter().map(Into::into).collect(),
        recently_added_movies: listing.recently_added_movies,
        recently_added_shows: listing.recently_added_shows,
        movies: listing.movies,
        shows: listing.shows,
    }))
}
