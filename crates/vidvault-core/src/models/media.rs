use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppError;

/// Kind of playable media; also the `{type}` path segment of the HTTP API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "media_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Episode,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Episode => "episode",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" => Ok(MediaKind::Movie),
            "episode" => Ok(MediaKind::Episode),
            other => Err(AppError::InvalidInput(format!(
                "Invalid media type: {}. Must be one of: movie, episode",
                other
            ))),
        }
    }
}

/// Capabilities shared by every playable file, whatever record kind backs it.
pub trait MediaFile {
    fn kind(&self) -> MediaKind;
    fn id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;
    fn storage_path(&self) -> &str;
    /// Seconds; 0.0 when the probe could not determine it
    fn duration(&self) -> f64;
    fn title(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Movie {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub release_year: Option<i32>,
    pub duration: f64,
    #[serde(skip_serializing)]
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TvShow {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Identifier of the show at the metadata provider
    pub tmdb_id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Episode record. `owner_id` is not stored on the episode itself; it is
/// resolved through the owning show.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Episode {
    pub id: Uuid,
    pub show_id: Uuid,
    pub owner_id: Uuid,
    pub season_number: i32,
    pub episode_number: i32,
    pub title: String,
    pub duration: f64,
    #[serde(skip_serializing)]
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

impl MediaFile for Movie {
    fn kind(&self) -> MediaKind {
        MediaKind::Movie
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn storage_path(&self) -> &str {
        &self.storage_path
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn title(&self) -> &str {
        &self.title
    }
}

impl MediaFile for Episode {
    fn kind(&self) -> MediaKind {
        MediaKind::Episode
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn storage_path(&self) -> &str {
        &self.storage_path
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn title(&self) -> &str {
        &self.title
    }
}

/// A playable asset: either a movie or an episode of a show.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "media_type", rename_all = "lowercase")]
pub enum Media {
    Movie(Movie),
    Episode(Episode),
}

impl Media {
    fn as_file(&self) -> &dyn MediaFile {
        match self {
            Media::Movie(movie) => movie,
            Media::Episode(episode) => episode,
        }
    }

    /// Whether `user_id` may stream, track or delete this media
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id() == user_id
    }
}

impl MediaFile for Media {
    fn kind(&self) -> MediaKind {
        self.as_file().kind()
    }

    fn id(&self) -> Uuid {
        self.as_file().id()
    }

    fn owner_id(&self) -> Uuid {
        self.as_file().owner_id()
    }

    fn storage_path(&self) -> &str {
        self.as_file().storage_path()
    }

    fn duration(&self) -> f64 {
        self.as_file().duration()
    }

    fn title(&self) -> &str {
        self.as_file().title()
    }
}

impl From<Movie> for Media {
    fn from(movie: Movie) -> Self {
        Media::Movie(movie)
    }
}

impl From<Episode> for Media {
    fn from(episode: Episode) -> Self {
        Media::Episode(episode)
    }
}

/// Input for creating a movie record
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub owner_id: Uuid,
    pub title: String,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub release_year: Option<i32>,
    pub duration: f64,
    pub storage_path: String,
}

/// Show to find or create (keyed by owner and `tmdb_id`) when registering an episode
#[derive(Debug, Clone)]
pub struct NewTvShow {
    pub owner_id: Uuid,
    pub tmdb_id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
}

/// Input for creating an episode record; the show id is resolved at insert time
#[derive(Debug, Clone)]
pub struct NewEpisode {
    pub season_number: i32,
    pub episode_number: i32,
    pub title: String,
    pub duration: f64,
    pub storage_path: String,
}

/// Episode listing entry joined with the viewer's progress
#[derive(Debug, Clone, Serialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EpisodeWithProgress {
    pub id: Uuid,
    pub title: String,
    pub season_number: i32,
    pub episode_number: i32,
    pub duration: f64,
    /// 0 when the episode was never played
    pub resume_position: f64,
    pub is_watched: bool,
}

/// Outcome of deleting a movie or an episode
#[derive(Debug, Clone)]
pub struct MediaDeletion {
    pub storage_path: String,
    /// Set when the deleted episode was the last one of its show
    pub removed_show_id: Option<Uuid>,
}

/// Lists shown on the library page
#[derive(Debug, Clone, Default)]
pub struct LibraryListing {
    pub recently_added_movies: Vec<Movie>,
    pub recently_added_shows: Vec<TvShow>,
    pub movies: Vec<Movie>,
    /// Ordered by title
    pub shows: Vec<TvShow>,
}
