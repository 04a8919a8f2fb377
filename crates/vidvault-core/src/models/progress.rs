use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::media::{Media, MediaKind};

/// Fraction of the duration past which an item counts as watched
pub const WATCHED_THRESHOLD: f64 = 0.95;

/// Minimum resume position (seconds) for an item to appear in "continue watching"
pub const CONTINUE_WATCHING_MIN_POSITION: f64 = 30.0;

/// Watched flag derived from a resume position.
///
/// Unknown durations (0 or less) never count as watched.
pub fn is_watched(position: f64, duration: f64) -> bool {
    duration > 0.0 && position / duration > WATCHED_THRESHOLD
}

/// Resume position of one user for one media item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PlaybackProgress {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub media_kind: MediaKind,
    pub media_id: Uuid,
    pub resume_position: f64,
    pub is_watched: bool,
    pub last_watched: DateTime<Utc>,
}

/// Upsert input keyed by (owner, kind, media id)
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub owner_id: Uuid,
    pub media_kind: MediaKind,
    pub media_id: Uuid,
    pub resume_position: f64,
    pub is_watched: bool,
}

impl ProgressUpdate {
    /// Build an update for `media`, deriving the watched flag from its duration.
    pub fn for_media(owner_id: Uuid, media: &Media, position: f64) -> Self {
        use super::media::MediaFile;

        Self {
            owner_id,
            media_kind: media.kind(),
            media_id: media.id(),
            resume_position: position,
            is_watched: is_watched(position, media.duration()),
        }
    }
}

/// In-progress item for the "continue watching" row
#[derive(Debug, Clone)]
pub struct ContinueWatching {
    pub media: Media,
    pub progress: PlaybackProgress,
}
