//! Ownership checks shared by handlers that act on a single record

use uuid::Uuid;
use vidvault_core::models::{Media, MediaKind, TvShow};
use vidvault_core::AppError;

use crate::state::DbState;

/// Load a movie or episode the caller owns: `404` if missing, `403` if someone else's.
pub async fn owned_media(
    db: &DbState,
    kind: MediaKind,
    id: Uuid,
    user_id: Uuid,
) -> Result<Media, AppError> {
    let media = db
        .media
        .find_media(kind, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", kind, id)))?;

    if !media.is_owned_by(user_id) {
        tracing::warn!(user_id = %user_id, media_type = %kind, media_id = %id, "Access to foreign media denied");
        return Err(AppError::Forbidden(
            "You do not have access to this media".to_string(),
        ));
    }

    Ok(media)
}

pub async fn owned_show(db: &DbState, id: Uuid, user_id: Uuid) -> Result<TvShow, AppError> {
    let show = db
        .media
        .find_show(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("TV show {} not found", id)))?;

    if show.owner_id != user_id {
        tracing::warn!(user_id = %user_id, show_id = %id, "Access to foreign show denied");
        return Err(AppError::Forbidden(
            "You do not have access to this show".to_string(),
        ));
    }

    Ok(show)
}
