use crate::auth::models::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::access::{owned_media, owned_show};
use crate::state::{DbState, MediaConfig};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use vidvault_core::models::{MediaFile, MediaKind};
use vidvault_storage::Storage;

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteMediaResponse {
    pub success: bool,
    /// Show removed along with its last episode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_show_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteShowResponse {
    pub success: bool,
    pub deleted_episodes: usize,
}

/// Records are already gone at this point; a leftover file is only logged.
async fn remove_file(storage: &dyn Storage, storage_path: &str) {
    if let Err(e) = storage.delete(storage_path).await {
        tracing::warn!(error = %e, storage_path = %storage_path, "Failed to remove media file");
    }
}

#[utoipa::path(
    delete,
    path = "/delete/{type}/{id}",
    tag = "media",
    params(
        ("type" = MediaKind, Path, description = "Media type (movie or episode)"),
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media deleted", body = DeleteMediaResponse),
        (status = 403, description = "Media belongs to another user", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(db, media_config),
    fields(user_id = %user.user_id, media_type = %media_type, media_id = %id, operation = "delete_media")
)]
pub async fn delete_media(
    user: UserContext,
    Path((media_type, id)): Path<(String, Uuid)>,
    State(db): State<DbState>,
    State(media_config): State<MediaConfig>,
) -> Result<Json<DeleteMediaResponse>, HttpAppError> {
    let kind: MediaKind = media_type.parse()?;
    let media = owned_media(&db, kind, id, user.user_id).await?;

    let deletion = db.media.delete_media(&media).await?;
    remove_file(media_config.storage.as_ref(), &deletion.storage_path).await;

    tracing::info!(
        title = %media.title(),
        removed_show_id = ?deletion.removed_show_id,
        "Media deleted"
    );

    Ok(Json(DeleteMediaResponse {
        success: true,
        removed_show_id: deletion.removed_show_id,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/tvshows/{id}",
    tag = "shows",
    params(
        ("id" = Uuid, Path, description = "TV show ID")
    ),
    responses(
        (status = 200, description = "Show and all its episodes deleted", body = DeleteShowResponse),
        (status = 403, description = "Show belongs to another user", body = ErrorResponse),
        (status = 404, description = "Show not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(db, media_config),
    fields(user_id = %user.user_id, show_id = %id, operation = "delete_show")
)]
pub async fn delete_show(
    user: UserContext,
    Path(id): Path<Uuid>,
    State(db): State<DbState>,
    State(media_config): State<MediaConfig>,
) -> Result<Json<DeleteShowResponse>, HttpAppError> {
    let show = owned_show(&db, id, user.user_id).await?;

    let storage_paths = db.media.delete_show(&show).await?;
    for storage_path in &storage_paths {
        remove_file(media_config.storage.as_ref(), storage_path).await;
    }

    tracing::info!(
        title = %show.title,
        deleted_episodes = storage_paths.len(),
        "TV show deleted"
    );

    Ok(Json(DeleteShowResponse {
        success: true,
        deleted_episodes: storage_paths.len(),
    }))
}
