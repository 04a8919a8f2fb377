use crate::auth::models::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::access::owned_show;
use crate::state::DbState;
use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use vidvault_core::models::EpisodeWithProgress;

#[utoipa::path(
    get,
    path = "/api/tvshows/{id}/episodes",
    tag = "shows",
    params(
        ("id" = Uuid, Path, description = "TV show ID")
    ),
    responses(
        (status = 200, description = "Episodes ordered by season and episode number", body = Vec<EpisodeWithProgress>),
        (status = 403, description = "Show belongs to another user", body = ErrorResponse),
        (status = 404, description = "Show not found", body = ErrorResponse)
    )
)]
pub async fn list_episodes(
    user: UserContext,
    Path(id): Path<Uuid>,
    State(db): State<DbState>,
) -> Result<Json<Vec<EpisodeWithProgress>>, HttpAppError> {
    let show = owned_show(&db, id, user.user_id).await?;

    let episodes = db
        .media
        .list_episodes_with_progress(show.id, user.user_id)
        .await?;

    Ok(Json(episodes))
}
