use crate::auth::models::UserContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::access::owned_media;
use crate::state::DbState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use vidvault_core::models::{MediaKind, ProgressUpdate};
use vidvault_core::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProgressRequest {
    /// Playback position in seconds
    pub time: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressResponse {
    pub success: bool,
    pub is_watched: bool,
    pub resume_position: f64,
}

fn validate_time(time: Option<f64>) -> Result<f64, AppError> {
    match time {
        None => Err(AppError::InvalidInput("time is required".to_string())),
        Some(t) if !t.is_finite() || t < 0.0 => Err(AppError::InvalidInput(format!(
            "time must be a non-negative number of seconds, got {}",
            t
        ))),
        Some(t) => Ok(t),
    }
}

#[utoipa::path(
    post,
    path = "/api/progress/{type}/{id}",
    tag = "progress",
    params(
        ("type" = MediaKind, Path, description = "Media type (movie or episode)"),
        ("id" = Uuid, Path, description = "Media ID")
    ),
    request_body = ProgressRequest,
    responses(
        (status = 200, description = "Progress saved", body = ProgressResponse),
        (status = 400, description = "Missing or invalid time", body = ErrorResponse),
        (status = 403, description = "Media belongs to another user", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(db, request),
    fields(user_id = %user.user_id, media_type = %media_type, media_id = %id)
)]
pub async fn save_progress(
    user: UserContext,
    Path((media_type, id)): Path<(String, Uuid)>,
    State(db): State<DbState>,
    ValidatedJson(request): ValidatedJson<ProgressRequest>,
) -> Result<Json<ProgressResponse>, HttpAppError> {
    let kind: MediaKind = media_type.parse()?;
    let position = validate_time(request.time)?;
    let media = owned_media(&db, kind, id, user.user_id).await?;

    let progress = db
        .progress
        .save_progress(ProgressUpdate::for_media(user.user_id, &media, position))
        .await?;

    Ok(Json(ProgressResponse {
        success: true,
        is_watched: progress.is_watched,
        resume_position: progress.resume_position,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_time() {
        assert_eq!(validate_time(Some(12.5)).unwrap(), 12.5);
        assert_eq!(validate_time(Some(0.0)).unwrap(), 0.0);
        assert!(validate_time(None).is_err());
        assert!(validate_time(Some(-1.0)).is_err());
        assert!(validate_time(Some(f64::INFINITY)).is_err());
    }
}
