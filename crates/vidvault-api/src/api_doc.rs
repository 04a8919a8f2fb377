//! OpenAPI documentation, served at `/api/openapi.json` and rendered under `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::models::TokenResponse;
use crate::error;
use crate::handlers;
use crate::services::upload::{ChunkReceipt, UploadLimit};
use vidvault_core::models;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vidvault API",
        version = "0.1.0",
        description = "Personal media library: chunked uploads, byte-range streaming and playback progress"
    ),
    paths(
        handlers::health::health_check,
        handlers::auth::register,
        handlers::auth::login,
        handlers::upload::check_upload_limit,
        handlers::upload::upload_chunk,
        handlers::upload::finalize_upload,
        handlers::stream::stream_media,
        handlers::media_delete::delete_media,
        handlers::media_delete::delete_show,
        handlers::progress::save_progress,
        handlers::episodes::list_episodes,
        handlers::library::library_overview,
    ),
    components(
        schemas(
            models::MediaKind,
            models::Movie,
            models::TvShow,
            models::Episode,
            models::EpisodeWithProgress,
            models::RegisterRequest,
            models::LoginRequest,
            models::UserResponse,
            TokenResponse,
            UploadLimit,
            ChunkReceipt,
            handlers::health::HealthResponse,
            handlers::upload::FinalizeUploadRequest,
            handlers::upload::FinalizeUploadResponse,
            handlers::upload::UploadChunkForm,
            handlers::media_delete::DeleteMediaResponse,
            handlers::media_delete::DeleteShowResponse,
            handlers::progress::ProgressRequest,
            handlers::progress::ProgressResponse,
            handlers::library::LibraryResponse,
            handlers::library::ContinueWatchingItem,
            error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Liveness check"),
        (name = "auth", description = "Account registration and login"),
        (name = "uploads", description = "Chunked upload and finalize"),
        (name = "streaming", description = "Byte-range video streaming"),
        (name = "media", description = "Movie and episode management"),
        (name = "shows", description = "TV show listing and deletion"),
        (name = "progress", description = "Playback progress tracking"),
        (name = "library", description = "Library overview")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_core_paths() {
        let spec = ApiDoc::openapi();
        for path in [
            "/upload_chunk",
            "/finalize_upload",
            "/stream/{type}/{id}",
            "/api/progress/{type}/{id}",
            "/api/library",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
