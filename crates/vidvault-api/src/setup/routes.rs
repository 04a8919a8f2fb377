//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::constants::API_BASE;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use vidvault_core::Config;

/// Room for multipart boundaries and the text fields sent next to a chunk
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Public routes (no authentication required)
    let public_routes = public_routes(state.clone());

    // Protected routes (require authentication)
    // State is applied in protected_routes() for handlers with Multipart to work
    let protected_routes =
        protected_routes(state.clone()).layer(axum::middleware::from_fn_with_state(
            Arc::new(state.auth.clone()),
            crate::auth::middleware::auth_middleware,
        ));

    let app_state_routes = public_routes.merge(protected_routes);

    // Server-level concurrency limit to protect against resource exhaustion under extreme load
    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        max_chunk_size_bytes = config.max_chunk_size_bytes(),
        "HTTP limits configured"
    );

    let app = app_state_routes
        .merge(
            utoipa_rapidoc::RapiDoc::new(format!("{}/openapi.json", API_BASE)).path("/docs"),
        )
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        // Enforced by the extractors, so oversize bodies get a JSON 413
        .layer(DefaultBodyLimit::max(
            config.max_chunk_size_bytes() + MULTIPART_OVERHEAD_BYTES,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            &format!("{}/auth/register", API_BASE),
            post(handlers::auth::register),
        )
        .route(
            &format!("{}/auth/login", API_BASE),
            post(handlers::auth::login),
        )
        .route(
            &format!("{}/openapi.json", API_BASE),
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .with_state(state)
}

fn protected_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .merge(upload_routes(state.clone()))
        .merge(media_routes(state.clone()))
        .merge(library_routes(state.clone()))
        .with_state(state)
}

fn upload_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/check_upload_limit", API_BASE),
            get(handlers::upload::check_upload_limit),
        )
        .route("/upload_chunk", post(handlers::upload::upload_chunk))
        .route("/finalize_upload", post(handlers::upload::finalize_upload))
        .with_state(state)
}

fn media_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/stream/{media_type}/{id}",
            get(handlers::stream::stream_media),
        )
        .route(
            "/delete/{media_type}/{id}",
            post(handlers::media_delete::delete_media).delete(handlers::media_delete::delete_media),
        )
        .route(
            &format!("{}/progress/{{media_type}}/{{id}}", API_BASE),
            post(handlers::progress::save_progress),
        )
        .with_state(state)
}

fn library_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/library", API_BASE),
            get(handlers::library::library_overview),
        )
        .route(
            &format!("{}/tvshows/{{id}}", API_BASE),
            delete(handlers::media_delete::delete_show),
        )
        .route(
            &format!("{}/tvshows/{{id}}/episodes", API_BASE),
            get(handlers::episodes::list_episodes),
        )
        .with_state(state)
}
