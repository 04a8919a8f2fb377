//! Range streaming integration tests.
//!
//! Run with: `cargo test -p vidvault-api --test stream_test`

mod helpers;

use helpers::auth::{register_test_user, TestUser};
use helpers::workflows::{upload_media, video_bytes, MIB};
use helpers::{setup_test_app, TestApp};
use uuid::Uuid;

const FILE_SIZE: usize = 3 * MIB + 17;

async fn app_with_movie() -> (TestApp, TestUser, Uuid, Vec<u8>) {
    let app = setup_test_app().await;
    let user = register_test_user(app.client(), "alice").await;
    let data = video_bytes(FILE_SIZE);
    let id = upload_media(app.client(), &user, "Heat.1995.mp4", &data).await;
    (app, user, id, data)
}

fn header(response: &axum_test::TestResponse, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .map(|v| v.to_str().unwrap().to_string())
}

#[tokio::test]
async fn test_full_stream() {
    let (app, user, id, data) = app_with_movie().await;

    let response = app
        .client()
        .get(&format!("/stream/movie/{}", id))
        .add_header("Authorization", user.bearer())
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(header(&response, "content-type").as_deref(), Some("video/mp4"));
    assert_eq!(header(&response, "accept-ranges").as_deref(), Some("bytes"));
    assert_eq!(
        header(&response, "content-length"),
        Some(FILE_SIZE.to_string())
    );
    assert!(header(&response, "content-range").is_none());
    assert_eq!(response.as_bytes().as_ref(), data.as_slice());
}

#[tokio::test]
async fn test_partial_stream() {
    let (app, user, id, data) = app_with_movie().await;

    let response = app
        .client()
        .get(&format!("/stream/movie/{}", id))
        .add_header("Authorization", user.bearer())
        .add_header("Range", "bytes=100-199")
        .await;

    assert_eq!(response.status_code(), 206);
    assert_eq!(
        header(&response, "content-range"),
        Some(format!("bytes 100-199/{}", FILE_SIZE))
    );
    assert_eq!(header(&response, "content-length").as_deref(), Some("100"));
    assert_eq!(response.as_bytes().as_ref(), &data[100..200]);
}

#[tokio::test]
async fn test_range_across_chunk_boundary_and_open_end() {
    let (app, user, id, data) = app_with_movie().await;
    let start = MIB - 10;

    let response = app
        .client()
        .get(&format!("/stream/movie/{}", id))
        .add_header("Authorization", user.bearer())
        .add_header("Range", format!("bytes={}-", start))
        .await;

    assert_eq!(response.status_code(), 206);
    assert_eq!(
        header(&response, "content-range"),
        Some(format!("bytes {}-{}/{}", start, FILE_SIZE - 1, FILE_SIZE))
    );
    assert_eq!(response.as_bytes().as_ref(), &data[start..]);
}

#[tokio::test]
async fn test_end_past_eof_is_clamped() {
    let (app, user, id, data) = app_with_movie().await;

    let response = app
        .client()
        .get(&format!("/stream/movie/{}", id))
        .add_header("Authorization", user.bearer())
        .add_header("Range", format!("bytes={}-{}", FILE_SIZE - 5, FILE_SIZE + 1000))
        .await;

    assert_eq!(response.status_code(), 206);
    assert_eq!(response.as_bytes().as_ref(), &data[FILE_SIZE - 5..]);
}

#[tokio::test]
async fn test_unsatisfiable_range() {
    let (app, user, id, _) = app_with_movie().await;

    let response = app
        .client()
        .get(&format!("/stream/movie/{}", id))
        .add_header("Authorization", user.bearer())
        .add_header("Range", format!("bytes={}-", FILE_SIZE))
        .await;

    assert_eq!(response.status_code(), 416);
    assert_eq!(
        header(&response, "content-range"),
        Some(format!("bytes */{}", FILE_SIZE))
    );
}

#[tokio::test]
async fn test_malformed_range_serves_full_file() {
    let (app, user, id, _) = app_with_movie().await;

    let response = app
        .client()
        .get(&format!("/stream/movie/{}", id))
        .add_header("Authorization", user.bearer())
        .add_header("Range", "items=0-10")
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.as_bytes().len(), FILE_SIZE);
}

#[tokio::test]
async fn test_token_in_query_string() {
    let (app, user, id, _) = app_with_movie().await;

    let response = app
        .client()
        .get(&format!("/stream/movie/{}", id))
        .add_query_param("access_token", &user.token)
        .add_header("Range", "bytes=0-9")
        .await;

    assert_eq!(response.status_code(), 206);
    assert_eq!(response.as_bytes().len(), 10);
}

#[tokio::test]
async fn test_stream_requires_auth() {
    let (app, _, id, _) = app_with_movie().await;

    let response = app.client().get(&format!("/stream/movie/{}", id)).await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_other_users_media_is_forbidden() {
    let (app, _, id, _) = app_with_movie().await;
    let mallory = register_test_user(app.client(), "mallory").await;

    let response = app
        .client()
        .get(&format!("/stream/movie/{}", id))
        .add_header("Authorization", mallory.bearer())
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_unknown_media() {
    let (app, user, id, _) = app_with_movie().await;

    let missing = app
        .client()
        .get(&format!("/stream/movie/{}", Uuid::new_v4()))
        .add_header("Authorization", user.bearer())
        .await;
    assert_eq!(missing.status_code(), 404);

    // A movie id looked up as an episode
    let wrong_kind = app
        .client()
        .get(&format!("/stream/episode/{}", id))
        .add_header("Authorization", user.bearer())
        .await;
    assert_eq!(wrong_kind.status_code(), 404);

    let bad_type = app
        .client()
        .get(&format!("/stream/podcast/{}", id))
        .add_header("Authorization", user.bearer())
        .await;
    assert_eq!(bad_type.status_code(), 400);
}

#[tokio::test]
async fn test_missing_file_on_disk() {
    let (app, user, id, _) = app_with_movie().await;
    let storage_path = app.library.movies()[0].storage_path.clone();
    std::fs::remove_file(app.file_path(&storage_path)).unwrap();

    let response = app
        .client()
        .get(&format!("/stream/movie/{}", id))
        .add_header("Authorization", user.bearer())
        .await;
    assert_eq!(response.status_code(), 404);
}
