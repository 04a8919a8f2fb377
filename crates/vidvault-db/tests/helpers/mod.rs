//! Shared helpers for repository tests against a real PostgreSQL.
//!
//! Each test gets its own container with the workspace migrations applied.
//! Without a reachable Docker daemon the tests log a notice and return early.

#![allow(dead_code)]

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;
use uuid::Uuid;
use vidvault_core::models::{NewEpisode, NewMovie, NewTvShow};
use vidvault_db::{UserRepository, UserStore};

pub struct TestDb {
    pub pool: PgPool,
    _container: ContainerAsync<Postgres>,
}

impl TestDb {
    /// Insert a user and return its id
    pub async fn create_owner(&self, username: &str) -> Uuid {
        UserRepository::new(self.pool.clone())
            .create_user(username, "hash")
            .await
            .expect("Failed to create test user")
            .id
    }
}

pub async fn setup_test_db() -> Option<TestDb> {
    let container = match Postgres::default().start().await {
        Ok(container) => container,
        Err(e) => {
            eprintln!("Skipping PostgreSQL test, no container runtime: {}", e);
            return None;
        }
    };

    let host = container
        .get_host()
        .await
        .expect("Failed to resolve container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to resolve container port");
    let connection_string = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&connection_string)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(TestDb {
        pool,
        _container: container,
    })
}

pub fn movie(owner_id: Uuid, title: &str) -> NewMovie {
    NewMovie {
        owner_id,
        title: title.to_string(),
        overview: None,
        poster_url: None,
        release_year: Some(1995),
        duration: 120.0,
        storage_path: format!("{}/{}.mp4", owner_id, title),
    }
}

pub fn show(owner_id: Uuid, tmdb_id: i64, title: &str) -> NewTvShow {
    NewTvShow {
        owner_id,
        tmdb_id,
        title: title.to_string(),
        overview: Some("Overview".to_string()),
        poster_url: None,
    }
}

pub fn episode(owner_id: Uuid, season: i32, number: i32) -> NewEpisode {
    NewEpisode {
        season_number: season,
        episode_number: number,
        title: format!("Episode {}", number),
        duration: 60.0,
        storage_path: format!("{}/show.S{:02}E{:02}.mp4", owner_id, season, number),
    }
}
