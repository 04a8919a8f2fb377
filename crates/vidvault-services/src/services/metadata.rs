//! Metadata provider abstraction.

use async_trait::async_trait;

/// Movie details from the first search hit
#[derive(Debug, Clone, PartialEq)]
pub struct MovieMetadata {
    pub title: String,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub release_year: Option<i32>,
}

/// Show details; `tmdb_id` keys the per-owner show record
#[derive(Debug, Clone, PartialEq)]
pub struct ShowMetadata {
    pub tmdb_id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeMetadata {
    pub title: Option<String>,
}

/// Looks up descriptive metadata for uploaded media.
///
/// Lookups never fail: transport errors, timeouts and empty result sets all
/// come back as `None`, and callers fall back to filename-derived values.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn search_movie(&self, title: &str, year: Option<i32>) -> Option<MovieMetadata>;

    async fn search_show(&self, name: &str) -> Option<ShowMetadata>;

    async fn episode_details(
        &self,
        tmdb_id: i64,
        season: i32,
        episode: i32,
    ) -> Option<EpisodeMetadata>;
}
