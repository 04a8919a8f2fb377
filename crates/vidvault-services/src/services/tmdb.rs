//! The Movie Database (TMDB) v3 client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use vidvault_core::TmdbConfig;

use super::metadata::{EpisodeMetadata, MetadataProvider, MovieMetadata, ShowMetadata};

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct MovieResult {
    title: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShowResult {
    id: i64,
    name: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EpisodeResult {
    name: Option<String>,
}

/// TMDB-backed [`MetadataProvider`]
#[derive(Debug, Clone)]
pub struct TmdbClient {
    http_client: reqwest::Client,
    config: TmdbConfig,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client for TMDB")?;

        if config.api_key.is_none() {
            tracing::warn!("TMDB_API_KEY not set, uploads will not be enriched with metadata");
        }

        Ok(Self {
            http_client,
            config,
        })
    }

    fn poster_url(&self, poster_path: Option<String>) -> Option<String> {
        poster_path
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", self.config.image_base_url, p))
    }

    /// GET `{base_url}/{path}` with the API key and language appended
    async fn get_json<T: DeserializeOwned>(
        &self,
        api_key: &str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", api_key), ("language", self.config.language.as_str())])
            .query(params)
            .send()
            .await
            .context("Failed to send request to TMDB")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("TMDB request to {} failed: {}", path, status));
        }

        response
            .json::<T>()
            .await
            .context("Failed to parse TMDB response")
    }

    /// Run a lookup, logging and swallowing any failure
    async fn lookup<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Option<T> {
        let api_key = self.config.api_key.as_deref()?;

        match self.get_json::<T>(api_key, path, params).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "TMDB lookup failed");
                None
            }
        }
    }

    /// Only the title falls back to `query_title`; the other fields are kept
    fn map_movie(&self, result: MovieResult, query_title: &str) -> MovieMetadata {
        MovieMetadata {
            title: result
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| query_title.to_string()),
            overview: result.overview.filter(|o| !o.is_empty()),
            poster_url: self.poster_url(result.poster_path),
            release_year: result
                .release_date
                .as_deref()
                .and_then(|date| date.split('-').next())
                .and_then(|year| year.parse().ok()),
        }
    }

    fn map_show(&self, result: ShowResult) -> ShowMetadata {
        ShowMetadata {
            tmdb_id: result.id,
            title: result.name.unwrap_or_default(),
            overview: result.overview.filter(|o| !o.is_empty()),
            poster_url: self.poster_url(result.poster_path),
        }
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn search_movie(&self, title: &str, year: Option<i32>) -> Option<MovieMetadata> {
        let mut params = vec![("query", title.to_string())];
        if let Some(year) = year {
            params.push(("year", year.to_string()));
        }

        let response: SearchResponse<MovieResult> = self.lookup("search/movie", &params).await?;
        let movie = response
            .results
            .into_iter()
            .next()
            .map(|result| self.map_movie(result, title));

        tracing::debug!(query = %title, found = movie.is_some(), "TMDB movie search");
        movie
    }

    async fn search_show(&self, name: &str) -> Option<ShowMetadata> {
        let params = [("query", name.to_string())];

        let response: SearchResponse<ShowResult> = self.lookup("search/tv", &params).await?;
        let show = response
            .results
            .into_iter()
            .next()
            .map(|result| self.map_show(result));

        tracing::debug!(query = %name, found = show.is_some(), "TMDB show search");
        show
    }

    async fn episode_details(
        &self,
        tmdb_id: i64,
        season: i32,
        episode: i32,
    ) -> Option<EpisodeMetadata> {
        let path = format!("tv/{}/season/{}/episode/{}", tmdb_id, season, episode);
        let result: EpisodeResult = self.lookup(&path, &[]).await?;

        Some(EpisodeMetadata {
            title: result.name.filter(|n| !n.is_empty()),
        })
    }
}
