//! Stand-ins for ffmpeg, ffprobe and TMDB.

use async_trait::async_trait;
use std::path::Path;
use vidvault_processing::{DurationProbe, Remuxer};
use vidvault_services::{EpisodeMetadata, MetadataProvider, MovieMetadata, ShowMetadata};

pub const TEST_DURATION: f64 = 120.0;
pub const KNOWN_SHOW: &str = "My Show";
pub const KNOWN_SHOW_TMDB_ID: i64 = 1399;

/// Copies the input unchanged
pub struct CopyRemuxer;

#[async_trait]
impl Remuxer for CopyRemuxer {
    async fn remux_faststart(&self, input: &Path, output: &Path) -> anyhow::Result<()> {
        tokio::fs::copy(input, output).await?;
        Ok(())
    }
}

pub struct FixedProbe(pub f64);

#[async_trait]
impl DurationProbe for FixedProbe {
    async fn probe_duration(&self, _path: &Path) -> anyhow::Result<f64> {
        Ok(self.0)
    }
}

/// Knows one show (with two episode titles) and one movie
pub struct ScriptedMetadata;

#[async_trait]
impl MetadataProvider for ScriptedMetadata {
    async fn search_movie(&self, title: &str, _year: Option<i32>) -> Option<MovieMetadata> {
        (title == "Heat").then(|| MovieMetadata {
            title: "Heat".to_string(),
            overview: Some("A group of high-end professional thieves.".to_string()),
            poster_url: Some("https://image.tmdb.org/t/p/w500/heat.jpg".to_string()),
            release_year: Some(1995),
        })
    }

    async fn search_show(&self, name: &str) -> Option<ShowMetadata> {
        (name == KNOWN_SHOW).then(|| ShowMetadata {
            tmdb_id: KNOWN_SHOW_TMDB_ID,
            title: KNOWN_SHOW.to_string(),
            overview: None,
            poster_url: None,
        })
    }

    async fn episode_details(
        &self,
        tmdb_id: i64,
        season: i32,
        episode: i32,
    ) -> Option<EpisodeMetadata> {
        if tmdb_id != KNOWN_SHOW_TMDB_ID || season != 1 {
            return None;
        }
        let title = match episode {
            1 => "Pilot",
            2 => "The Second One",
            _ => return None,
        };
        Some(EpisodeMetadata {
            title: Some(title.to_string()),
        })
    }
}
