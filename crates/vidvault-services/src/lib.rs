//! Vidvault external services
//!
//! Metadata enrichment for finalized uploads. [`MetadataProvider`] is the
//! seam; [`TmdbClient`] talks to The Movie Database v3 API.

pub mod services;

pub use services::metadata::{EpisodeMetadata, MetadataProvider, MovieMetadata, ShowMetadata};
pub use services::tmdb::TmdbClient;
