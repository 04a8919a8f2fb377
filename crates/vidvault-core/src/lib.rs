//! Vidvault Core Library
//!
//! Domain models, error types, configuration and filename handling shared by
//! all vidvault components.

pub mod config;
pub mod error;
pub mod filename;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, TmdbConfig, VidvaultConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use filename::{parse_media_filename, sanitize_filename, ParsedMediaInfo};
