//! Database repositories for data access layer
//!
//! Repositories are organized into control/ (accounts) and media/ (library
//! records and playback progress).

pub mod control;
pub mod media;
pub mod transaction;

pub use control::UserRepository;
pub use media::{MediaRepository, ProgressRepository};
