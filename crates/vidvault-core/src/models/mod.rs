//! Data models for the application
//!
//! Organized by domain: accounts, library media (movies, shows, episodes)
//! and playback progress.

mod media;
mod progress;
mod user;

pub use media::*;
pub use progress::*;
pub use user::*;
