pub mod access;
pub mod auth;
pub mod episodes;
pub mod health;
pub mod library;
pub mod media_delete;
pub mod progress;
pub mod stream;
pub mod upload;
