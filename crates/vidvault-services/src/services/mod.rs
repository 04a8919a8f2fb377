pub mod metadata;
pub mod tmdb;
