//! Vidvault database layer
//!
//! PostgreSQL repositories behind the store traits in [`traits`]. Handlers and
//! services depend on the traits so tests can swap in the in-memory doubles
//! from `test_helpers` (feature `test-utils`).

pub mod db;
pub mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;

pub use db::{MediaRepository, ProgressRepository, UserRepository};
pub use traits::{MediaStore, ProgressStore, UserStore};
