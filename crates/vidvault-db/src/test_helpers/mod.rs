//! In-memory store implementations for tests
//!
//! [`InMemoryLibrary`] implements every store trait over shared state, so a
//! single clone can back the user, media and progress slots of an app state.

mod in_memory;

pub use in_memory::InMemoryLibrary;
