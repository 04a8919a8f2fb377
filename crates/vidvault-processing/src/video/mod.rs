//! Video processing module

pub mod service;
pub mod traits;

pub use service::FFmpegService;
pub use traits::{DurationProbe, Remuxer};
