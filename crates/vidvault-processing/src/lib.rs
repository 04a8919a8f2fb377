//! Vidvault media processing
//!
//! Wraps the external ffmpeg and ffprobe binaries used when an upload is
//! finalized: container remux with `+faststart` and duration probing.

pub mod video;

pub use video::{DurationProbe, FFmpegService, Remuxer};
