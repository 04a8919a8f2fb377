use async_trait::async_trait;
use std::path::Path;

/// Rewrites a container so playback can start before the whole file has
/// been downloaded.
#[async_trait]
pub trait Remuxer: Send + Sync {
    /// Copy all streams of `input` into `output` without re-encoding, moving
    /// the index to the front of the file. `output` is overwritten.
    ///
    /// # Errors
    /// Returns an error if the tool cannot be started or exits non-zero.
    async fn remux_faststart(&self, input: &Path, output: &Path) -> anyhow::Result<()>;
}

#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Container duration in seconds
    async fn probe_duration(&self, path: &Path) -> anyhow::Result<f64>;
}
