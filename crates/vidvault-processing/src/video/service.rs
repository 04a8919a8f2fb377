use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

use super::traits::{DurationProbe, Remuxer};

/// ffmpeg/ffprobe invoked as child processes
///
/// Children are spawned with `kill_on_drop`, so an abandoned finalize also
/// stops the tool it was waiting on.
#[derive(Debug, Clone)]
pub struct FFmpegService {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
}

impl FFmpegService {
    pub fn new(ffmpeg_path: impl Into<PathBuf>, ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }

    fn remux_args(input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            "-y".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    fn probe_args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            path.to_string_lossy().to_string(),
        ]
    }
}

/// Parse ffprobe's bare `format=duration` output (e.g. `"1234.560000\n"`).
pub fn parse_duration_output(output: &str) -> Result<f64> {
    let value = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| anyhow!("FFprobe returned no duration"))?;

    let duration: f64 = value
        .parse()
        .with_context(|| format!("Invalid duration from ffprobe: {}", value))?;

    if !duration.is_finite() || duration < 0.0 {
        return Err(anyhow!("Invalid duration from ffprobe: {}", value));
    }

    Ok(duration)
}

#[async_trait]
impl Remuxer for FFmpegService {
    async fn remux_faststart(&self, input: &Path, output: &Path) -> Result<()> {
        let start = Instant::now();
        let args = Self::remux_args(input, output);

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            "Starting FFmpeg remux"
        );

        let result = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .context("Failed to execute ffmpeg")?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            tracing::error!(
                status = %result.status,
                stderr = %stderr.trim(),
                "FFmpeg remux failed"
            );
            return Err(anyhow!("FFmpeg failed: {}", stderr.trim()));
        }

        tracing::info!(
            output = %output.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "FFmpeg remux completed"
        );

        Ok(())
    }
}

#[async_trait]
impl DurationProbe for FFmpegService {
    async fn probe_duration(&self, path: &Path) -> Result<f64> {
        let result = Command::new(&self.ffprobe_path)
            .args(Self::probe_args(path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .context("Failed to execute ffprobe")?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(anyhow!("FFprobe failed: {}", stderr.trim()));
        }

        parse_duration_output(&String::from_utf8_lossy(&result.stdout))
    }
}
