use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::Config;
use crate::utils::{spinner, stderr_tail};
use crate::{HelperError, Result};

/// Local audio extraction capability. Backed by ffmpeg/ffprobe in production.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract the audio track of a local video file into an mp3 in the
    /// output directory, returning the mp3 path.
    async fn extract_audio(&self, path: &Path) -> Result<PathBuf>;
}

/// Extracts audio from local video containers by driving ffmpeg.
pub struct LocalExtractor {
    config: Config,
}

impl LocalExtractor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Verify with ffprobe that the container carries an audio stream
    async fn check_has_audio(&self, path: &Path) -> Result<()> {
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_streams",
                &path.to_string_lossy(),
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| HelperError::Extraction(format!("failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(HelperError::Extraction(format!(
                "ffprobe could not read {}: {}",
                path.display(),
                stderr_tail(&output)
            )));
        }

        let info: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| HelperError::Extraction(format!("invalid ffprobe output: {}", e)))?;

        let empty = Vec::new();
        let streams = info["streams"].as_array().unwrap_or(&empty);
        let has_audio = streams
            .iter()
            .any(|s| s["codec_type"].as_str() == Some("audio"));

        if !has_audio {
            return Err(HelperError::Extraction(format!(
                "no audio stream in {}",
                path.display()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Extractor for LocalExtractor {
    async fn extract_audio(&self, path: &Path) -> Result<PathBuf> {
        if !path.is_file() {
            return Err(HelperError::Extraction(format!(
                "local video file not found: {}",
                path.display()
            )));
        }

        self.check_has_audio(path).await?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio");
        let output_path = self.config.output_dir.join(format!("{}.mp3", stem));

        tracing::info!("Extracting audio from {}", path.display());
        let progress = spinner(self.config.show_progress, "Extracting audio...");

        let output = Command::new("ffmpeg")
            .args([
                "-i",
                &path.to_string_lossy(),
                "-vn",
                "-acodec",
                "libmp3lame",
                "-ab",
                &self.config.audio_quality,
                "-y",
                &output_path.to_string_lossy(),
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| HelperError::Extraction(format!("failed to run ffmpeg: {}", e)))?;

        progress.finish_and_clear();

        if !output.status.success() {
            return Err(HelperError::Extraction(format!(
                "ffmpeg failed on {}: {}",
                path.display(),
                stderr_tail(&output)
            )));
        }

        if !output_path.exists() {
            return Err(HelperError::Extraction(format!(
                "extracted audio not found at {}",
                output_path.display()
            )));
        }

        tracing::info!("Audio extracted to {}", output_path.display());
        Ok(output_path)
    }
}
