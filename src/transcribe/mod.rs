use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::Config;
use crate::utils::{spinner, stderr_tail};
use crate::{HelperError, Result};

/// Speech-to-text capability. Backed by the Whisper CLI in production.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file to plain text
    async fn transcribe_plain(&self, audio: &Path) -> Result<String>;

    /// Transcribe an audio file to a timestamped .srt file, returning its path
    async fn transcribe_timestamped(&self, audio: &Path) -> Result<PathBuf>;
}

/// Runs the Whisper CLI with the configured model and language. The model is
/// loaded by the subprocess on each call; reuse across a batch is Whisper's
/// own concern (it caches model weights on disk).
pub struct WhisperTranscriber {
    whisper_path: String,
    config: Config,
}

impl WhisperTranscriber {
    pub fn new(config: Config) -> Self {
        Self {
            whisper_path: "whisper".to_string(),
            config,
        }
    }

    /// Run whisper writing one output format, and return the expected
    /// output file path.
    async fn run_whisper(&self, audio: &Path, format: &str) -> Result<PathBuf> {
        if !audio.is_file() {
            return Err(HelperError::Transcription(format!(
                "audio file not found: {}",
                audio.display()
            )));
        }

        tracing::info!(
            "Transcribing {} with model '{}', this may take a while...",
            audio.display(),
            self.config.whisper_model
        );
        let progress = spinner(self.config.show_progress, "Transcribing...");

        let output = Command::new(&self.whisper_path)
            .args([
                &audio.to_string_lossy(),
                "--model",
                &self.config.whisper_model,
                "--language",
                &self.config.transcription_language,
                "--output_format",
                format,
                "--output_dir",
                &self.config.output_dir.to_string_lossy(),
                "--verbose",
                "False",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| HelperError::Transcription(format!("failed to run whisper: {}", e)))?;

        progress.finish_and_clear();

        if !output.status.success() {
            return Err(HelperError::Transcription(format!(
                "whisper failed on {}: {}",
                audio.display(),
                stderr_tail(&output)
            )));
        }

        let stem = audio
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio");
        let result_path = self.config.output_dir.join(format!("{}.{}", stem, format));

        if !result_path.exists() {
            return Err(HelperError::Transcription(format!(
                "whisper produced no {} output for {}",
                format,
                audio.display()
            )));
        }

        Ok(result_path)
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe_plain(&self, audio: &Path) -> Result<String> {
        let txt_path = self.run_whisper(audio, "txt").await?;
        let text = fs_err::read_to_string(&txt_path).map_err(|e| {
            HelperError::Transcription(format!("cannot read transcript {}: {}", txt_path.display(), e))
        })?;

        if text.trim().is_empty() {
            return Err(HelperError::Transcription(format!(
                "empty transcript for {}",
                audio.display()
            )));
        }

        tracing::info!("Transcript saved to {}", txt_path.display());
        Ok(text)
    }

    async fn transcribe_timestamped(&self, audio: &Path) -> Result<PathBuf> {
        let srt_path = self.run_whisper(audio, "srt").await?;
        tracing::info!("SRT subtitle file saved to {}", srt_path.display());
        Ok(srt_path)
    }
}
