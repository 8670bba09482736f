use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::classify::{is_audio_path, is_subtitle_path, is_vtt_path, InputSpec};
use crate::config::Config;
use crate::download::{Downloader, StreamDownloader};
use crate::media::{Extractor, LocalExtractor};
use crate::subtitle;
use crate::transcribe::{Transcriber, WhisperTranscriber};
use crate::{HelperError, Result};

/// The action requested for one invocation or one batch line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Video,
    Audio,
    Subtitles,
    Transcribe,
    Srt,
    Auto,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Video => "video",
            Action::Audio => "audio",
            Action::Subtitles => "subtitles",
            Action::Transcribe => "transcribe",
            Action::Srt => "srt",
            Action::Auto => "auto",
        }
    }
}

impl std::str::FromStr for Action {
    type Err = HelperError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "video" => Ok(Action::Video),
            "audio" => Ok(Action::Audio),
            "subtitles" => Ok(Action::Subtitles),
            "transcribe" => Ok(Action::Transcribe),
            "srt" => Ok(Action::Srt),
            "auto" => Ok(Action::Auto),
            other => Err(HelperError::Parse(format!("unknown action '{}'", other))),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one executed action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A file was produced (or an existing one already satisfied the request)
    File(PathBuf),
    /// Plain transcript text
    Text(String),
    /// The platform has no subtitles in the requested language
    NoSubtitles,
}

/// Dispatches one (action, input, options) triple to the right capability.
/// Holds the capability handles so expensive collaborators are constructed
/// once and reused across a whole batch.
pub struct ActionExecutor {
    config: Config,
    downloader: Box<dyn Downloader>,
    extractor: Box<dyn Extractor>,
    transcriber: Box<dyn Transcriber>,
}

impl ActionExecutor {
    pub fn new(config: Config) -> Self {
        let downloader = Box::new(StreamDownloader::new(config.clone()));
        let extractor = Box::new(LocalExtractor::new(config.clone()));
        let transcriber = Box::new(WhisperTranscriber::new(config.clone()));
        Self {
            config,
            downloader,
            extractor,
            transcriber,
        }
    }

    /// Construct with explicit capabilities; used by tests
    pub fn with_capabilities(
        config: Config,
        downloader: Box<dyn Downloader>,
        extractor: Box<dyn Extractor>,
        transcriber: Box<dyn Transcriber>,
    ) -> Self {
        Self {
            config,
            downloader,
            extractor,
            transcriber,
        }
    }

    /// Execute one action against one classified input. Failures are always
    /// propagated to the caller, never swallowed here.
    pub async fn execute(
        &self,
        action: Action,
        input: &InputSpec,
        options: &HashMap<String, String>,
    ) -> Result<ActionOutcome> {
        match action {
            Action::Video => match input {
                InputSpec::RemoteUrl(url) => {
                    let resolution = options
                        .get("resolution")
                        .unwrap_or(&self.config.default_resolution);
                    let path = self.downloader.download_video(url, resolution).await?;
                    Ok(ActionOutcome::File(path))
                }
                other => Err(HelperError::UnsupportedInput(format!(
                    "video requires a platform URL, got {}",
                    other.describe()
                ))),
            },

            Action::Audio => {
                let path = self.resolve_audio(input).await?;
                Ok(ActionOutcome::File(path))
            }

            Action::Subtitles => match input {
                InputSpec::RemoteUrl(url) => {
                    let language = options
                        .get("language")
                        .unwrap_or(&self.config.subtitle_language);
                    match self.downloader.download_subtitles(url, language).await? {
                        Some(path) => Ok(ActionOutcome::File(path)),
                        None => Ok(ActionOutcome::NoSubtitles),
                    }
                }
                other => Err(HelperError::UnsupportedInput(format!(
                    "subtitles requires a platform URL, got {}",
                    other.describe()
                ))),
            },

            Action::Transcribe => {
                let audio = self.resolve_audio(input).await?;
                let text = self.transcriber.transcribe_plain(&audio).await?;
                Ok(ActionOutcome::Text(text))
            }

            Action::Srt => {
                if let InputSpec::LocalPath(path) = input {
                    if is_vtt_path(path) {
                        return self.convert_vtt_file(path);
                    }
                }
                let audio = self.resolve_audio(input).await?;
                let srt_path = self.transcriber.transcribe_timestamped(&audio).await?;
                Ok(ActionOutcome::File(srt_path))
            }

            // The CLI routes auto straight to the batch orchestrator
            Action::Auto => Err(HelperError::UnsupportedInput(
                "auto cannot be executed as a single action".to_string(),
            )),
        }
    }

    /// Resolve any input to a local audio file path: download for URLs,
    /// extract for local videos, pass through files that are already audio.
    async fn resolve_audio(&self, input: &InputSpec) -> Result<PathBuf> {
        match input {
            InputSpec::RemoteUrl(url) => self.downloader.download_audio(url).await,
            InputSpec::LocalPath(path) if is_audio_path(path) => Ok(path.clone()),
            InputSpec::LocalPath(path) if is_subtitle_path(path) => {
                Err(HelperError::UnsupportedInput(format!(
                    "subtitle file {} carries no audio",
                    path.display()
                )))
            }
            InputSpec::LocalPath(path) => self.extractor.extract_audio(path).await,
            InputSpec::ListFile(path) => Err(HelperError::UnsupportedInput(format!(
                "list file {} must go through batch processing",
                path.display()
            ))),
        }
    }

    fn convert_vtt_file(&self, vtt_path: &Path) -> Result<ActionOutcome> {
        tracing::info!("Converting VTT to SRT: {}", vtt_path.display());

        let content = fs_err::read_to_string(vtt_path).map_err(|e| {
            HelperError::InvalidInput(format!("cannot read {}: {}", vtt_path.display(), e))
        })?;

        let srt = subtitle::vtt_to_srt(&content);
        let srt_path = vtt_path.with_extension("srt");
        fs_err::write(&srt_path, srt).map_err(|e| {
            HelperError::Extraction(format!("cannot write {}: {}", srt_path.display(), e))
        })?;

        tracing::info!("SRT written to {}", srt_path.display());
        Ok(ActionOutcome::File(srt_path))
    }
}
