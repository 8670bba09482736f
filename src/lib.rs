//! Video Helper - A Rust CLI tool for turning videos into subtitles and transcripts
//!
//! This library sequences three external programs (yt-dlp, ffmpeg and the
//! Whisper CLI) to download media, extract audio, and produce plain-text or
//! timestamped transcriptions, either for a single input or for a batch of
//! commands read from a list file.

pub mod batch;
pub mod classify;
pub mod cli;
pub mod config;
pub mod download;
pub mod executor;
pub mod media;
pub mod subtitle;
pub mod transcribe;
pub mod utils;

pub use batch::{BatchOutcome, BatchRecord, BatchResult};
pub use classify::InputSpec;
pub use cli::{Cli, Commands};
pub use config::Config;
pub use executor::{Action, ActionExecutor, ActionOutcome};

/// Result type used throughout the library
pub type Result<T, E = HelperError> = std::result::Result<T, E>;

/// Error taxonomy for every failure the tool can surface
#[derive(thiserror::Error, Debug)]
pub enum HelperError {
    #[error("unrecognized input: {0}")]
    InvalidInput(String),

    #[error("unsupported input for this action: {0}")]
    UnsupportedInput(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("transcription failed: {0}")]
    Transcription(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl HelperError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HelperError::InvalidInput(_) => ErrorKind::InvalidInput,
            HelperError::UnsupportedInput(_) => ErrorKind::UnsupportedInput,
            HelperError::Download(_) => ErrorKind::Download,
            HelperError::Extraction(_) => ErrorKind::Extraction,
            HelperError::Transcription(_) => ErrorKind::Transcription,
            HelperError::Parse(_) => ErrorKind::Parse,
            HelperError::Config(_) => ErrorKind::Config,
        }
    }
}

/// Discriminant for [`HelperError`], carried in batch records so the end-of-run
/// report can name the failure class without holding on to the error itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    UnsupportedInput,
    Download,
    Extraction,
    Transcription,
    Parse,
    Config,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::UnsupportedInput => "unsupported input",
            ErrorKind::Download => "download failure",
            ErrorKind::Extraction => "extraction failure",
            ErrorKind::Transcription => "transcription failure",
            ErrorKind::Parse => "parse error",
            ErrorKind::Config => "config error",
        };
        write!(f, "{}", name)
    }
}
