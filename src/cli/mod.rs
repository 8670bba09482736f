use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "video-helper",
    about = "Video Helper - Download videos and turn them into subtitles and transcripts",
    version,
    long_about = "A CLI tool that chains yt-dlp, ffmpeg and Whisper to download videos, \
extract audio, fetch or generate subtitles, and transcribe speech to text. \
Every command also accepts a .txt list file to process many inputs in one run."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a video from a URL
    Video {
        /// Video URL, or a .txt list file of URLs
        #[arg(value_name = "URL_OR_LIST")]
        input: String,

        /// Video resolution, e.g. "1080p" (config default if not specified)
        #[arg(short, long, value_name = "RES")]
        resolution: Option<String>,
    },

    /// Download audio from a URL, or extract it from a local video file
    Audio {
        /// Video URL, local video file, or a .txt list file
        #[arg(value_name = "URL_OR_FILE")]
        input: String,
    },

    /// Download subtitles for a video URL
    Subtitles {
        /// Video URL, or a .txt list file of URLs
        #[arg(value_name = "URL_OR_LIST")]
        input: String,

        /// Subtitle language code, e.g. "pt" (config default if not specified)
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,
    },

    /// Transcribe audio from a URL or local file to plain text
    Transcribe {
        /// Video URL, local audio/video file, or a .txt list file
        #[arg(value_name = "URL_OR_FILE")]
        input: String,
    },

    /// Generate an SRT subtitle file, or convert a local VTT file to SRT
    Srt {
        /// Video URL, local audio/video file, local .vtt file, or a .txt list file
        #[arg(value_name = "URL_OR_FILE")]
        input: String,
    },

    /// Execute multiple commands from a list file, one per line
    Auto {
        /// Path to the list file (lines: "<action> <input> [--flag value]...")
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}
