use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use crate::config::Config;
use crate::utils::{spinner, stderr_tail};
use crate::{HelperError, Result};

/// Remote download capability. Backed by yt-dlp in production; mocked in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download a video at the given resolution, returning the final file path
    async fn download_video(&self, url: &str, resolution: &str) -> Result<PathBuf>;

    /// Download the audio stream as mp3, returning the final file path
    async fn download_audio(&self, url: &str) -> Result<PathBuf>;

    /// Download subtitles in the given language. `Ok(None)` means the platform
    /// has no subtitles for that language; it is not an error.
    async fn download_subtitles(&self, url: &str, language: &str) -> Result<Option<PathBuf>>;
}

/// Downloads video, audio and subtitles by driving the yt-dlp binary.
pub struct StreamDownloader {
    yt_dlp_path: String,
    config: Config,
}

impl StreamDownloader {
    pub fn new(config: Config) -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            config,
        }
    }

    /// Arguments shared by every yt-dlp invocation
    fn base_args(&self) -> Vec<String> {
        let mut args = vec!["--no-playlist".to_string(), "--quiet".to_string()];

        if let Some(cookies) = &self.config.cookies_file {
            if cookies.exists() {
                args.push("--cookies".to_string());
                args.push(cookies.to_string_lossy().into_owned());
            } else {
                tracing::warn!(
                    "Configured cookies file not found: {}. Downloads might be restricted.",
                    cookies.display()
                );
            }
        }

        args
    }

    /// Output template placing files in the configured output directory,
    /// named after the video title.
    fn output_template(&self) -> String {
        self.config
            .output_dir
            .join("%(title)s.%(ext)s")
            .to_string_lossy()
            .into_owned()
    }

    async fn run_yt_dlp(&self, args: &[String], context: &str) -> Result<std::process::Output> {
        tracing::debug!("Running yt-dlp {}", args.join(" "));

        let output = Command::new(&self.yt_dlp_path)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| HelperError::Download(format!("failed to run yt-dlp: {}", e)))?;

        if !output.status.success() {
            return Err(HelperError::Download(format!(
                "{}: {}",
                context,
                stderr_tail(&output)
            )));
        }

        Ok(output)
    }

    /// Final file path printed by yt-dlp's `--print after_move:filepath`
    fn printed_filepath(output: &std::process::Output) -> Result<PathBuf> {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| {
                HelperError::Download("yt-dlp did not report an output file".to_string())
            })?;

        if !path.exists() {
            return Err(HelperError::Download(format!(
                "downloaded file not found at {}",
                path.display()
            )));
        }

        Ok(path)
    }

    /// Query video metadata without downloading anything
    async fn probe_info(&self, url: &str) -> Result<Value> {
        let mut args = self.base_args();
        args.extend(["--dump-json".to_string(), "--skip-download".to_string(), url.to_string()]);

        let output = self.run_yt_dlp(&args, "failed to query video info").await?;
        serde_json::from_slice(&output.stdout)
            .map_err(|e| HelperError::Download(format!("invalid yt-dlp JSON output: {}", e)))
    }
}

#[async_trait]
impl Downloader for StreamDownloader {
    async fn download_video(&self, url: &str, resolution: &str) -> Result<PathBuf> {
        let height = Config::resolution_height(resolution)
            .map_err(|_| HelperError::Parse(format!("invalid resolution '{}'", resolution)))?;

        let mut args = self.base_args();
        args.extend([
            "--output".to_string(),
            self.output_template(),
            "--format".to_string(),
            format!("bestvideo[height<=?{}]+bestaudio/best", height),
            "--merge-output-format".to_string(),
            "mp4".to_string(),
            "--no-simulate".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
            url.to_string(),
        ]);

        let progress = spinner(
            self.config.show_progress,
            &format!("Downloading video at {}...", resolution),
        );
        let result = self.run_yt_dlp(&args, "failed to download video").await;
        progress.finish_and_clear();

        let path = Self::printed_filepath(&result?)?;
        tracing::info!("Video downloaded to {}", path.display());
        Ok(path)
    }

    async fn download_audio(&self, url: &str) -> Result<PathBuf> {
        let mut args = self.base_args();
        args.extend([
            "--output".to_string(),
            self.output_template(),
            "--format".to_string(),
            "bestaudio/best".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            "mp3".to_string(),
            "--audio-quality".to_string(),
            self.config.audio_quality.clone(),
            "--no-simulate".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
            url.to_string(),
        ]);

        let progress = spinner(self.config.show_progress, "Downloading audio...");
        let result = self.run_yt_dlp(&args, "failed to download audio").await;
        progress.finish_and_clear();

        let path = Self::printed_filepath(&result?)?;
        tracing::info!("Audio downloaded to {}", path.display());
        Ok(path)
    }

    async fn download_subtitles(&self, url: &str, language: &str) -> Result<Option<PathBuf>> {
        let info = self.probe_info(url).await?;

        let has_subs = info["subtitles"].get(language).is_some()
            || info["automatic_captions"].get(language).is_some();
        if !has_subs {
            tracing::warn!("No subtitles available for language '{}'", language);
            return Ok(None);
        }

        let video_id = info["id"]
            .as_str()
            .ok_or_else(|| HelperError::Download("video id missing from metadata".to_string()))?;

        // Name subtitle files by video id; titles can carry characters that
        // yt-dlp sanitizes unpredictably.
        let mut args = self.base_args();
        args.extend([
            "--output".to_string(),
            self.config.output_dir.join("%(id)s").to_string_lossy().into_owned(),
            "--skip-download".to_string(),
            "--write-subs".to_string(),
            "--write-auto-subs".to_string(),
            "--sub-langs".to_string(),
            language.to_string(),
            "--sub-format".to_string(),
            "vtt".to_string(),
            url.to_string(),
        ]);

        self.run_yt_dlp(&args, "failed to download subtitles").await?;

        let expected = self
            .config
            .output_dir
            .join(format!("{}.{}.vtt", video_id, language));
        if expected.exists() {
            tracing::info!("Subtitles downloaded to {}", expected.display());
            Ok(Some(expected))
        } else {
            tracing::warn!(
                "yt-dlp reported subtitles for '{}' but wrote no file",
                language
            );
            Ok(None)
        }
    }
}
