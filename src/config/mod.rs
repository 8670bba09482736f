use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{HelperError, Result};

/// Application configuration, loaded once at startup and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory where downloaded and generated files are written
    pub output_dir: PathBuf,

    /// Default language code for subtitle downloads
    pub subtitle_language: String,

    /// Language code passed to Whisper
    pub transcription_language: String,

    /// Default video resolution, e.g. "1080p"
    pub default_resolution: String,

    /// Whisper model identifier (tiny, base, small, medium, large, ...)
    pub whisper_model: String,

    /// Audio bitrate for downloads and extraction, e.g. "192K"
    pub audio_quality: String,

    /// Show progress spinners for long-running external commands
    pub show_progress: bool,

    /// Optional cookies file passed to yt-dlp for restricted content
    pub cookies_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./results"),
            subtitle_language: "pt".to_string(),
            transcription_language: "pt".to_string(),
            default_resolution: "1080p".to_string(),
            whisper_model: "small".to_string(),
            audio_quality: "192K".to_string(),
            show_progress: true,
            cookies_file: None,
        }
    }
}

impl Config {
    /// Load configuration from file, writing the defaults on first run
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path).map_err(|e| {
                HelperError::Config(format!("failed to read {}: {}", config_path.display(), e))
            })?;

            let config: Config = serde_yaml::from_str(&content).map_err(|e| {
                HelperError::Config(format!("invalid YAML in {}: {}", config_path.display(), e))
            })?;

            config.validate()?;
            config.ensure_output_dir()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            config.ensure_output_dir()?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)
                .map_err(|e| HelperError::Config(format!("cannot create config dir: {}", e)))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| HelperError::Config(format!("failed to serialize config: {}", e)))?;

        fs_err::write(&config_path, content).map_err(|e| {
            HelperError::Config(format!("failed to write {}: {}", config_path.display(), e))
        })?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // A config.yaml in the current directory wins, for easy per-project setups
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| HelperError::Config("could not determine config directory".into()))?;

        Ok(config_dir.join("video-helper").join("config.yaml"))
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        let res = &self.default_resolution;
        if !res.ends_with('p') || res[..res.len() - 1].parse::<u32>().is_err() {
            return Err(HelperError::Config(format!(
                "default_resolution must look like \"1080p\", got \"{}\"",
                res
            )));
        }

        if self.subtitle_language.is_empty() || self.transcription_language.is_empty() {
            return Err(HelperError::Config(
                "subtitle_language and transcription_language must not be empty".into(),
            ));
        }

        if self.whisper_model.is_empty() {
            return Err(HelperError::Config("whisper_model must not be empty".into()));
        }

        Ok(())
    }

    fn ensure_output_dir(&self) -> Result<()> {
        fs_err::create_dir_all(&self.output_dir).map_err(|e| {
            HelperError::Config(format!(
                "cannot create output directory {}: {}",
                self.output_dir.display(),
                e
            ))
        })
    }

    /// Numeric height for the configured or requested resolution ("1080p" -> "1080")
    pub fn resolution_height(resolution: &str) -> Result<String> {
        let digits = resolution.trim_end_matches('p');
        digits
            .parse::<u32>()
            .map(|h| h.to_string())
            .map_err(|_| {
                HelperError::Config(format!(
                    "resolution must look like \"1080p\", got \"{}\"",
                    resolution
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn default_config_round_trips_through_yaml() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.default_resolution, config.default_resolution);
        assert_eq!(back.output_dir, config.output_dir);
        assert_eq!(back.cookies_file, None);
    }

    #[test]
    fn bad_resolution_is_rejected() {
        let config = Config {
            default_resolution: "fullhd".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(HelperError::Config(_))));
    }

    #[test]
    fn resolution_height_strips_suffix() {
        assert_eq!(Config::resolution_height("1080p").unwrap(), "1080");
        assert_eq!(Config::resolution_height("720p").unwrap(), "720");
        assert!(Config::resolution_height("abc").is_err());
    }
}
