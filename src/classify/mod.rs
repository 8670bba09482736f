use std::path::{Path, PathBuf};
use url::Url;

use crate::{HelperError, Result};

/// Extensions treated as batch list files
const LIST_EXTENSIONS: &[&str] = &["txt", "list"];

/// Audio extensions that need no extraction step
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "aac", "wav", "flac", "ogg", "opus"];

/// Video container extensions
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "webm", "m4v", "wmv"];

/// Subtitle file extensions
const SUBTITLE_EXTENSIONS: &[&str] = &["vtt", "srt"];

/// A classified raw input string. Exactly one variant applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    /// A URL on the supported video platform
    RemoteUrl(String),
    /// An existing local media or subtitle file
    LocalPath(PathBuf),
    /// An existing plain-text list file for batch processing
    ListFile(PathBuf),
}

impl InputSpec {
    /// Short human-readable description for log and error messages
    pub fn describe(&self) -> String {
        match self {
            InputSpec::RemoteUrl(url) => format!("URL {}", url),
            InputSpec::LocalPath(path) => format!("local file {}", path.display()),
            InputSpec::ListFile(path) => format!("list file {}", path.display()),
        }
    }
}

/// Classify a raw input string as a platform URL, a list file, or a local
/// media file. Pure apart from filesystem existence checks; never reads
/// file contents.
pub fn classify(raw: &str) -> Result<InputSpec> {
    if is_platform_url(raw) {
        return Ok(InputSpec::RemoteUrl(raw.to_string()));
    }

    let path = Path::new(raw);
    if path.is_file() {
        if has_extension_in(path, LIST_EXTENSIONS) {
            return Ok(InputSpec::ListFile(path.to_path_buf()));
        }
        if has_extension_in(path, AUDIO_EXTENSIONS)
            || has_extension_in(path, VIDEO_EXTENSIONS)
            || has_extension_in(path, SUBTITLE_EXTENSIONS)
        {
            return Ok(InputSpec::LocalPath(path.to_path_buf()));
        }
    }

    Err(HelperError::InvalidInput(raw.to_string()))
}

/// Check whether a URL belongs to the supported video platform
pub fn is_platform_url(raw: &str) -> bool {
    let parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return false,
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    let host = match parsed.host_str() {
        Some(host) => host.strip_prefix("www.").unwrap_or(host),
        None => return false,
    };

    match host {
        "youtu.be" => !parsed.path().trim_matches('/').is_empty(),
        "youtube.com" | "m.youtube.com" => {
            let path = parsed.path();
            path.starts_with("/watch")
                || path.starts_with("/embed/")
                || path.starts_with("/v/")
                || path.starts_with("/shorts/")
        }
        _ => false,
    }
}

/// True if the path has an extension that needs no audio extraction
pub fn is_audio_path(path: &Path) -> bool {
    has_extension_in(path, AUDIO_EXTENSIONS)
}

/// True if the path is a WebVTT subtitle file
pub fn is_vtt_path(path: &Path) -> bool {
    has_extension_in(path, &["vtt"])
}

/// True if the path is a subtitle file of either format
pub fn is_subtitle_path(path: &Path) -> bool {
    has_extension_in(path, SUBTITLE_EXTENSIONS)
}

fn has_extension_in(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap();
        path
    }

    #[test]
    fn platform_urls_classify_as_remote() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/abc123",
        ] {
            assert_eq!(
                classify(url).unwrap(),
                InputSpec::RemoteUrl(url.to_string()),
                "expected RemoteUrl for {}",
                url
            );
        }
    }

    #[test]
    fn existing_media_file_classifies_as_local_path() {
        let dir = TempDir::new().unwrap();
        for name in ["clip.mp4", "song.mp3", "subs.vtt", "movie.MKV"] {
            let path = touch(&dir, name);
            let spec = classify(path.to_str().unwrap()).unwrap();
            assert_eq!(spec, InputSpec::LocalPath(path));
        }
    }

    #[test]
    fn existing_txt_file_classifies_as_list() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "comandos.txt");
        assert_eq!(
            classify(path.to_str().unwrap()).unwrap(),
            InputSpec::ListFile(path)
        );
    }

    #[test]
    fn unknown_strings_are_invalid_input() {
        let err = classify("definitely-not-a-thing").unwrap_err();
        assert!(matches!(err, HelperError::InvalidInput(_)));

        // Non-platform URLs are not supported either
        let err = classify("https://vimeo.com/12345").unwrap_err();
        assert!(matches!(err, HelperError::InvalidInput(_)));
    }

    #[test]
    fn missing_file_with_media_extension_is_invalid() {
        let err = classify("/no/such/dir/video.mp4").unwrap_err();
        assert!(matches!(err, HelperError::InvalidInput(_)));
    }

    #[test]
    fn existing_file_with_unknown_extension_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "notes.docx");
        assert!(classify(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn audio_and_vtt_helpers() {
        assert!(is_audio_path(Path::new("a.mp3")));
        assert!(is_audio_path(Path::new("a.FLAC")));
        assert!(!is_audio_path(Path::new("a.mp4")));
        assert!(is_vtt_path(Path::new("subs.vtt")));
        assert!(!is_vtt_path(Path::new("subs.srt")));
    }
}
