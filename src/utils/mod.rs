use indicatif::{ProgressBar, ProgressStyle};
use std::process::Output;
use std::time::Duration;

/// Check if the current environment has the required external tools
pub async fn check_dependencies() -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available("yt-dlp").await {
        missing.push("yt-dlp - required for downloading videos, audio and subtitles".to_string());
    }

    if !check_command_available("ffmpeg").await {
        missing.push("ffmpeg - required for local audio extraction".to_string());
    }

    if !check_command_available("whisper").await {
        missing.push("whisper - required for transcription".to_string());
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Spinner for long-running external commands; hidden when progress is off
pub fn spinner(enabled: bool, msg: &str) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    progress.set_message(msg.to_string());
    progress.enable_steady_tick(Duration::from_millis(120));
    progress
}

/// Tail of a failed command's stderr, trimmed for error messages
pub fn stderr_tail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let tail: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .rev()
        .take(3)
        .collect();

    if tail.is_empty() {
        format!("exited with {}", output.status)
    } else {
        tail.into_iter().rev().collect::<Vec<_>>().join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::{Command, Stdio};

    fn failing_output(stderr: &str) -> Output {
        // Portable way to get a real Output with controlled stderr
        Command::new("sh")
            .arg("-c")
            .arg(format!("echo '{}' >&2; exit 1", stderr))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .unwrap()
    }

    #[test]
    fn stderr_tail_returns_last_lines() {
        let output = failing_output("one\ntwo\nthree\nfour");
        assert_eq!(stderr_tail(&output), "two | three | four");
    }

    #[test]
    fn stderr_tail_falls_back_to_status() {
        let output = failing_output("");
        assert!(stderr_tail(&output).starts_with("exited with"));
    }

    #[test]
    fn disabled_spinner_is_hidden() {
        assert!(spinner(false, "working").is_hidden());
    }
}
