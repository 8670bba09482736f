//! Batch processing of list files.
//!
//! A list file carries one unit of work per line. In multi-action mode
//! (the `auto` command) each line starts with an action keyword; in
//! single-action mode (any other command given a list file) every line is a
//! bare input and the action is fixed. Lines run strictly sequentially in
//! file order, and one line's failure never aborts the batch.

use std::collections::HashMap;
use std::path::Path;

use crate::classify::classify;
use crate::executor::{Action, ActionExecutor, ActionOutcome};
use crate::{ErrorKind, HelperError, Result};

/// One decoded line of a list file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchLine {
    pub action: Action,
    /// Raw input string; classified only when the line is executed
    pub input: String,
    pub options: HashMap<String, String>,
}

/// Outcome of one batch line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Success(ActionOutcome),
    Failure { kind: ErrorKind, message: String },
}

/// One processed line, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRecord {
    /// 1-based line number in the list file
    pub line_number: usize,
    /// The line as written, trimmed
    pub line: String,
    pub outcome: BatchOutcome,
}

/// Ordered results of a whole batch run
#[derive(Debug, Default)]
pub struct BatchResult {
    records: Vec<BatchRecord>,
}

impl BatchResult {
    pub fn records(&self) -> &[BatchRecord] {
        &self.records
    }

    pub fn successes(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, BatchOutcome::Success(_)))
            .count()
    }

    pub fn failures(&self) -> usize {
        self.records.len() - self.successes()
    }

    pub fn summary(&self) -> String {
        format!("{} succeeded, {} failed", self.successes(), self.failures())
    }
}

/// Split a line into tokens, honoring double quotes so inputs with spaces
/// stay one token.
fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut token_open = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                token_open = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if token_open {
                    tokens.push(std::mem::take(&mut current));
                    token_open = false;
                }
            }
            c => {
                current.push(c);
                token_open = true;
            }
        }
    }

    if in_quotes {
        return Err(HelperError::Parse(format!("unterminated quote in: {}", line)));
    }
    if token_open {
        tokens.push(current);
    }

    Ok(tokens)
}

/// Decode one trimmed, non-empty, non-comment line.
///
/// With `default_action` set (single-action mode) the whole line is the
/// input, optionally quoted. Without it (multi-action mode) the line is
/// `<action> <input> [--flag value]...`.
pub fn parse_line(line: &str, default_action: Option<Action>) -> Result<BatchLine> {
    if let Some(action) = default_action {
        let input = if line.starts_with('"') {
            let tokens = tokenize(line)?;
            match tokens.as_slice() {
                [only] => only.clone(),
                _ => {
                    return Err(HelperError::Parse(format!(
                        "expected a single input, got: {}",
                        line
                    )))
                }
            }
        } else {
            line.to_string()
        };
        return Ok(BatchLine {
            action,
            input,
            options: HashMap::new(),
        });
    }

    let tokens = tokenize(line)?;
    let mut iter = tokens.into_iter();

    let keyword = iter
        .next()
        .ok_or_else(|| HelperError::Parse("empty command line".to_string()))?;
    let action: Action = keyword.parse()?;
    if action == Action::Auto {
        return Err(HelperError::Parse(
            "auto cannot be nested inside a list file".to_string(),
        ));
    }

    let input = iter
        .next()
        .ok_or_else(|| HelperError::Parse(format!("missing input after '{}'", keyword)))?;

    let mut options = HashMap::new();
    while let Some(token) = iter.next() {
        let flag = token.strip_prefix("--").ok_or_else(|| {
            HelperError::Parse(format!("expected --flag, got '{}'", token))
        })?;
        let value = iter
            .next()
            .ok_or_else(|| HelperError::Parse(format!("missing value for --{}", flag)))?;
        options.insert(flag.to_string(), value);
    }

    Ok(BatchLine {
        action,
        input,
        options,
    })
}

/// Run every line of a list file through the executor, recording per-line
/// outcomes. Returns the full result; rendering is the caller's job.
///
/// `base_options` seeds every line's options (the CLI flags in single-action
/// mode); options decoded from a line itself take precedence.
pub async fn run_batch(
    executor: &ActionExecutor,
    list_path: &Path,
    default_action: Option<Action>,
    base_options: &HashMap<String, String>,
) -> Result<BatchResult> {
    tracing::info!("Starting batch processing from {}", list_path.display());

    let content = fs_err::read_to_string(list_path)
        .map_err(|e| HelperError::InvalidInput(format!("cannot read list file: {}", e)))?;

    let mut result = BatchResult::default();

    for (index, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line_number = index + 1;

        let outcome = match process_line(executor, line, default_action, base_options).await {
            Ok(outcome) => {
                tracing::info!("Line {} succeeded", line_number);
                BatchOutcome::Success(outcome)
            }
            Err(e) => {
                tracing::error!("Line {} failed: {}", line_number, e);
                BatchOutcome::Failure {
                    kind: e.kind(),
                    message: e.to_string(),
                }
            }
        };

        result.records.push(BatchRecord {
            line_number,
            line: line.to_string(),
            outcome,
        });
    }

    tracing::info!("Batch finished: {}", result.summary());
    Ok(result)
}

async fn process_line(
    executor: &ActionExecutor,
    line: &str,
    default_action: Option<Action>,
    base_options: &HashMap<String, String>,
) -> Result<ActionOutcome> {
    let command = parse_line(line, default_action)?;
    tracing::info!("Executing '{}' for '{}'", command.action, command.input);

    let mut options = base_options.clone();
    options.extend(command.options);

    let input = classify(&command.input)?;
    executor.execute(command.action, &input, &options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::download::MockDownloader;
    use crate::media::MockExtractor;
    use crate::transcribe::MockTranscriber;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn executor_with(downloader: MockDownloader) -> ActionExecutor {
        ActionExecutor::with_capabilities(
            Config::default(),
            Box::new(downloader),
            Box::new(MockExtractor::new()),
            Box::new(MockTranscriber::new()),
        )
    }

    fn write_list(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("comandos.txt");
        let mut file = fs_err::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    #[test]
    fn quoted_input_with_spaces_is_one_token() {
        let line = r#"srt "path with spaces/video.mov""#;
        let command = parse_line(line, None).unwrap();
        assert_eq!(command.action, Action::Srt);
        assert_eq!(command.input, "path with spaces/video.mov");
        assert!(command.options.is_empty());
    }

    #[test]
    fn flag_value_pairs_are_collected() {
        let line = "video https://youtu.be/abc --resolution 720p";
        let command = parse_line(line, None).unwrap();
        assert_eq!(command.action, Action::Video);
        assert_eq!(command.options.get("resolution").unwrap(), "720p");
    }

    #[test]
    fn stray_token_is_a_parse_error() {
        let err = parse_line("video https://youtu.be/abc 720p", None).unwrap_err();
        assert!(matches!(err, HelperError::Parse(_)));
    }

    #[test]
    fn flag_without_value_is_a_parse_error() {
        let err = parse_line("video https://youtu.be/abc --resolution", None).unwrap_err();
        assert!(matches!(err, HelperError::Parse(_)));
    }

    #[test]
    fn missing_input_is_a_parse_error() {
        assert!(parse_line("video", None).is_err());
    }

    #[test]
    fn nested_auto_is_rejected() {
        let err = parse_line("auto outra-lista.txt", None).unwrap_err();
        assert!(matches!(err, HelperError::Parse(_)));
    }

    #[test]
    fn unterminated_quote_is_a_parse_error() {
        assert!(parse_line(r#"srt "broken"#, None).is_err());
    }

    #[test]
    fn single_action_mode_takes_whole_line_as_input() {
        let command = parse_line("https://youtu.be/abc", Some(Action::Transcribe)).unwrap();
        assert_eq!(command.action, Action::Transcribe);
        assert_eq!(command.input, "https://youtu.be/abc");

        let quoted = parse_line(r#""my videos/clip.mp4""#, Some(Action::Srt)).unwrap();
        assert_eq!(quoted.input, "my videos/clip.mp4");
    }

    #[tokio::test]
    async fn comments_and_blank_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let list = write_list(
            &dir,
            "# download two songs\n\naudio https://youtu.be/one\naudio https://youtu.be/two\n",
        );

        let mut downloader = MockDownloader::new();
        downloader
            .expect_download_audio()
            .times(2)
            .returning(|url| Ok(PathBuf::from(format!("results/{}.mp3", &url[url.len() - 3..]))));

        let result = run_batch(&executor_with(downloader), &list, None, &HashMap::new())
            .await
            .unwrap();

        assert_eq!(result.records().len(), 2);
        assert_eq!(result.records()[0].line_number, 3);
        assert_eq!(result.records()[1].line_number, 4);
        assert_eq!(result.successes(), 2);
        assert_eq!(result.failures(), 0);
    }

    #[tokio::test]
    async fn one_failing_line_does_not_abort_the_batch() {
        let dir = TempDir::new().unwrap();
        let list = write_list(
            &dir,
            "video not-a-real-url\nvideo https://youtu.be/good\n",
        );

        let mut downloader = MockDownloader::new();
        downloader
            .expect_download_video()
            .times(1)
            .returning(|_, _| Ok(PathBuf::from("results/good.mp4")));

        let result = run_batch(&executor_with(downloader), &list, None, &HashMap::new())
            .await
            .unwrap();

        assert_eq!(result.records().len(), 2);
        assert!(matches!(
            result.records()[0].outcome,
            BatchOutcome::Failure {
                kind: ErrorKind::InvalidInput,
                ..
            }
        ));
        assert!(matches!(
            result.records()[1].outcome,
            BatchOutcome::Success(_)
        ));
        assert_eq!(result.summary(), "1 succeeded, 1 failed");
    }

    #[tokio::test]
    async fn unknown_keyword_is_recorded_and_batch_continues() {
        let dir = TempDir::new().unwrap();
        let list = write_list(
            &dir,
            "dance https://youtu.be/abc\naudio https://youtu.be/abc\n",
        );

        let mut downloader = MockDownloader::new();
        downloader
            .expect_download_audio()
            .times(1)
            .returning(|_| Ok(PathBuf::from("results/abc.mp3")));

        let result = run_batch(&executor_with(downloader), &list, None, &HashMap::new())
            .await
            .unwrap();

        assert_eq!(result.records().len(), 2);
        assert!(matches!(
            result.records()[0].outcome,
            BatchOutcome::Failure {
                kind: ErrorKind::Parse,
                ..
            }
        ));
        assert_eq!(result.successes(), 1);
    }

    #[tokio::test]
    async fn per_line_options_reach_the_executor() {
        let dir = TempDir::new().unwrap();
        let list = write_list(&dir, "video https://youtu.be/abc --resolution 480p\n");

        let mut downloader = MockDownloader::new();
        downloader
            .expect_download_video()
            .withf(|_, res| res == "480p")
            .returning(|_, _| Ok(PathBuf::from("results/abc.mp4")));

        let result = run_batch(&executor_with(downloader), &list, None, &HashMap::new())
            .await
            .unwrap();
        assert_eq!(result.successes(), 1);
    }

    #[tokio::test]
    async fn single_action_mode_runs_every_line_with_that_action() {
        let dir = TempDir::new().unwrap();
        let list = write_list(&dir, "https://youtu.be/one\nhttps://youtu.be/two\n");

        let mut downloader = MockDownloader::new();
        downloader
            .expect_download_subtitles()
            .times(2)
            .returning(|_, _| Ok(None));

        let result = run_batch(
            &executor_with(downloader),
            &list,
            Some(Action::Subtitles),
            &HashMap::new(),
        )
        .await
        .unwrap();

        assert_eq!(result.successes(), 2);
        for record in result.records() {
            assert!(matches!(
                record.outcome,
                BatchOutcome::Success(ActionOutcome::NoSubtitles)
            ));
        }
    }

    #[tokio::test]
    async fn single_action_mode_forwards_cli_options() {
        let dir = TempDir::new().unwrap();
        let list = write_list(&dir, "https://youtu.be/one\nhttps://youtu.be/two\n");

        let mut downloader = MockDownloader::new();
        downloader
            .expect_download_video()
            .withf(|_, res| res == "480p")
            .times(2)
            .returning(|_, _| Ok(PathBuf::from("results/clip.mp4")));

        let base: HashMap<String, String> =
            [("resolution".to_string(), "480p".to_string())].into();
        let result = run_batch(
            &executor_with(downloader),
            &list,
            Some(Action::Video),
            &base,
        )
        .await
        .unwrap();
        assert_eq!(result.successes(), 2);
    }

    #[tokio::test]
    async fn line_options_override_base_options() {
        let dir = TempDir::new().unwrap();
        let list = write_list(&dir, "video https://youtu.be/abc --resolution 360p\n");

        let mut downloader = MockDownloader::new();
        downloader
            .expect_download_video()
            .withf(|_, res| res == "360p")
            .returning(|_, _| Ok(PathBuf::from("results/abc.mp4")));

        let base: HashMap<String, String> =
            [("resolution".to_string(), "480p".to_string())].into();
        let result = run_batch(&executor_with(downloader), &list, None, &base)
            .await
            .unwrap();
        assert_eq!(result.successes(), 1);
    }

    #[tokio::test]
    async fn missing_list_file_is_invalid_input() {
        let executor = executor_with(MockDownloader::new());
        let err = run_batch(&executor, Path::new("/no/such/lista.txt"), None, &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HelperError::InvalidInput(_)));
    }
}
