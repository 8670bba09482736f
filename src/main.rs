use std::collections::HashMap;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use video_helper::batch::{self, BatchOutcome, BatchResult};
use video_helper::classify::{classify, InputSpec};
use video_helper::cli::{Cli, Commands};
use video_helper::config::Config;
use video_helper::executor::{Action, ActionExecutor, ActionOutcome};
use video_helper::utils;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "video_helper=debug"
    } else {
        "video_helper=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Check for required external tools (non-fatal; they may only be needed
    // by actions this run never takes)
    let missing_deps = utils::check_dependencies().await;
    if !missing_deps.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing_deps {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may not be needed for this command)");
    }

    let mut config = Config::load().await.context("failed to load configuration")?;
    if cli.quiet {
        config.show_progress = false;
    }

    let executor = ActionExecutor::new(config);

    let (action, input, options) = match cli.command {
        Commands::Video { input, resolution } => {
            (Action::Video, input, with_option("resolution", resolution))
        }
        Commands::Audio { input } => (Action::Audio, input, HashMap::new()),
        Commands::Subtitles { input, language } => {
            (Action::Subtitles, input, with_option("language", language))
        }
        Commands::Transcribe { input } => (Action::Transcribe, input, HashMap::new()),
        Commands::Srt { input } => (Action::Srt, input, HashMap::new()),
        Commands::Auto { file } => {
            let result = batch::run_batch(&executor, &file, None, &HashMap::new()).await?;
            finish_batch(result)
        }
    };

    let input_spec = classify(&input)
        .with_context(|| format!("cannot process input for '{}'", action))?;

    // Any non-auto action given a list file processes it line by line
    if let InputSpec::ListFile(list_path) = &input_spec {
        let result = batch::run_batch(&executor, list_path, Some(action), &options).await?;
        finish_batch(result)
    }

    let outcome = executor
        .execute(action, &input_spec, &options)
        .await
        .with_context(|| format!("'{}' failed for {}", action, input_spec.describe()))?;

    render_outcome(&outcome);
    Ok(())
}

fn with_option(key: &str, value: Option<String>) -> HashMap<String, String> {
    value
        .map(|v| HashMap::from([(key.to_string(), v)]))
        .unwrap_or_default()
}

fn render_outcome(outcome: &ActionOutcome) {
    match outcome {
        ActionOutcome::File(path) => println!("Saved: {}", path.display()),
        ActionOutcome::Text(text) => println!("{}", text),
        ActionOutcome::NoSubtitles => {
            println!("No subtitles available in the requested language.")
        }
    }
}

/// Render a batch report and exit, non-zero when any line failed.
fn finish_batch(result: BatchResult) -> ! {
    for record in result.records() {
        match &record.outcome {
            BatchOutcome::Success(outcome) => {
                let what = match outcome {
                    ActionOutcome::File(path) => format!("saved {}", path.display()),
                    ActionOutcome::Text(text) => {
                        format!("transcript ({} chars)", text.chars().count())
                    }
                    ActionOutcome::NoSubtitles => "no subtitles available".to_string(),
                };
                println!("line {}: ok - {}", record.line_number, what);
            }
            BatchOutcome::Failure { kind, message } => {
                println!("line {}: FAILED ({}): {}", record.line_number, kind, message);
            }
        }
    }
    println!("Batch finished: {}", result.summary());

    if result.failures() > 0 {
        std::process::exit(1);
    }
    std::process::exit(0);
}
