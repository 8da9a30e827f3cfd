// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};

use changelog_translator::app_config::{self, Config};
use changelog_translator::app_controller::{Controller, RunOptions, RunOutcome};
use changelog_translator::providers::anthropic::Anthropic;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Forget the persisted state; the next run translates in full
    Reset,

    /// Generate shell completions for changelog-translator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// changelog-translator - keeps a translated changelog up to date
///
/// Fetches a Markdown changelog, detects changes and translates only the new
/// entries, with a periodic full re-translation.
#[derive(Parser, Debug)]
#[command(name = "changelog-translator")]
#[command(version)]
#[command(about = "Incremental LLM translation of a remote changelog")]
#[command(long_about = "Fetches a Markdown changelog, detects changes and translates only the new entries.

EXAMPLES:
    changelog-translator                          # Run once with conf.json
    changelog-translator --dry-run                # Show what would be translated
    changelog-translator --force-full             # Re-translate the whole changelog
    changelog-translator -c other.json -l debug   # Other config, debug logging
    changelog-translator reset                    # Forget the persisted state
    changelog-translator completions bash > changelog-translator.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. The API key is read from ANTHROPIC_API_KEY;
    notifications are sent to DISCORD_WEBHOOK_URL when it is set.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Translate the whole changelog even if an incremental run would do
    #[arg(long)]
    force_full: bool,

    /// Decide and report without translating or writing anything
    #[arg(long)]
    dry_run: bool,

    /// Override the source changelog URL
    #[arg(long)]
    source_url: Option<String>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn anthropic(config: &Config) -> Anthropic {
    Anthropic::new(
        config.translation.api_key.clone(),
        config.translation.endpoint.clone(),
        config.translation.model.clone(),
        config.connect_timeout(),
        config.idle_timeout(),
    )
}

fn spinner() -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(120));
    progress
}

fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Unchanged => info!("Nothing to do"),
        RunOutcome::Planned(plan) => {
            info!("Strategy: {}", plan.strategy);
            info!("Cycle counter after the run: {}", plan.counter);
            if let Some(lines) = plan.extracted_lines {
                info!("Extracted lines: {}", lines);
            }
            info!("Versions to translate: {} of {}", plan.versions_translated, plan.versions_total);
            info!("Characters to translate: {}", plan.unit_chars);
        }
        RunOutcome::Translated(report) => {
            for location in &report.artifact_locations {
                info!("Saved: {}", location);
            }
            info!(
                "Tokens: {} in / {} out, estimated cost ${:.3}",
                report.usage.input_tokens, report.usage.output_tokens, report.usage.cost_estimate_usd
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "changelog-translator", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config)?;
    config.apply_env(|key| std::env::var(key).ok());
    if let Some(source_url) = cli.source_url {
        config.source_url = source_url;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    if let Some(Commands::Reset) = cli.command {
        Controller::with_config(&config, Arc::new(anthropic(&config)))
            .reset()
            .context("Failed to clear persisted state")?;
        info!("State directory: {}", config.state_dir().display());
        return Ok(());
    }

    config.validate().context("Configuration validation failed")?;

    let progress = spinner();
    progress.set_message("Translating");
    let provider = anthropic(&config).with_progress(progress.clone());

    let controller = Controller::with_config(&config, Arc::new(provider));
    let result = controller
        .run(RunOptions {
            force_full: cli.force_full,
            dry_run: cli.dry_run,
        })
        .await;
    progress.finish_and_clear();

    let outcome = result?;
    print_outcome(&outcome);
    Ok(())
}
