// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use govdub::app_config::{self, Config, ProviderConfig, TranslationProvider};
use govdub::app_controller::Controller;
use govdub::file_utils::FileManager;
use govdub::language_utils::supported_languages;
use govdub::translation::TranslationContext;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    OpenAI,
    Anthropic,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

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
    /// Translate a transcript segment file with both providers
    Translate(TranslateArgs),

    /// List the supported target languages
    Languages,

    /// Test the connection to both configured providers
    Check,

    /// Generate shell completions for govdub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// JSON array of segments ({id, text, startTime, endTime})
    #[arg(value_name = "SEGMENTS_JSON")]
    input_path: PathBuf,

    /// Target language code (e.g., 'es', 'zh', 'ht')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Output file (default: <input>.<lang>.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with {speaker, tone, domain, description}
    #[arg(long, value_name = "CONTEXT_JSON")]
    context: Option<PathBuf>,

    /// Speaker name, overrides the context file
    #[arg(long)]
    speaker: Option<String>,

    /// Tone, overrides the context file
    #[arg(long)]
    tone: Option<String>,

    /// Domain, overrides the context file
    #[arg(long)]
    domain: Option<String>,

    /// Content description, overrides the context file
    #[arg(long)]
    description: Option<String>,

    /// Provider A backend
    #[arg(long, value_enum)]
    primary: Option<CliTranslationProvider>,

    /// Provider B backend
    #[arg(long, value_enum)]
    secondary: Option<CliTranslationProvider>,

    /// Translate several segments concurrently
    #[arg(short, long)]
    grouped: bool,
}

/// govdub - dual-model translation for dubbed government communications
#[derive(Parser, Debug)]
#[command(name = "govdub")]
#[command(version = "0.1.0")]
#[command(about = "Dual-model translation engine for dubbing government communications")]
#[command(long_about = "govdub translates transcript segments with two independent language models, \
merges the candidates by agreement, and routes the result to human QA before speech synthesis.

EXAMPLES:
    govdub translate segments.json -t es                 # Translate into Spanish
    govdub translate segments.json -t ht --speaker 'Mayor Rivera' --tone Urgent
    govdub translate segments.json -t zh --grouped       # Several segments at once
    govdub languages                                     # Supported target languages
    govdub check                                         # Test both providers
    govdub completions bash > govdub.bash                # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let emoji = Self::get_emoji_for_level(record.level());
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is set through set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.into());
    }

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "govdub", &mut std::io::stdout());
            Ok(())
        }
        Commands::Languages => {
            for language in supported_languages() {
                println!("{:<4} {}", language.code, language.display_name);
            }
            Ok(())
        }
        Commands::Check => run_check(&cli.config_path, cli.log_level.is_some()).await,
        Commands::Translate(args) => run_translate(args, &cli.config_path, cli.log_level.is_some()).await,
    }
}

fn load_config(config_path: &str, log_level_from_cli: bool) -> Result<Config> {
    let config = Config::load_or_create(Path::new(config_path))?;

    // If log level was not set via command line, update it from config now
    if !log_level_from_cli {
        log::set_max_level(config.log_level.into());
    }

    Ok(config)
}

async fn run_check(config_path: &str, log_level_from_cli: bool) -> Result<()> {
    let config = load_config(config_path, log_level_from_cli)?;
    let controller = Controller::with_config(config)?;

    let mut failures = 0;
    for status in controller.check_connections().await {
        match &status.error {
            None => info!("✅ {} ({} / {}) is reachable", status.role, status.provider, status.model),
            Some(e) => {
                failures += 1;
                error!("{} ({} / {}) failed: {}", status.role, status.provider, status.model, e);
            }
        }
    }

    if failures > 0 {
        return Err(anyhow::anyhow!("{} provider(s) unreachable", failures));
    }
    Ok(())
}

async fn run_translate(options: TranslateArgs, config_path: &str, log_level_from_cli: bool) -> Result<()> {
    let mut config = load_config(config_path, log_level_from_cli)?;

    // Override config with CLI options if provided
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(provider) = &options.primary {
        let prior = config.translation.primary.prior_confidence;
        config.translation.primary = ProviderConfig::new(provider.clone().into(), prior);
    }
    if let Some(provider) = &options.secondary {
        let prior = config.translation.secondary.prior_confidence;
        config.translation.secondary = ProviderConfig::new(provider.clone().into(), prior);
    }

    let mut context: TranslationContext = match &options.context {
        Some(path) => FileManager::read_json(path).context("Failed to load translation context")?,
        None => TranslationContext::default(),
    };
    if let Some(speaker) = &options.speaker {
        context = context.with_speaker(speaker);
    }
    if let Some(tone) = &options.tone {
        context = context.with_tone(tone);
    }
    if let Some(domain) = &options.domain {
        context = context.with_domain(domain);
    }
    if let Some(description) = &options.description {
        context = context.with_description(description);
    }

    let controller = Controller::with_config(config)?;
    controller
        .run(&options.input_path, options.output.clone(), Some(&context), options.grouped)
        .await?;

    Ok(())
}
