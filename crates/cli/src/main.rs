// clustercmp CLI - compare reference and test clusterings of one event

mod exit_codes;
mod load;
mod logging;
mod matching;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_INPUT, EXIT_INVALID_CONFIG, EXIT_SUCCESS, EXIT_USAGE};
use matching::MatchArgs;

#[derive(Parser)]
#[command(name = "clustercmp")]
#[command(about = "Match clusters of a reference and a test clustering run")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log progress to stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match clusters of one event and report the correspondence
    #[command(after_help = "\
Examples:
  clustercmp match --cells cells.csv --reference ref.csv --test test.csv
  clustercmp match --cells cells.csv --reference ref.csv --test test.csv --json
  clustercmp match --cells cells.csv --reference ref.csv --test test.csv \\
      --config match.toml --min-similarity 0.8 --output report.json")]
    Match(MatchArgs),

    /// Validate a match config without running
    #[command(after_help = "\
Examples:
  clustercmp validate match.toml")]
    Validate {
        /// Path to the match TOML config
        config: std::path::PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("CLUSTERCMP_GIT_DESCRIBE"), ")",
        "\nengine:  clustercmp-match ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("CLUSTERCMP_TARGET"),
        "\nprofile: ", env!("CLUSTERCMP_PROFILE"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let result = match cli.command {
        Commands::Match(args) => matching::cmd_match(args),
        Commands::Validate { config } => matching::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(EXIT_INVALID_CONFIG, msg)
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, msg)
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
