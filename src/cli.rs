// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `changewatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "changewatch",
    version,
    about = "Poll files, web pages and page script sets, and report what changed.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the source list.
    ///
    /// Files ending in `.toml` are read as a full config; anything else is a
    /// plain list with one path or URL per line.
    #[arg(short, long, value_name = "PATH")]
    pub config: String,

    /// Polling interval in seconds. Overrides `[config].interval`.
    #[arg(short = 't', long, value_name = "SECONDS")]
    pub interval: Option<u64>,

    /// Treat URLs in a plain list as HTML pages and watch the set of
    /// JavaScript files they reference.
    #[arg(long, alias = "jjs")]
    pub extract_scripts: bool,

    /// Append reports to per-source log files in this directory.
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<String>,

    /// Upload reports to Telegram (needs TELEGRAM_BOT_TOKEN and
    /// TELEGRAM_CHAT_ID in the environment or a `.env` file).
    #[arg(long)]
    pub telegram: bool,

    /// Fetch every source once to capture its baseline, then exit.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CHANGEWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the sources, but don't poll anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
