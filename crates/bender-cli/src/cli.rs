use bender_core::Value;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Verbosity of the stderr log, from silent to every watch write
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Silent
    Off,
    /// Failed resolutions and broken libraries
    Error,
    /// Also disabled watches and accepted undeclared site properties
    Warn,
    /// Also per-library summaries
    Info,
    /// Also each resolution step (what `--verbose` selects)
    Debug,
    /// Also every watch evaluation and target write
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => Self::OFF,
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

/// How `resolve` prints a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented tree, one node per line
    Outline,
    /// Properties, view and nested components as JSON
    Json,
}

#[derive(Parser)]
#[command(name = "bender")]
#[command(about = "bender - check, resolve and drive declarative component libraries")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses RUST_LOG, then the config file value
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/bender/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Level requested on the command line, if any
    pub fn level_override(&self) -> Option<LevelFilter> {
        match (self.log_level, self.verbose) {
            (Some(level), _) => Some(level.into()),
            (None, true) => Some(LevelFilter::DEBUG),
            (None, false) => None,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve every component of a library and report failures
    Check {
        /// Library document (.json or .toml)
        library: PathBuf,
    },

    /// Resolve one component and print it
    Resolve {
        /// Library document (.json or .toml)
        library: PathBuf,

        /// Component to resolve
        component: String,

        /// Property override for the instantiation site (can be repeated)
        #[arg(short = 's', long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, Value)>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Outline)]
        format: OutputFormat,
    },

    /// Resolve one component, then write properties through its watches
    Update {
        /// Library document (.json or .toml)
        library: PathBuf,

        /// Component to resolve
        component: String,

        /// Property override for the instantiation site (can be repeated)
        #[arg(short = 's', long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, Value)>,

        /// Property write applied after resolution, in order (can be repeated)
        #[arg(short = 'w', long = "write", value_name = "KEY=VALUE", value_parser = parse_assignment, required = true)]
        write: Vec<(String, Value)>,
    },
}

/// Parse `KEY=VALUE`; the value is read as `true`, `false`, `null`, a number
/// or a string
pub fn parse_assignment(input: &str) -> Result<(String, Value), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{input}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in `{input}`"));
    }
    Ok((key.to_string(), Value::parse_literal(value)))
}
