//! Subscriber installation
//!
//! Filter precedence: command-line level, then `RUST_LOG`, then the
//! `[logging] level` of the config file.

use anyhow::{anyhow, Context, Result};
use bender_config::{LogFormat, LoggingConfig};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Build the filter for the given command-line override and config section
pub fn filter(level: Option<LevelFilter>, config: &LoggingConfig) -> Result<EnvFilter> {
    if let Some(level) = level {
        return Ok(EnvFilter::default().add_directive(level.into()));
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .with_context(|| format!("invalid log level `{}` in config", config.level))
}

/// Install the global subscriber; logs go to stderr so stdout stays parseable
pub fn init(level: Option<LevelFilter>, config: &LoggingConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(level, config)?)
        .with_writer(std::io::stderr);
    match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Text => builder.try_init(),
    }
    .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}
