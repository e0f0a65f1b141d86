//! Logging configuration
//!
//! Level and output format for the tracing subscriber installed by the CLI.

use serde::{Deserialize, Serialize};

/// Logging section of the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `bender_core=debug`
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    /// Single-line JSON objects
    #[serde(rename = "json")]
    Json,
    /// Compact human-readable lines
    #[serde(rename = "text")]
    Text,
    /// Multi-line human-readable output
    #[serde(rename = "pretty")]
    Pretty,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_section_keeps_defaults() {
        let config: LoggingConfig = toml::from_str(r#"format = "json""#).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "warn");
    }
}
