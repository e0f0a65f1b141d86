//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for the expected schema
    #[error("Failed to parse config file {path}: {message}")]
    Parse {
        /// File that was being parsed
        path: PathBuf,
        /// Parser diagnostic
        message: String,
    },

    /// A field holds a value outside its accepted range
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Dotted field path, e.g. `resolver.max_prototype_depth`
        field: String,
        /// Offending value or explanation
        value: String,
    },
}

/// Specialized Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::invalid_value("resolver.max_prototype_depth", "0");
        assert_eq!(
            err.to_string(),
            "Invalid value for resolver.max_prototype_depth: 0"
        );

        let err = ConfigError::Parse {
            path: PathBuf::from("config.toml"),
            message: "expected a table".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse config file config.toml: expected a table"
        );
    }
}
