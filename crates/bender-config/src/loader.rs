//! Configuration file loading
//!
//! Resolution order:
//! 1. An explicit path (must exist)
//! 2. `<config dir>/bender/config.toml` (used when present)
//! 3. Built-in defaults

use crate::{ConfigError, LoggingConfig, ResolverConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenderConfig {
    /// `[logging]` section
    pub logging: LoggingConfig,
    /// `[resolver]` section
    pub resolver: ResolverConfig,
}

/// Default location of the user configuration file, if a config dir exists
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bender").join("config.toml"))
}

impl BenderConfig {
    /// Load configuration from an explicit path or the default location
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file silently yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load_from_file(&path),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Load and validate a TOML configuration file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        config.resolver.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogFormat;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).expect("Failed to create file");
        file.write_all(contents.as_bytes())
            .expect("Failed to write file");
        path
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = BenderConfig::from_toml_str("").unwrap();
        assert_eq!(config, BenderConfig::default());
    }

    #[test]
    fn loads_sections_from_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = write_config(
            &dir,
            r#"
[logging]
level = "bender_core=debug"
format = "pretty"

[resolver]
max_prototype_depth = 8
bind_templates = false
"#,
        );

        let config = BenderConfig::load(Some(&path)).unwrap();
        assert_eq!(config.logging.level, "bender_core=debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.resolver.max_prototype_depth, 8);
        assert!(!config.resolver.bind_templates);
        assert!(config.resolver.strict_site_properties);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let err = BenderConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn parse_errors_carry_the_path() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = write_config(&dir, "[resolver]\nmax_prototype_depth = \"deep\"\n");
        match BenderConfig::load_from_file(&path).unwrap_err() {
            ConfigError::Parse { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = BenderConfig::from_toml_str("[resolver]\nmax_prototype_depth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
