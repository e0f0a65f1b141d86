//! # Bender Configuration Library
//!
//! Configuration for the Bender component engine and its command-line front end.
//!
//! ## Features
//!
//! - TOML configuration files with per-section defaults
//! - Logging settings (level and output format)
//! - Resolver knobs (prototype depth limit, site property checking,
//!   template bindings, watch activation)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bender_config::BenderConfig;
//!
//! let config = BenderConfig::load(None)?;
//! assert!(config.resolver.max_prototype_depth > 0);
//! # Ok::<(), bender_config::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod loader;
mod logging;
mod resolver;

pub use error::{ConfigError, ConfigResult};
pub use loader::{default_config_path, BenderConfig};
pub use logging::{LogFormat, LoggingConfig};
pub use resolver::ResolverConfig;
