//! Resolver configuration

use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Knobs for component resolution and watch activation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Longest accepted prototype chain, the component itself included
    pub max_prototype_depth: usize,
    /// Reject instantiation-site properties that no component in the chain declares
    pub strict_site_properties: bool,
    /// Turn `{property}` placeholders in text and attribute values into watches
    pub bind_templates: bool,
    /// Run every watch once after a successful resolution
    pub activate_watches: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_prototype_depth: 64,
            strict_site_properties: true,
            bind_templates: true,
            activate_watches: true,
        }
    }
}

impl ResolverConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_prototype_depth == 0 {
            return Err(ConfigError::invalid_value(
                "resolver.max_prototype_depth",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}
