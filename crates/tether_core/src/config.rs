//! Runtime configuration
//!
//! Loaded from TOML; every field has a default, so an empty document is a
//! valid configuration.
//!
//! ```toml
//! [easing]
//! sample_count = 700
//!
//! [log]
//! filter = "tether_core=debug,info"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::transition::DEFAULT_SAMPLE_COUNT;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub easing: EasingConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Bezier easing tables
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EasingConfig {
    /// Buckets per bezier sample table
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
}

impl Default for EasingConfig {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
        }
    }
}

fn default_sample_count() -> usize {
    DEFAULT_SAMPLE_COUNT
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogConfig {
    /// `EnvFilter` directive string
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

impl RuntimeConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }
}
