//! Bridge configuration
//!
//! The runtime settings of `tether_core` plus the handle table layout:
//!
//! ```toml
//! [easing]
//! sample_count = 700
//!
//! [log]
//! filter = "tether_bridge=debug,info"
//!
//! [handles]
//! reserved = 1
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use tether_core::{ConfigError, RuntimeConfig};

use crate::handle::Handle;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BridgeConfig {
    #[serde(flatten)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub handles: HandleConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HandleConfig {
    /// Leading handles never handed out; handle 0 is always reserved
    #[serde(default = "default_reserved")]
    pub reserved: Handle,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            reserved: default_reserved(),
        }
    }
}

fn default_reserved() -> Handle {
    1
}

impl BridgeConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Reserved handle count, never below one
    pub fn reserved_handles(&self) -> Handle {
        self.handles.reserved.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = BridgeConfig::from_toml_str("").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.runtime.easing.sample_count, 700);
        assert_eq!(config.reserved_handles(), 1);
    }

    #[test]
    fn test_sections_are_read() {
        let config = BridgeConfig::from_toml_str(
            "[easing]\nsample_count = 64\n\n[log]\nfilter = \"debug\"\n\n[handles]\nreserved = 8\n",
        )
        .unwrap();
        assert_eq!(config.runtime.easing.sample_count, 64);
        assert_eq!(config.runtime.log.filter, "debug");
        assert_eq!(config.reserved_handles(), 8);
    }

    #[test]
    fn test_zero_reserved_keeps_null_handle() {
        let config = BridgeConfig::from_toml_str("[handles]\nreserved = 0\n").unwrap();
        assert_eq!(config.reserved_handles(), 1);
    }

    #[test]
    fn test_bad_document_is_parse_error() {
        assert!(matches!(
            BridgeConfig::from_toml_str("[handles]\nreserved = \"many\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            BridgeConfig::load("/nonexistent/tether.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
