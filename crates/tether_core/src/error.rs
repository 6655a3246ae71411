//! Error types for tether_core

use thiserror::Error;

use crate::binding::BindingId;

/// Errors raised by binding graph operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// The binding is frozen and accepts no further writes or wiring
    #[error("binding {0:?} is frozen")]
    ReadonlyViolation(BindingId),

    /// External write to a binding whose value is derived from ancestors
    #[error("binding {0:?} is computed and cannot be set directly")]
    DirectWriteOnComputed(BindingId),

    /// Connecting would make the binding one of its own ancestors
    #[error("connecting binding {0:?} would create a cycle")]
    CycleRejected(BindingId),

    /// The id no longer refers to a live binding
    #[error("binding {0:?} does not exist")]
    UnknownBinding(BindingId),
}

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML or does not match the schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for binding graph operations
pub type Result<T> = std::result::Result<T, BindingError>;
