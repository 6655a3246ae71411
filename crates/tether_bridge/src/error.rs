//! Error types for tether_bridge

use tether_core::{BindingError, ValueKind};
use thiserror::Error;

/// Errors raised at the engine boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// A wire value carries a tag this build does not know
    #[error("unrecognized wire tag {0}")]
    UnrecognizedTag(u8),

    /// A payload does not decode under its tag
    #[error("malformed {0} payload")]
    MalformedPayload(&'static str),

    /// A tag-checked unwrap found a different, known kind
    #[error("expected a {expected} value, found {found}")]
    KindMismatch { expected: ValueKind, found: ValueKind },

    /// A boundary call reported failure
    #[error("boundary operation failed: {0}")]
    BoundaryOperationFailed(String),

    /// A property or callback handle that is not live
    #[error("unknown handle {0}")]
    UnknownHandle(u64),

    /// Graph error raised behind the boundary
    #[error(transparent)]
    Binding(#[from] BindingError),
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
