//! Outcome of a boundary call
//!
//! Calls through a [`KindTable`](crate::table::KindTable) report failure in
//! an out-parameter rather than a return value, mirroring a call that
//! genuinely crosses a compilation boundary. Every result must be looked at:
//! dropping a failed result that nobody inspected is a bug in the caller.

use std::cell::Cell;
use std::fmt;

use crate::error::{BridgeError, Result};

#[must_use = "a boundary result must be verified"]
pub struct BoundaryResult {
    error: Option<String>,
    checked: Cell<bool>,
}

impl BoundaryResult {
    pub fn ok() -> Self {
        Self {
            error: None,
            checked: Cell::new(false),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            checked: Cell::new(false),
        }
    }

    /// Record a failure, replacing any earlier one
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.checked.set(false);
    }

    /// Record the error of `result`, if any
    pub fn record<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.fail(err.to_string());
                None
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        self.checked.set(true);
        self.error.is_none()
    }

    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }

    pub fn message(&self) -> Option<&str> {
        self.checked.set(true);
        self.error.as_deref()
    }

    pub fn verify(self) -> Result<()> {
        self.checked.set(true);
        match &self.error {
            None => Ok(()),
            Some(message) => Err(BridgeError::BoundaryOperationFailed(message.clone())),
        }
    }
}

impl Drop for BoundaryResult {
    fn drop(&mut self) {
        if self.checked.get() {
            return;
        }
        if let Some(message) = &self.error {
            tracing::error!(%message, "boundary result dropped without being checked");
            if !std::thread::panicking() {
                debug_assert!(false, "unchecked boundary error: {message}");
            }
        }
    }
}

impl fmt::Debug for BoundaryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundaryResult")
            .field("error", &self.error)
            .finish()
    }
}
