//! Host entry points
//!
//! The engine reaches the outside world through exactly three calls:
//!
//! ```text
//! ┌──────────────────────────┐                 ┌─────────────────────────┐
//! │       BridgeEngine       │ dispatch_func.  │          Host           │
//! │  transforms / notifies   │ ──────────────▶ │  HandleTable<callback>  │
//! │   hold HostFunction      │ drop_function   │                         │
//! │                          │ ──────────────▶ │                         │
//! │  tracing → HostLogWriter │ log             │                         │
//! │                          │ ──────────────▶ │                         │
//! └──────────────────────────┘                 └─────────────────────────┘
//! ```
//!
//! [`LocalHost`] implements the host in-process, for tests and
//! single-process builds.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use crate::error::{BridgeError, Result};
use crate::handle::{Handle, HandleTable, NULL_HANDLE};
use crate::logging::LogSink;
use crate::wire::WireValue;

/// Entry points the engine calls on its host
pub trait Host {
    /// Invoke the callback behind `handle`
    fn dispatch_function(&self, handle: Handle, args: Vec<WireValue>) -> Result<WireValue>;

    /// The engine no longer references `handle`
    fn drop_function(&self, handle: Handle);

    fn log(&self, message: &str, is_error: bool);
}

/// Engine-side owner of a host callback handle.
///
/// Releases the handle through [`Host::drop_function`] when dropped.
pub struct HostFunction {
    handle: Handle,
    host: Rc<dyn Host>,
}

impl HostFunction {
    pub fn new(handle: Handle, host: Rc<dyn Host>) -> Self {
        Self { handle, host }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn call(&self, args: Vec<WireValue>) -> Result<WireValue> {
        self.host.dispatch_function(self.handle, args)
    }
}

impl Drop for HostFunction {
    fn drop(&mut self) {
        if self.handle != NULL_HANDLE {
            self.host.drop_function(self.handle);
        }
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HostFunction").field(&self.handle).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LocalHost
// ─────────────────────────────────────────────────────────────────────────────

/// Callback stored in a [`LocalHost`]
pub type HostCallback = Rc<dyn Fn(&[WireValue]) -> WireValue>;

/// One line received through [`Host::log`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub message: String,
    pub is_error: bool,
}

/// In-process host backed by a table of Rust closures
pub struct LocalHost {
    functions: RefCell<HandleTable<HostCallback>>,
    lines: Arc<Mutex<Vec<LogLine>>>,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::with_reserved(1)
    }

    pub fn with_reserved(reserved: Handle) -> Self {
        Self {
            functions: RefCell::new(HandleTable::with_reserved(reserved)),
            lines: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a callback and return the handle the engine will use
    pub fn register<F>(&self, function: F) -> Handle
    where
        F: Fn(&[WireValue]) -> WireValue + 'static,
    {
        let handle = self.functions.borrow_mut().register(Rc::new(function));
        tracing::debug!(handle, "registered host function");
        handle
    }

    /// Live callbacks
    pub fn live_functions(&self) -> usize {
        self.functions.borrow().len()
    }

    pub fn high_water_mark(&self) -> usize {
        self.functions.borrow().high_water_mark()
    }

    /// Lines logged so far
    pub fn logs(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Thread-safe sink feeding the same log as [`Host::log`]
    pub fn log_sink(&self) -> LogSink {
        let lines = self.lines.clone();
        Arc::new(move |message: &str, is_error: bool| push_line(&lines, message, is_error))
    }
}

fn push_line(lines: &Mutex<Vec<LogLine>>, message: &str, is_error: bool) {
    let line = LogLine {
        message: message.to_string(),
        is_error,
    };
    match lines.lock() {
        Ok(mut lines) => lines.push(line),
        Err(poisoned) => poisoned.into_inner().push(line),
    }
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for LocalHost {
    fn dispatch_function(&self, handle: Handle, args: Vec<WireValue>) -> Result<WireValue> {
        // cloned out so the callback may register or release other handles
        let function = self
            .functions
            .borrow()
            .get(handle)
            .cloned()
            .ok_or(BridgeError::UnknownHandle(handle as u64))?;
        Ok(function(&args))
    }

    fn drop_function(&self, handle: Handle) {
        let released = self.functions.borrow_mut().release(handle);
        match released {
            Some(_) => tracing::debug!(handle, "released host function"),
            None => tracing::warn!(handle, "release of unknown host function"),
        }
    }

    fn log(&self, message: &str, is_error: bool) {
        push_line(&self.lines, message, is_error);
    }
}

impl fmt::Debug for LocalHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalHost")
            .field("live_functions", &self.live_functions())
            .finish()
    }
}
