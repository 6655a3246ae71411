//! Routing `tracing` output to the host
//!
//! The engine has no stdout of its own. [`install`] sets a fmt subscriber
//! whose writer hands every formatted line to the host's `log` entry point,
//! flagged as an error for WARN and ERROR events.

use std::io;
use std::sync::Arc;

use tracing::subscriber::DefaultGuard;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::BridgeConfig;
use crate::host::LocalHost;

/// Receiver of formatted log lines: `(message, is_error)`
pub type LogSink = Arc<dyn Fn(&str, bool) + Send + Sync>;

#[derive(Clone)]
pub struct HostLogMakeWriter {
    sink: LogSink,
}

impl HostLogMakeWriter {
    pub fn new(sink: LogSink) -> Self {
        Self { sink }
    }
}

impl<'a> MakeWriter<'a> for HostLogMakeWriter {
    type Writer = HostLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        HostLogWriter::new(self.sink.clone(), false)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        HostLogWriter::new(self.sink.clone(), *meta.level() <= Level::WARN)
    }
}

/// Buffers one event and sends it to the sink when dropped
pub struct HostLogWriter {
    sink: LogSink,
    buffer: Vec<u8>,
    is_error: bool,
}

impl HostLogWriter {
    fn new(sink: LogSink, is_error: bool) -> Self {
        Self {
            sink,
            buffer: Vec::new(),
            is_error,
        }
    }
}

impl io::Write for HostLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for HostLogWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buffer);
        let line = line.trim_end();
        if !line.is_empty() {
            (self.sink)(line, self.is_error);
        }
    }
}

/// Install a subscriber for the current thread until the guard drops.
///
/// An invalid `filter` falls back to `info`.
pub fn install(filter: &str, sink: LogSink) -> DefaultGuard {
    let (env_filter, rejected) = match EnvFilter::try_new(filter) {
        Ok(env_filter) => (env_filter, None),
        Err(err) => (EnvFilter::new("info"), Some(err)),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(HostLogMakeWriter::new(sink))
        .with_ansi(false)
        .without_time()
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);

    if let Some(err) = rejected {
        tracing::warn!(filter, %err, "invalid log filter, using info");
    }
    guard
}

/// Install using the configured filter, logging to `host`
pub fn install_for(config: &BridgeConfig, host: &LocalHost) -> DefaultGuard {
    install(&config.runtime.log.filter, host.log_sink())
}
