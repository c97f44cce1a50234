//! Writes protocol lines to stdout and diagnostics to stderr.

use std::io::{self, Write};

use tracing::trace;

use super::{LineSink, WIRE_TARGET};
use crate::error::TransportError;

/// [`LineSink`] over the process's stdout (client) and stderr (console).
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioSink;

impl StdioSink {
    /// Creates the sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LineSink for StdioSink {
    fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(line.as_bytes())?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
        trace!(target: WIRE_TARGET, "Out: {line}");
        Ok(())
    }

    fn send_console(&mut self, line: &str) {
        let mut stderr = io::stderr().lock();
        // The console is best effort; a closed stderr must not stop a script.
        drop(writeln!(stderr, "{line}"));
        drop(stderr.flush());
    }
}
