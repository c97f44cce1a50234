//! Stdio transport shared with the game client.
//!
//! The runtime talks to the client through two seams. [`LineSource`] yields
//! whole inbound lines and can be polled or awaited with a timeout;
//! [`LineSink`] writes protocol lines and operator diagnostics. The
//! production implementations wrap the process's stdin, stdout and stderr,
//! and tests substitute an in-memory loopback.

mod input;
mod output;

use std::time::Duration;

use crate::error::TransportError;

pub use self::input::ThreadedLineSource;
pub use self::output::StdioSink;

/// Tracing target for raw protocol traffic.
pub(crate) const WIRE_TARGET: &str = "cfscript::wire";

/// Source of whole inbound lines with the line terminator removed.
pub trait LineSource {
    /// Returns the next buffered line without blocking.
    ///
    /// `None` means nothing has arrived yet, or the stream is closed.
    fn poll_line(&mut self) -> Option<String>;

    /// Waits up to `timeout` (forever with `None`) for the next line.
    ///
    /// Returns `Ok(None)` if the timeout elapsed first.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] once the stream has ended and every
    /// buffered line has been returned.
    fn wait_line(&mut self, timeout: Option<Duration>) -> Result<Option<String>, TransportError>;
}

/// Destination for protocol lines and operator diagnostics.
pub trait LineSink {
    /// Writes one protocol line to the client and flushes it.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] if the client can no longer be written
    /// to.
    fn send_line(&mut self, line: &str) -> Result<(), TransportError>;

    /// Writes one line to the operator console. Failures are swallowed.
    fn send_console(&mut self, line: &str);
}

impl<T: LineSource + ?Sized> LineSource for Box<T> {
    fn poll_line(&mut self) -> Option<String> {
        (**self).poll_line()
    }

    fn wait_line(&mut self, timeout: Option<Duration>) -> Result<Option<String>, TransportError> {
        (**self).wait_line(timeout)
    }
}

impl<T: LineSink + ?Sized> LineSink for Box<T> {
    fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        (**self).send_line(line)
    }

    fn send_console(&mut self, line: &str) {
        (**self).send_console(line);
    }
}

/// Strips one trailing `\n` and an optional `\r` before it.
pub(crate) fn chomp(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}
