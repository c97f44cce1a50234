//! Background-thread line reader.
//!
//! Polling a line-buffered pipe for readiness is unreliable: the descriptor
//! can look empty while the reader's buffer already holds a full line. A
//! dedicated thread performs blocking reads instead and hands each line over
//! a channel, which supports both a non-blocking poll and a bounded wait.

use std::io::{self, BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::{LineSource, chomp};
use crate::error::TransportError;

/// Tracing target for the reader thread.
const INPUT_TARGET: &str = "cfscript::input";

/// Set by the first stdin reader and never cleared.
static STDIN_CLAIMED: AtomicBool = AtomicBool::new(false);

/// [`LineSource`] fed by a reader thread.
///
/// The thread does no protocol work; it only buffers raw lines in arrival
/// order. It exits at end of input or on a read error, after which the
/// source reports [`TransportError::Closed`] once drained.
#[derive(Debug)]
pub struct ThreadedLineSource {
    lines: Receiver<String>,
}

impl ThreadedLineSource {
    /// Spawns a reader over `reader`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the reader thread cannot be spawned.
    pub fn spawn<R>(reader: R) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (sender, lines) = mpsc::channel();
        thread::Builder::new()
            .name(String::from("cfscript-stdin"))
            .spawn(move || read_lines(reader, &sender))?;
        Ok(Self { lines })
    }

    /// Spawns a reader over the process's standard input.
    ///
    /// Succeeds at most once per process. Dropping the source does not stop
    /// its thread, which keeps blocking on stdin until the process exits.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InputClaimed`] if stdin already has a
    /// reader, or [`TransportError::Io`] if the thread cannot be spawned.
    pub fn stdin() -> Result<Self, TransportError> {
        claim_once(&STDIN_CLAIMED)?;
        Self::spawn(BufReader::new(io::stdin())).map_err(|error| {
            STDIN_CLAIMED.store(false, Ordering::Release);
            TransportError::from(error)
        })
    }
}

fn claim_once(flag: &AtomicBool) -> Result<(), TransportError> {
    if flag.swap(true, Ordering::AcqRel) {
        return Err(TransportError::InputClaimed);
    }
    Ok(())
}

fn read_lines<R: BufRead>(mut reader: R, sender: &mpsc::Sender<String>) {
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                debug!(target: INPUT_TARGET, "input stream reached end of file");
                return;
            }
            Ok(_) => {
                chomp(&mut line);
                if sender.send(line).is_err() {
                    // The source was dropped; nobody is listening any more.
                    return;
                }
            }
            Err(error) => {
                warn!(target: INPUT_TARGET, %error, "failed to read from input stream");
                return;
            }
        }
    }
}

impl LineSource for ThreadedLineSource {
    fn poll_line(&mut self) -> Option<String> {
        match self.lines.try_recv() {
            Ok(line) => Some(line),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    fn wait_line(&mut self, timeout: Option<Duration>) -> Result<Option<String>, TransportError> {
        let Some(limit) = timeout else {
            return self
                .lines
                .recv()
                .map(Some)
                .map_err(|_| TransportError::Closed);
        };
        match self.lines.recv_timeout(limit) {
            Ok(line) => Ok(Some(line)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Closed),
        }
    }
}
