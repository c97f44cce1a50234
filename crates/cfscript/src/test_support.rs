//! In-memory transport doubles simulating the game client.
//!
//! [`Loopback`] hands out a [`LoopbackSource`] and [`LoopbackSink`] sharing
//! one simulated client. Everything the runtime writes is recorded. The
//! client can answer `request player`, any configured request, and every
//! acknowledged `issue` line with a `watch comc`, and tests can inject
//! arbitrary inbound lines.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use crate::error::TransportError;
use crate::transport::{LineSink, LineSource};

/// Reply sent to `request player` unless overridden.
pub const DEFAULT_PLAYER_REPLY: &str = "request player 1234 Player: Thor the wizard";

#[derive(Debug, Default)]
struct ClientState {
    inbound: VecDeque<String>,
    sent: Vec<String>,
    console: Vec<String>,
    replies: HashMap<String, Vec<String>>,
    auto_acknowledge: bool,
    held_acknowledgements: usize,
    closed: bool,
}

/// Handle on a simulated game client.
#[derive(Debug, Clone, Default)]
pub struct Loopback {
    state: Rc<RefCell<ClientState>>,
}

impl Loopback {
    /// Creates a client that answers `request player` and acknowledges every
    /// acknowledged command as soon as it is sent.
    #[must_use]
    pub fn new() -> Self {
        let loopback = Self::silent();
        loopback.reply_to("request player", [DEFAULT_PLAYER_REPLY]);
        loopback.state.borrow_mut().auto_acknowledge = true;
        loopback
    }

    /// Creates a client that never answers anything on its own.
    #[must_use]
    pub fn silent() -> Self {
        Self::default()
    }

    /// Source end handed to the runtime.
    #[must_use]
    pub fn source(&self) -> LoopbackSource {
        LoopbackSource {
            state: Rc::clone(&self.state),
        }
    }

    /// Sink end handed to the runtime.
    #[must_use]
    pub fn sink(&self) -> LoopbackSink {
        LoopbackSink {
            state: Rc::clone(&self.state),
        }
    }

    /// Answers every future `request` line equal to `request` with `lines`.
    pub fn reply_to<I, L>(&self, request: &str, lines: I)
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.state
            .borrow_mut()
            .replies
            .insert(request.to_owned(), lines.into_iter().map(Into::into).collect());
    }

    /// Turns automatic acknowledgements on or off.
    ///
    /// While off, acknowledgements are held back and can be released with
    /// [`Self::release_acknowledgements`].
    pub fn set_auto_acknowledge(&self, enabled: bool) {
        self.state.borrow_mut().auto_acknowledge = enabled;
    }

    /// Delivers up to `count` held acknowledgements. Returns how many were
    /// delivered.
    pub fn release_acknowledgements(&self, count: usize) -> usize {
        let mut state = self.state.borrow_mut();
        let released = count.min(state.held_acknowledgements);
        state.held_acknowledgements -= released;
        for _ in 0..released {
            state.inbound.push_back(String::from("watch comc"));
        }
        released
    }

    /// Queues a raw inbound line.
    pub fn push_inbound(&self, line: impl Into<String>) {
        self.state.borrow_mut().inbound.push_back(line.into());
    }

    /// Simulates the client closing the runtime's input.
    pub fn close(&self) {
        self.state.borrow_mut().closed = true;
    }

    /// Every protocol line written so far.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.state.borrow().sent.clone()
    }

    /// Removes and returns every protocol line written so far.
    #[must_use]
    pub fn take_sent(&self) -> Vec<String> {
        std::mem::take(&mut self.state.borrow_mut().sent)
    }

    /// Forgets every protocol line written so far.
    pub fn clear_sent(&self) {
        self.state.borrow_mut().sent.clear();
    }

    /// Every console line written so far.
    #[must_use]
    pub fn console(&self) -> Vec<String> {
        self.state.borrow().console.clone()
    }

    /// Inbound lines not yet read by the runtime.
    #[must_use]
    pub fn unread(&self) -> usize {
        self.state.borrow().inbound.len()
    }
}

/// Runtime-facing reader of a [`Loopback`].
#[derive(Debug)]
pub struct LoopbackSource {
    state: Rc<RefCell<ClientState>>,
}

impl LineSource for LoopbackSource {
    fn poll_line(&mut self) -> Option<String> {
        self.state.borrow_mut().inbound.pop_front()
    }

    fn wait_line(&mut self, timeout: Option<Duration>) -> Result<Option<String>, TransportError> {
        if let Some(line) = self.poll_line() {
            return Ok(Some(line));
        }
        // Nothing can arrive while the runtime is blocked, so an unbounded
        // wait would never finish.
        match timeout {
            Some(limit) if !self.state.borrow().closed => {
                thread::sleep(limit);
                Ok(self.poll_line())
            }
            _ => Err(TransportError::Closed),
        }
    }
}

/// Runtime-facing writer of a [`Loopback`].
#[derive(Debug)]
pub struct LoopbackSink {
    state: Rc<RefCell<ClientState>>,
}

impl LineSink for LoopbackSink {
    fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        let mut state = self.state.borrow_mut();
        state.sent.push(line.to_owned());
        if is_acknowledged_issue(line) {
            if state.auto_acknowledge {
                state.inbound.push_back(String::from("watch comc"));
            } else {
                state.held_acknowledgements += 1;
            }
        } else if let Some(reply) = state.replies.get(line).cloned() {
            state.inbound.extend(reply);
        }
        Ok(())
    }

    fn send_console(&mut self, line: &str) {
        self.state.borrow_mut().console.push(line.to_owned());
    }
}

/// Whether `line` is an `issue <count> 1 <text>` line.
fn is_acknowledged_issue(line: &str) -> bool {
    line.strip_prefix("issue ")
        .and_then(|rest| rest.split_whitespace().next())
        .is_some_and(|count| count.parse::<u32>().is_ok())
}
