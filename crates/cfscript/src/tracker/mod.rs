//! Command pacing and completion tracking.
//!
//! Commands move through three stages: queued (accepted but unsent), pending
//! (sent, not yet resolved) and done (forgotten). The server acknowledges
//! ordinary commands with `watch comc` in dispatch order but never
//! acknowledges special ones, so the tracker cannot simply count
//! acknowledgements. It instead keeps two bounds on the number of commands
//! still outstanding:
//!
//! - the upper bound is the length of the pending list;
//! - the lower bound ignores a leading run of unacknowledged commands, since
//!   nothing will ever tell us whether they finished.
//!
//! Dispatch is throttled on the lower bound. To stop long runs of special
//! commands from leaving the tracker blind, an inert acknowledged no-op is
//! slipped in before the run grows past `max(target - 1, 1)`.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::command::Command;
use crate::error::TransportError;
use crate::transport::LineSink;

/// Tracing target for pacing decisions.
const TRACKER_TARGET: &str = "cfscript::tracker";

/// Pending-command tracker owning the command queue.
///
/// Every public method leaves the tracker in a state where either the lower
/// bound has reached the target or the queue is empty.
#[derive(Debug, Clone)]
pub struct PendingCommandTracker {
    queue: VecDeque<Command>,
    pending: VecDeque<Command>,
    target: usize,
}

impl PendingCommandTracker {
    /// Creates an idle tracker that keeps up to `target` commands in flight.
    #[must_use]
    pub const fn new(target: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            pending: VecDeque::new(),
            target,
        }
    }

    /// Appends `command` to the queue and dispatches what the target allows.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if a dispatch fails. The unsent command stays
    /// at the front of the queue.
    pub fn enqueue<S>(&mut self, command: Command, sink: &mut S) -> Result<(), TransportError>
    where
        S: LineSink + ?Sized,
    {
        trace!(target: TRACKER_TARGET, command = command.text(), "queued");
        self.queue.push_back(command);
        self.pump(sink).map(drop)
    }

    /// Dispatches queued commands until the lower bound reaches the target or
    /// the queue runs dry.
    ///
    /// Returns the number of queued commands sent; injected no-ops are not
    /// counted.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if a dispatch fails. The unsent command stays
    /// at the front of the queue.
    pub fn pump<S>(&mut self, sink: &mut S) -> Result<usize, TransportError>
    where
        S: LineSink + ?Sized,
    {
        let max_unacknowledged_run = self.target.saturating_sub(1).max(1);
        let mut sent = 0;

        while self.lower_bound_pending() < self.target {
            let Some(next) = self.queue.pop_front() else {
                break;
            };

            if !next.is_acknowledged()
                && !self.has_acknowledged_pending()
                && self.pending.len() >= max_unacknowledged_run
            {
                if let Err(error) = self.send(Command::no_op(), sink) {
                    self.queue.push_front(next);
                    return Err(error);
                }
                debug!(
                    target: TRACKER_TARGET,
                    run = self.pending.len() - 1,
                    "no-op injected after unacknowledged run"
                );
            }

            // With a target of 1 a fresh no-op may already meet the target;
            // the real command still goes out so the queue makes progress.
            if let Err(error) = self.send(next.clone(), sink) {
                self.queue.push_front(next);
                return Err(error);
            }
            sent += 1;
        }

        debug_assert!(self.invariant_holds());
        debug_assert!(sent == 0 || self.lower_bound_pending() <= self.target.max(2));
        Ok(sent)
    }

    /// Resolves pending commands after a `watch comc` line.
    ///
    /// Pops the front of the pending list up to and including the first
    /// acknowledged command, then pumps. Acknowledgements arriving with
    /// nothing pending belong to commands the player typed and are ignored.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the follow-up dispatch fails.
    pub fn on_acknowledgement<S>(&mut self, sink: &mut S) -> Result<(), TransportError>
    where
        S: LineSink + ?Sized,
    {
        if self.pending.is_empty() {
            trace!(target: TRACKER_TARGET, "acknowledgement with nothing pending");
            return Ok(());
        }
        while let Some(resolved) = self.pending.pop_front() {
            if resolved.is_acknowledged() {
                break;
            }
        }
        self.pump(sink).map(drop)
    }

    /// Changes the target and dispatches anything it now allows.
    ///
    /// Lowering the target never recalls commands already sent.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if a dispatch fails.
    pub fn set_target<S>(&mut self, target: usize, sink: &mut S) -> Result<(), TransportError>
    where
        S: LineSink + ?Sized,
    {
        debug!(target: TRACKER_TARGET, from = self.target, to = target, "target changed");
        self.target = target;
        self.pump(sink).map(drop)
    }

    /// Discards every queued command without sending it. Returns how many
    /// were dropped.
    pub fn drop_queued(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        if dropped > 0 {
            debug!(target: TRACKER_TARGET, dropped, "queued commands discarded");
        }
        dropped
    }

    /// Sends a no-op if nothing pending would ever be acknowledged.
    ///
    /// Must run before any wait that could depend on pending commands
    /// resolving; otherwise the wait may never end.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the no-op cannot be sent.
    pub fn ensure_can_await<S>(&mut self, sink: &mut S) -> Result<(), TransportError>
    where
        S: LineSink + ?Sized,
    {
        if !self.can_safely_await() {
            debug!(target: TRACKER_TARGET, "no-op sent so the next wait can resolve");
            self.send(Command::no_op(), sink)?;
        }
        Ok(())
    }

    /// Whether waiting for the next acknowledgement is guaranteed to end.
    #[must_use]
    pub fn can_safely_await(&self) -> bool {
        self.pending.is_empty() || self.has_acknowledged_pending()
    }

    fn has_acknowledged_pending(&self) -> bool {
        self.pending.iter().any(Command::is_acknowledged)
    }

    /// Commands definitely still outstanding.
    #[must_use]
    pub fn lower_bound_pending(&self) -> usize {
        let uncertain = self
            .pending
            .iter()
            .take_while(|command| !command.is_acknowledged())
            .count();
        self.pending.len() - uncertain
    }

    /// Commands possibly still outstanding.
    #[must_use]
    pub fn upper_bound_pending(&self) -> usize {
        self.pending.len()
    }

    /// Whether the lower bound has reached the target.
    #[must_use]
    pub fn has_target_pending(&self) -> bool {
        self.lower_bound_pending() >= self.target
    }

    /// Number of commands waiting to be sent.
    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// Current target.
    #[must_use]
    pub const fn target(&self) -> usize {
        self.target
    }

    /// Whether every queued and pending command has resolved.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.pending.is_empty()
    }

    /// The pacing invariant: the queue only holds work the target forbids
    /// sending.
    #[must_use]
    pub fn invariant_holds(&self) -> bool {
        self.has_target_pending() || self.queue.is_empty()
    }

    fn send<S>(&mut self, command: Command, sink: &mut S) -> Result<(), TransportError>
    where
        S: LineSink + ?Sized,
    {
        sink.send_line(&command.encode())?;
        self.pending.push_back(command);
        Ok(())
    }
}

#[cfg(test)]
mod tests;
