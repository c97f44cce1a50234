//! The façade scripts drive.
//!
//! [`ClientInterface`] owns the transport, the pending-command tracker and the
//! input router, and exposes the operations a script calls: queueing and
//! waiting on commands, reading chat and item listings, watching stats and
//! drawing to the game window.
//!
//! Only [`ClientInterface::idle`] and the operations built on it block. The
//! `has_*` queries and [`ClientInterface::pump_events`] only process lines
//! that have already arrived.

mod guard;

use std::process;
use std::time::Duration;

use cfscript_config::Config;
use tracing::{debug, error, warn};

use crate::color::{Color, DrawTarget, LOWER_PANEL_CODE};
use crate::command::{Command, FLOOR_TAG};
use crate::error::{ClientError, ProtocolError};
use crate::item::Item;
use crate::player::{PLAYER_REQUESTS, PlayerInfo};
use crate::protocol::{self, INVENTORY, REQUEST_PLAYER, UNWATCH_STATS, WATCH_COMMANDS, WATCH_STATS};
use crate::router::{InputRouter, RouteError};
use crate::tracker::PendingCommandTracker;
use crate::transport::{LineSink, LineSource, StdioSink, ThreadedLineSource};

use self::guard::ConnectionGuard;

/// Tracing target for façade activity.
pub(crate) const CLIENT_TARGET: &str = "cfscript::client";

/// Exit status used by [`ClientInterface::fatal`].
pub const FATAL_EXIT_CODE: i32 = 1;

/// Single entry point for a script talking to the game client.
///
/// At most one instance may exist per process at a time; the stdio pair
/// cannot be shared between two trackers.
#[derive(Debug)]
pub struct ClientInterface<R = ThreadedLineSource, W = StdioSink> {
    source: R,
    sink: W,
    tracker: PendingCommandTracker,
    router: InputRouter,
    echo_errors_in_game: bool,
    _guard: ConnectionGuard,
}

impl ClientInterface {
    /// Connects over the process's stdin and stdout.
    ///
    /// Enables command acknowledgements and blocks until the client has
    /// reported the player's identity. Stdin can only be claimed once, so
    /// this succeeds at most once per process even after the first façade is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AlreadyConnected`] if another instance is alive,
    /// [`TransportError::InputClaimed`] (wrapped) if stdin was claimed
    /// earlier, or a transport error if the handshake cannot complete.
    ///
    /// [`TransportError::InputClaimed`]: crate::TransportError::InputClaimed
    pub fn connect(config: &Config) -> Result<Self, ClientError> {
        let guard = ConnectionGuard::acquire()?;
        let source = ThreadedLineSource::stdin()?;
        Self::assemble(guard, source, StdioSink::new(), config)
    }
}

impl<R, W> ClientInterface<R, W>
where
    R: LineSource,
    W: LineSink,
{
    /// Connects over an arbitrary transport and performs the startup
    /// handshake.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AlreadyConnected`] if another instance is alive,
    /// or a transport error if the handshake cannot complete.
    pub fn with_transport(source: R, sink: W, config: &Config) -> Result<Self, ClientError> {
        let guard = ConnectionGuard::acquire()?;
        Self::assemble(guard, source, sink, config)
    }

    fn assemble(
        guard: ConnectionGuard,
        source: R,
        sink: W,
        config: &Config,
    ) -> Result<Self, ClientError> {
        let mut client = Self {
            source,
            sink,
            tracker: PendingCommandTracker::new(config.target_pending_commands()),
            router: InputRouter::new(),
            echo_errors_in_game: config.echo_errors_in_game(),
            _guard: guard,
        };
        client.send(WATCH_COMMANDS)?;
        client.send(REQUEST_PLAYER)?;
        client.idle_until(|client| client.router.player().tag().is_some())?;
        debug!(
            target: CLIENT_TARGET,
            tag = client.router.player().tag(),
            target_pending = client.tracker.target(),
            "handshake complete"
        );
        Ok(client)
    }

    // Commands

    /// Queues `command` and dispatches what the pending target allows.
    /// Never blocks.
    ///
    /// # Errors
    ///
    /// Returns a transport error if a dispatch fails.
    pub fn queue_command(&mut self, command: impl Into<Command>) -> Result<(), ClientError> {
        self.tracker.enqueue(command.into(), &mut self.sink)?;
        Ok(())
    }

    /// Queues `command` and blocks until it has been sent to the server.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the client goes away while waiting.
    pub fn issue_command(&mut self, command: impl Into<Command>) -> Result<(), ClientError> {
        self.issue_command_bounded(command, 0)
    }

    /// Queues `command` and blocks until at most `max_queue_size` commands
    /// remain unsent.
    ///
    /// A non-zero bound keeps the client busy while the script computes
    /// between commands; call [`Self::pump_events`] regularly in that case.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the client goes away while waiting.
    pub fn issue_command_bounded(
        &mut self,
        command: impl Into<Command>,
        max_queue_size: usize,
    ) -> Result<(), ClientError> {
        self.queue_command(command)?;
        self.issue_queued_commands(max_queue_size)
    }

    /// Queues `command` and blocks until every command has resolved.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the client goes away while waiting.
    pub fn exec_command(&mut self, command: impl Into<Command>) -> Result<(), ClientError> {
        self.queue_command(command)?;
        self.flush_commands()
    }

    /// Blocks until at most `max_queue_size` commands remain unsent. Pending
    /// commands are not counted.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the client goes away while waiting.
    pub fn issue_queued_commands(&mut self, max_queue_size: usize) -> Result<(), ClientError> {
        self.idle_until(|client| client.tracker.queued_len() <= max_queue_size)
    }

    /// Blocks until the queue is empty and nothing is pending.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the client goes away while waiting.
    pub fn flush_commands(&mut self) -> Result<(), ClientError> {
        self.tracker.ensure_can_await(&mut self.sink)?;
        self.idle_until(|client| client.tracker.is_idle())
    }

    /// Whether any sent command might still be unresolved.
    #[must_use]
    pub fn has_any_pending_commands(&self) -> bool {
        self.tracker.upper_bound_pending() > 0
    }

    /// Whether the pending target has definitely been reached.
    #[must_use]
    pub fn has_target_pending_commands(&self) -> bool {
        self.tracker.has_target_pending()
    }

    /// Number of commands accepted but not yet sent.
    #[must_use]
    pub fn num_queued_commands(&self) -> usize {
        self.tracker.queued_len()
    }

    /// Changes how many commands may be in flight.
    ///
    /// Raising the target sends queued commands at once; lowering it never
    /// blocks.
    ///
    /// # Errors
    ///
    /// Returns a transport error if a dispatch fails.
    pub fn set_target_pending_commands(&mut self, target: usize) -> Result<(), ClientError> {
        self.tracker.set_target(target, &mut self.sink)?;
        Ok(())
    }

    /// Discards every unsent command. Already sent commands are unaffected.
    ///
    /// Returns how many commands were discarded.
    pub fn drop_all_queued_commands(&mut self) -> usize {
        self.tracker.drop_queued()
    }

    /// Builds a `move` command dropping `count` of `item` (0 drops all).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LockedItem`] if the item is locked.
    #[expect(
        clippy::unused_self,
        reason = "builders sit on the façade next to pickup_command"
    )]
    pub fn drop_command(&self, item: &Item, count: u32) -> Result<Command, ClientError> {
        Command::move_item(item, FLOOR_TAG, count)
    }

    /// Builds a `move` command picking `count` of `item` up from the floor.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LockedItem`] if the item is locked and
    /// [`ClientError::UnknownPlayer`] before the handshake has identified the
    /// player.
    pub fn pickup_command(&self, item: &Item, count: u32) -> Result<Command, ClientError> {
        let tag = self
            .router
            .player()
            .tag()
            .ok_or(ClientError::UnknownPlayer)?;
        Command::move_item(item, tag, count)
    }

    /// Builds a `move` command putting `count` of `item` into `container`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LockedItem`] if the item is locked.
    #[expect(
        clippy::unused_self,
        reason = "builders sit on the façade next to pickup_command"
    )]
    pub fn move_command(
        &self,
        item: &Item,
        container: &Item,
        count: u32,
    ) -> Result<Command, ClientError> {
        Command::move_item(item, container.tag(), count)
    }

    // Waiting

    /// Waits for input and processes everything that has arrived.
    ///
    /// Blocks until at least one line arrives or `timeout` elapses (`None`
    /// waits forever), then routes every buffered line. A timeout is not an
    /// error and leaves all state untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`](crate::TransportError::Closed) (wrapped) once the client has
    /// closed the input, or a write failure.
    pub fn idle(&mut self, timeout: Option<Duration>) -> Result<(), ClientError> {
        debug_assert!(self.tracker.invariant_holds());
        self.tracker.ensure_can_await(&mut self.sink)?;
        match self.source.wait_line(timeout) {
            Ok(Some(line)) => self.handle_line(&line)?,
            Ok(None) if timeout.is_none() => {
                warn!(target: CLIENT_TARGET, "waited indefinitely for input but none arrived");
            }
            Ok(None) => {}
            Err(error) => {
                warn!(target: CLIENT_TARGET, %error, "input from the client ended");
                return Err(error.into());
            }
        }
        self.pump_events()
    }

    /// Routes every line that has already arrived. Never blocks.
    ///
    /// # Errors
    ///
    /// Returns a transport error if an acknowledgement triggers a dispatch
    /// that fails.
    pub fn pump_events(&mut self) -> Result<(), ClientError> {
        while let Some(line) = self.source.poll_line() {
            self.handle_line(&line)?;
        }
        Ok(())
    }

    fn idle_until(&mut self, done: impl Fn(&Self) -> bool) -> Result<(), ClientError> {
        while !done(self) {
            self.idle(None)?;
        }
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> Result<(), ClientError> {
        match self.router.route(line, &mut self.tracker, &mut self.sink) {
            Ok(()) => Ok(()),
            Err(RouteError::Protocol(problem)) => {
                self.report_protocol_error(&problem);
                Ok(())
            }
            Err(RouteError::Transport(failure)) => Err(failure.into()),
        }
    }

    fn report_protocol_error(&mut self, problem: &ProtocolError) {
        if matches!(problem, ProtocolError::UnexpectedItems { .. }) {
            warn!(target: CLIENT_TARGET, %problem, "inbound line dropped");
            if self.echo_errors_in_game {
                self.draw_warning(&problem.to_string());
            }
        } else {
            error!(target: CLIENT_TARGET, %problem, "inbound line dropped");
            if self.echo_errors_in_game {
                self.draw_error(&problem.to_string());
            }
        }
    }

    // Chat and misc input

    /// Whether a `scripttell` message is waiting, after processing any lines
    /// that have already arrived.
    ///
    /// # Errors
    ///
    /// Returns a transport error if processing arrived lines fails.
    pub fn has_scripttell(&mut self) -> Result<bool, ClientError> {
        if self.router.scripttells().is_empty() {
            self.pump_events()?;
        }
        Ok(!self.router.scripttells().is_empty())
    }

    /// Removes and returns the next `scripttell` message, blocking until one
    /// arrives.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the client goes away while waiting.
    pub fn next_scripttell(&mut self) -> Result<String, ClientError> {
        loop {
            if let Some(message) = self.router.scripttells_mut().pop() {
                return Ok(message);
            }
            self.idle(None)?;
        }
    }

    /// Blocks until a `scripttell` message is waiting, without consuming it.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the client goes away while waiting.
    pub fn wait_for_scripttell(&mut self) -> Result<(), ClientError> {
        self.idle_until(|client| !client.router.scripttells().is_empty())
    }

    /// Whether an unclassified line is waiting.
    ///
    /// Lines that land here today may get their own channel later.
    ///
    /// # Errors
    ///
    /// Returns a transport error if processing arrived lines fails.
    pub fn has_misc_input(&mut self) -> Result<bool, ClientError> {
        if self.router.misc().is_empty() {
            self.pump_events()?;
        }
        Ok(!self.router.misc().is_empty())
    }

    /// Removes and returns the next unclassified line, blocking until one
    /// arrives.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the client goes away while waiting.
    pub fn next_misc_input(&mut self) -> Result<String, ClientError> {
        loop {
            if let Some(line) = self.router.misc_mut().pop() {
                return Ok(line);
            }
            self.idle(None)?;
        }
    }

    /// Blocks until an unclassified line is waiting, without consuming it.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the client goes away while waiting.
    pub fn wait_for_misc_input(&mut self) -> Result<(), ClientError> {
        self.idle_until(|client| !client.router.misc().is_empty())
    }

    // Item listings

    /// Asks for a fresh listing of `request_type` and returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestInProgress`] if a listing of that type
    /// is still arriving, or a transport error.
    pub fn request_items(&mut self, request_type: &str) -> Result<(), ClientError> {
        self.router.item_lists_mut().begin(request_type)?;
        self.send(&protocol::request_items_line(request_type))
    }

    /// Last completed listing of `request_type`.
    #[must_use]
    pub fn items(&self, request_type: &str) -> Option<&[Item]> {
        self.router.item_lists().completed(request_type)
    }

    /// Whether any completed listing of `request_type` exists, even if a
    /// newer one is still arriving.
    ///
    /// # Errors
    ///
    /// Returns a transport error if processing arrived lines fails.
    pub fn has_items(&mut self, request_type: &str) -> Result<bool, ClientError> {
        if !self.router.item_lists().has_items(request_type) {
            self.pump_events()?;
        }
        Ok(self.router.item_lists().has_items(request_type))
    }

    /// Whether the latest request for `request_type` has completed.
    ///
    /// # Errors
    ///
    /// Returns a transport error if processing arrived lines fails.
    pub fn has_updated_items(&mut self, request_type: &str) -> Result<bool, ClientError> {
        if !self.router.item_lists().has_updated_items(request_type) {
            self.pump_events()?;
        }
        Ok(self.router.item_lists().has_updated_items(request_type))
    }

    /// Requests `request_type` unless a request is already in flight, blocks
    /// until it completes, and returns a copy of the listing.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the client goes away while waiting.
    pub fn get_items(&mut self, request_type: &str) -> Result<Vec<Item>, ClientError> {
        if !self.router.item_lists().is_in_progress(request_type) {
            self.request_items(request_type)?;
        }
        self.wait_for_items(request_type)?;
        Ok(self.items(request_type).map(<[Item]>::to_vec).unwrap_or_default())
    }

    /// Blocks until the latest request for `request_type` has completed.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the client goes away while waiting.
    pub fn wait_for_items(&mut self, request_type: &str) -> Result<(), ClientError> {
        self.idle_until(|client| client.router.item_lists().has_updated_items(request_type))
    }

    /// Last completed inventory listing.
    #[must_use]
    pub fn inventory(&self) -> Option<&[Item]> {
        self.items(INVENTORY)
    }

    /// Asks for a fresh inventory listing.
    ///
    /// # Errors
    ///
    /// See [`Self::request_items`].
    pub fn request_inventory(&mut self) -> Result<(), ClientError> {
        self.request_items(INVENTORY)
    }

    /// Fetches the inventory, blocking until it arrives.
    ///
    /// # Errors
    ///
    /// See [`Self::get_items`].
    pub fn get_inventory(&mut self) -> Result<Vec<Item>, ClientError> {
        self.get_items(INVENTORY)
    }

    /// Whether any inventory listing has completed.
    ///
    /// # Errors
    ///
    /// See [`Self::has_items`].
    pub fn has_inventory(&mut self) -> Result<bool, ClientError> {
        self.has_items(INVENTORY)
    }

    /// Whether the latest inventory request has completed.
    ///
    /// # Errors
    ///
    /// See [`Self::has_updated_items`].
    pub fn has_updated_inventory(&mut self) -> Result<bool, ClientError> {
        self.has_updated_items(INVENTORY)
    }

    // Player

    /// What the script knows about its player.
    #[must_use]
    pub const fn player_info(&self) -> &PlayerInfo {
        self.router.player()
    }

    /// Subscribes to stat pushes after requesting every block once.
    ///
    /// With `wait_for_initial_values` the call blocks until every block has
    /// been answered; otherwise unanswered stats stay `None` for a while.
    ///
    /// # Errors
    ///
    /// Returns a transport error if a request cannot be sent or the client
    /// goes away while waiting.
    pub fn watch_stats(&mut self, wait_for_initial_values: bool) -> Result<(), ClientError> {
        for request in PLAYER_REQUESTS {
            self.send(&protocol::request_line(request))?;
        }
        self.send(WATCH_STATS)?;
        if wait_for_initial_values {
            self.idle_until(|client| client.router.player().has_all_stats())?;
        }
        Ok(())
    }

    /// Cancels stat pushes.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the line cannot be sent.
    pub fn unwatch_stats(&mut self) -> Result<(), ClientError> {
        self.send(UNWATCH_STATS)
    }

    // Drawing

    /// Shows `message` to the player, or writes it to the console.
    ///
    /// Drawing never fails; a write error is logged and otherwise ignored.
    /// The client strips leading spaces.
    pub fn draw(&mut self, message: &str, target: impl Into<DrawTarget>) {
        let code = match target.into() {
            DrawTarget::Console => {
                self.debug_out(message);
                return;
            }
            DrawTarget::LowerPanel => LOWER_PANEL_CODE,
            DrawTarget::Panel(color) => color.code(),
        };
        if let Err(error) = self.sink.send_line(&protocol::draw_line(code, message)) {
            warn!(target: CLIENT_TARGET, %error, "failed to draw message");
        }
    }

    /// Draws `WARNING: <message>` in orange.
    pub fn draw_warning(&mut self, message: &str) {
        self.draw(&format!("WARNING: {message}"), Color::Orange);
    }

    /// Draws `ERROR: <message>` in red.
    pub fn draw_error(&mut self, message: &str) {
        self.draw(&format!("ERROR: {message}"), Color::Red);
    }

    /// Writes `message` to the operator console.
    pub fn debug_out(&mut self, message: &str) {
        self.sink.send_console(message);
    }

    /// Draws `FATAL: <message>` in red and exits the process.
    pub fn fatal(&mut self, message: &str) -> ! {
        error!(target: CLIENT_TARGET, reason = message, "script aborted");
        self.draw(&format!("FATAL: {message}"), Color::Red);
        process::exit(FATAL_EXIT_CODE)
    }

    fn send(&mut self, line: &str) -> Result<(), ClientError> {
        self.sink.send_line(line)?;
        Ok(())
    }
}
