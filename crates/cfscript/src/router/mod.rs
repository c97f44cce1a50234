//! Routes classified inbound lines to the state they update.

use thiserror::Error;
use tracing::{debug, trace};

use crate::channel::InboundChannel;
use crate::error::{ProtocolError, TransportError};
use crate::item_lists::ItemLists;
use crate::player::PlayerInfo;
use crate::protocol::{self, InboundLine, ItemPayload};
use crate::tracker::PendingCommandTracker;
use crate::transport::{LineSink, WIRE_TARGET};

/// Tracing target for routing decisions.
const ROUTER_TARGET: &str = "cfscript::router";

/// Failure while routing one line.
#[derive(Debug, Clone, Error)]
pub enum RouteError {
    /// The line was malformed or unexpected and has been dropped.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// An acknowledgement let queued commands go out and the write failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Owner of everything inbound lines update, apart from the tracker.
#[derive(Debug, Default)]
pub struct InputRouter {
    player: PlayerInfo,
    item_lists: ItemLists,
    scripttells: InboundChannel<String>,
    misc: InboundChannel<String>,
}

impl InputRouter {
    /// Creates a router with empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies `line` and applies it.
    ///
    /// Acknowledgements go to `tracker`, which may dispatch queued commands
    /// through `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Protocol`] when the line is dropped and
    /// [`RouteError::Transport`] when a follow-up dispatch fails.
    pub fn route<S>(
        &mut self,
        line: &str,
        tracker: &mut PendingCommandTracker,
        sink: &mut S,
    ) -> Result<(), RouteError>
    where
        S: LineSink + ?Sized,
    {
        trace!(target: WIRE_TARGET, "In: {line}");
        match protocol::parse_line(line)? {
            InboundLine::Acknowledgement => tracker.on_acknowledgement(sink)?,
            InboundLine::StatUpdate { name, value } => {
                self.player.set_stat(name, value);
            }
            InboundLine::Ignored => {}
            InboundLine::PlayerIdentity { tag, title } => {
                self.player.set_identity(tag, title);
                debug!(target: ROUTER_TARGET, tag, title = self.player.title(), "player identified");
            }
            InboundLine::StatBlock { block, values } => {
                self.player.set_block(block, &values);
            }
            InboundLine::ItemList { request_type, rest } => {
                self.route_items(request_type, rest)?;
            }
            InboundLine::Scripttell(message) => self.scripttells.push(message.to_owned()),
            InboundLine::Misc(other) => self.misc.push(other.to_owned()),
        }
        Ok(())
    }

    fn route_items(&mut self, request_type: &str, rest: &str) -> Result<(), ProtocolError> {
        // Lists are never started lazily; a partial or duplicated list would
        // be worse than none.
        if !self.item_lists.is_in_progress(request_type) {
            return Err(ProtocolError::UnexpectedItems {
                request_type: request_type.to_owned(),
                rest: rest.to_owned(),
            });
        }
        match protocol::parse_item_payload(request_type, rest)? {
            ItemPayload::Entry(item) => {
                self.item_lists.push(request_type, item);
            }
            ItemPayload::End => {
                self.item_lists.finish(request_type);
                debug!(target: ROUTER_TARGET, request_type, "item list complete");
            }
        }
        Ok(())
    }

    /// Player snapshot.
    #[must_use]
    pub const fn player(&self) -> &PlayerInfo {
        &self.player
    }

    /// Item list bookkeeping.
    #[must_use]
    pub const fn item_lists(&self) -> &ItemLists {
        &self.item_lists
    }

    /// Mutable item list bookkeeping, used to open new requests.
    pub const fn item_lists_mut(&mut self) -> &mut ItemLists {
        &mut self.item_lists
    }

    /// Unconsumed `scripttell` messages.
    #[must_use]
    pub const fn scripttells(&self) -> &InboundChannel<String> {
        &self.scripttells
    }

    /// Mutable access to the `scripttell` channel.
    pub const fn scripttells_mut(&mut self) -> &mut InboundChannel<String> {
        &mut self.scripttells
    }

    /// Unconsumed lines nothing else claimed.
    #[must_use]
    pub const fn misc(&self) -> &InboundChannel<String> {
        &self.misc
    }

    /// Mutable access to the misc channel.
    pub const fn misc_mut(&mut self) -> &mut InboundChannel<String> {
        &mut self.misc
    }
}
