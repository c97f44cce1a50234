//! Client-side automation core for CrossFire scripts.
//!
//! A script runs as a child of the game client and talks to it over stdio:
//! it writes commands and queries to stdout and reads acknowledgements, stat
//! pushes, item listings and chat from stdin. This crate provides the pieces
//! every script needs on top of that line protocol:
//!
//! - [`Command`] and its wire encoding;
//! - [`PendingCommandTracker`], which paces dispatch so a bounded number of
//!   commands is in flight and keeps count of completions even though the
//!   server never acknowledges some commands;
//! - [`InputRouter`], which classifies inbound lines and updates
//!   [`PlayerInfo`], item listings and the chat channels;
//! - [`ClientInterface`], the façade scripts drive, which owns the transport
//!   and is the only place a script blocks.
//!
//! Configuration comes from [`cfscript_config`]; diagnostics go to stderr
//! through [`telemetry`].
//!
//! ```no_run
//! use cfscript::{ClientInterface, Color};
//! use cfscript_config::Config;
//!
//! # fn main() -> Result<(), cfscript::ClientError> {
//! let mut client = ClientInterface::connect(&Config::default())?;
//! client.issue_command("east")?;
//! client.draw("walked east", Color::Green);
//! client.flush_commands()?;
//! # Ok(())
//! # }
//! ```

mod channel;
mod client;
mod color;
mod command;
mod error;
mod item;
mod item_lists;
mod player;
pub mod protocol;
mod router;
pub mod telemetry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
mod tracker;
pub mod transport;

pub use channel::InboundChannel;
pub use client::{ClientInterface, FATAL_EXIT_CODE};
pub use color::{Color, DrawTarget};
pub use command::{Command, DEFAULT_COUNT, FLOOR_TAG, NO_OP_TEXT};
pub use error::{ClientError, ProtocolError, TransportError};
pub use item::{Item, ItemFlags};
pub use item_lists::ItemLists;
pub use player::{AbilityScores, CombatStats, PlayerIdentity, PlayerInfo, StatBlock, VitalStats};
pub use router::{InputRouter, RouteError};
pub use tracker::PendingCommandTracker;
pub use transport::{LineSink, LineSource, StdioSink, ThreadedLineSource};

#[cfg(test)]
mod tests;
