//! Error types raised by the script runtime.
//!
//! Errors are split by how they propagate. [`ProtocolError`] covers a single
//! malformed inbound line and never leaves the runtime: the line is logged
//! and dropped. [`TransportError`] and [`ClientError`] reach the calling
//! script because they mean the session cannot continue or the script broke
//! the runtime's contract. I/O errors are wrapped in `Arc` to satisfy the
//! `result_large_err` Clippy lint.

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Failures of the stdio pair shared with the game client.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The client closed our input and every buffered line was consumed.
    #[error("input stream from the client is closed")]
    Closed,

    /// Standard input already has a reader in this process.
    ///
    /// The reader thread stays blocked on stdin until the process exits, so
    /// a second reader would race it for lines.
    #[error("standard input already has a reader in this process")]
    InputClaimed,

    /// Writing a line to the client failed.
    #[error("failed to write to the client: {source}")]
    Io {
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

impl From<io::Error> for TransportError {
    fn from(source: io::Error) -> Self {
        Self::Io {
            source: Arc::new(source),
        }
    }
}

/// A malformed or unexpected inbound line.
///
/// Always recovered locally; the offending line is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// A fixed-arity response carried the wrong number of fields.
    #[error("\"{context}\": got {actual} fields, expected {expected}")]
    Arity {
        /// Response prefix the fields belong to.
        context: String,
        /// Number of fields the response must carry.
        expected: usize,
        /// Number of fields actually received.
        actual: usize,
    },

    /// A field that must be an integer was not.
    #[error("\"{context}\": field {field} is not an integer: {value:?}")]
    InvalidInteger {
        /// Response prefix the field belongs to.
        context: String,
        /// Name of the offending field.
        field: &'static str,
        /// Raw text that failed to parse.
        value: String,
    },

    /// A `request` response with an unrecognised subtype.
    #[error("unrecognized request \"{line}\"")]
    UnknownRequest {
        /// Remainder of the line after `request `.
        line: String,
    },

    /// A `request stat` response for a block this runtime does not track.
    #[error("unrecognized request stat \"{line}\"")]
    UnknownStatBlock {
        /// Remainder of the line after `request stat `.
        line: String,
    },

    /// An item line arrived for a request type with no request in flight.
    #[error("received unexpected request items {request_type} \"{rest}\"")]
    UnexpectedItems {
        /// Item request type, such as `inv`.
        request_type: String,
        /// Remainder of the line after the request type.
        rest: String,
    },
}

/// Errors surfaced to scripts by the client façade.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// A second façade was created while one is still alive.
    #[error("a client interface already owns this process's stdio")]
    AlreadyConnected,

    /// An item list of this type is already being received.
    #[error("already in the middle of requesting items {request_type}")]
    RequestInProgress {
        /// Item request type, such as `inv`.
        request_type: String,
    },

    /// A `move` command was requested for a locked item.
    #[error("refusing to move locked item {name} <tag={tag}>")]
    LockedItem {
        /// Display name of the item.
        name: String,
        /// Tag of the item.
        tag: u32,
    },

    /// The player's tag is needed but has not been received.
    #[error("player identity is not known yet")]
    UnknownPlayer,

    /// The transport failed or closed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
