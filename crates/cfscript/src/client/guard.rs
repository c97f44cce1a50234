//! Process-wide ownership token for the stdio pair.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::error::ClientError;

use super::CLIENT_TARGET;

static CONNECTED: AtomicBool = AtomicBool::new(false);

/// Held by the one live [`ClientInterface`](super::ClientInterface).
///
/// Dropping the guard releases ownership so a later façade can be created.
#[derive(Debug)]
pub(super) struct ConnectionGuard {
    _private: (),
}

impl ConnectionGuard {
    pub(super) fn acquire() -> Result<Self, ClientError> {
        CONNECTED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ClientError::AlreadyConnected)?;
        debug!(target: CLIENT_TARGET, "client interface connected");
        Ok(Self { _private: () })
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        CONNECTED.store(false, Ordering::Release);
        debug!(target: CLIENT_TARGET, "client interface released");
    }
}
