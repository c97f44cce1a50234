//! FIFO buffers for inbound lines the script consumes at its own pace.

use std::collections::VecDeque;

/// Unbounded first-in, first-out buffer of routed inbound lines.
///
/// Lines are never dropped; a script that never drains a channel lets it
/// grow for the life of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundChannel<T> {
    items: VecDeque<T>,
}

impl<T> InboundChannel<T> {
    /// Creates an empty channel.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Appends `item` at the back.
    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Removes and returns the oldest item.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Returns the oldest item without removing it.
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    /// Number of buffered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
