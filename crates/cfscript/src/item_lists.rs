//! Bookkeeping for `request items` listings.
//!
//! A listing for a request type is assembled in an in-progress buffer and
//! only replaces the completed snapshot once its `end` marker arrives, so
//! readers never observe a half-received list.

use std::collections::HashMap;

use crate::error::ClientError;
use crate::item::Item;

/// Completed and in-progress item listings keyed by request type.
#[derive(Debug, Clone, Default)]
pub struct ItemLists {
    completed: HashMap<String, Vec<Item>>,
    in_progress: HashMap<String, Vec<Item>>,
}

impl ItemLists {
    /// Creates empty bookkeeping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts receiving a listing for `request_type`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestInProgress`] if a listing of that type is
    /// already being received.
    pub fn begin(&mut self, request_type: &str) -> Result<(), ClientError> {
        if self.in_progress.contains_key(request_type) {
            return Err(ClientError::RequestInProgress {
                request_type: request_type.to_owned(),
            });
        }
        self.in_progress.insert(request_type.to_owned(), Vec::new());
        Ok(())
    }

    /// Whether a listing of `request_type` is being received.
    #[must_use]
    pub fn is_in_progress(&self, request_type: &str) -> bool {
        self.in_progress.contains_key(request_type)
    }

    /// Appends `item` to the in-progress listing.
    ///
    /// Returns `false`, leaving state untouched, when no listing of that type
    /// is in progress.
    pub fn push(&mut self, request_type: &str, item: Item) -> bool {
        self.in_progress
            .get_mut(request_type)
            .map(|items| items.push(item))
            .is_some()
    }

    /// Publishes the in-progress listing as the completed snapshot.
    ///
    /// Returns `false` when no listing of that type is in progress.
    pub fn finish(&mut self, request_type: &str) -> bool {
        self.in_progress
            .remove(request_type)
            .map(|items| self.completed.insert(request_type.to_owned(), items))
            .is_some()
    }

    /// Last completed listing of `request_type`, if any.
    #[must_use]
    pub fn completed(&self, request_type: &str) -> Option<&[Item]> {
        self.completed.get(request_type).map(Vec::as_slice)
    }

    /// Whether a completed listing of `request_type` exists.
    #[must_use]
    pub fn has_items(&self, request_type: &str) -> bool {
        self.completed.contains_key(request_type)
    }

    /// Whether a completed listing exists and no newer one is being received.
    #[must_use]
    pub fn has_updated_items(&self, request_type: &str) -> bool {
        self.has_items(request_type) && !self.is_in_progress(request_type)
    }
}
