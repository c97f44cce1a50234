//! Player commands and their wire encoding.
//!
//! Ordinary commands travel as `issue <count> 1 <text>` and are acknowledged
//! by a `watch comc` line once the server resolves them. Special commands
//! (`mark`, `apply`, `move`) use their own `issue` forms and are never
//! acknowledged, which the pending-command tracker has to compensate for.

use crate::error::ClientError;
use crate::item::Item;

/// Count used when a command does not specify one.
pub const DEFAULT_COUNT: u32 = 1;

/// Text of the inert direction command used as a no-op.
///
/// `stay` on its own is parsed as a direction, does nothing, and still earns
/// an acknowledgement.
pub const NO_OP_TEXT: &str = "stay";

/// Destination tag meaning "the floor" for `move`.
pub const FLOOR_TAG: u32 = 0;

/// A logical action to send to the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    text: String,
    count: u32,
    special: bool,
}

impl Command {
    /// Creates an ordinary, acknowledged command with the default count.
    ///
    /// # Example
    ///
    /// ```
    /// use cfscript::Command;
    ///
    /// let command = Command::new("get coin").with_count(0);
    /// assert_eq!(command.encode(), "issue 0 1 get coin");
    /// assert!(command.is_acknowledged());
    /// ```
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            count: DEFAULT_COUNT,
            special: false,
        }
    }

    /// Creates a special command that bypasses the count wrapper.
    ///
    /// The server never acknowledges special commands.
    #[must_use]
    pub fn special(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            count: DEFAULT_COUNT,
            special: true,
        }
    }

    /// The inert, acknowledged command injected to keep pacing sound.
    #[must_use]
    pub fn no_op() -> Self {
        Self::new(NO_OP_TEXT)
    }

    /// Returns the command with a different repeat count.
    ///
    /// 0 applies the command to every matching item.
    #[must_use]
    pub const fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Marks `item`.
    #[must_use]
    pub fn mark(item: &Item) -> Self {
        Self::special(format!("mark {}", item.tag()))
    }

    /// Applies `item`.
    #[must_use]
    pub fn apply(item: &Item) -> Self {
        Self::special(format!("apply {}", item.tag()))
    }

    /// Moves `count` of `item` into the object tagged `dest` (0 moves all).
    ///
    /// `move` ignores the locked flag on the server, so locked items are
    /// refused here. The check uses the script's snapshot and can race with
    /// the player locking the item afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LockedItem`] if the snapshot is locked.
    pub fn move_item(item: &Item, dest: u32, count: u32) -> Result<Self, ClientError> {
        if item.locked() {
            return Err(ClientError::LockedItem {
                name: item.name().to_owned(),
                tag: item.tag(),
            });
        }
        Ok(Self::special(format!(
            "move {dest} {} {count}",
            item.tag()
        )))
    }

    /// Command text without any wire wrapper.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Repeat count.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Whether the command uses a special `issue` form.
    #[must_use]
    pub const fn is_special(&self) -> bool {
        self.special
    }

    /// Whether the server will send a `watch comc` when it resolves.
    #[must_use]
    pub const fn is_acknowledged(&self) -> bool {
        !self.special
    }

    /// Exact line to send to the client.
    #[must_use]
    pub fn encode(&self) -> String {
        if self.special {
            format!("issue {}", self.text)
        } else {
            format!("issue {} 1 {}", self.count, self.text)
        }
    }
}

impl From<&str> for Command {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Command {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::item::ItemFlags;

    #[fixture]
    fn pouch() -> Item {
        Item::new(42, 1, 100, ItemFlags::empty(), 51, "a leather pouch")
    }

    #[rstest]
    #[case(Command::new("east"), "issue 1 1 east")]
    #[case(Command::new("drop silver coin").with_count(0), "issue 0 1 drop silver coin")]
    #[case(Command::new("get arrow").with_count(12), "issue 12 1 get arrow")]
    #[case(Command::no_op(), "issue 1 1 stay")]
    fn ordinary_commands_use_count_wrapper(#[case] command: Command, #[case] wire: &str) {
        assert_eq!(command.encode(), wire);
        assert!(command.is_acknowledged());
    }

    #[rstest]
    fn mark_and_apply_are_special(pouch: Item) {
        let mark = Command::mark(&pouch);
        let apply = Command::apply(&pouch);
        assert_eq!(mark.encode(), "issue mark 42");
        assert_eq!(apply.encode(), "issue apply 42");
        assert!(!mark.is_acknowledged());
        assert!(!apply.is_acknowledged());
    }

    #[rstest]
    fn move_encodes_destination_tag_and_count(pouch: Item) {
        let command = Command::move_item(&pouch, 900, 0).expect("unlocked item moves");
        assert_eq!(command.encode(), "issue move 900 42 0");
        assert!(command.is_special());
    }

    #[rstest]
    fn move_refuses_locked_items(pouch: Item) {
        let locked = pouch.with_flag(ItemFlags::LOCKED, true);
        let error = Command::move_item(&locked, FLOOR_TAG, 0).expect_err("locked item");
        assert!(matches!(error, ClientError::LockedItem { tag: 42, .. }));
    }

    #[rstest]
    fn strings_convert_into_ordinary_commands() {
        let command = Command::from("north");
        assert_eq!(command, Command::new("north"));
        assert_eq!(command.count(), DEFAULT_COUNT);
    }
}
