//! Inventory snapshots received from `request items` responses.

use bitflags::bitflags;

bitflags! {
    /// Status bits packed by the client into an item's `flags` field.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ItemFlags: u32 {
        /// The item has not been identified.
        const UNIDENTIFIED = 0x0200;
        /// The item is known to be magical.
        const MAGICAL = 0x0100;
        /// The item is cursed.
        const CURSED = 0x0080;
        /// The item is damned.
        const DAMNED = 0x0040;
        /// The item belongs to a shop and has not been paid for.
        const UNPAID = 0x0020;
        /// The player locked the item against dropping.
        const LOCKED = 0x0010;
        /// The item is applied (worn, wielded, readied).
        const APPLIED = 0x0008;
        /// The container is open.
        const OPEN = 0x0004;
        /// The container was open.
        const WAS_OPEN = 0x0002;
        /// The client marked the inventory as updated.
        const INV_UPDATED = 0x0001;
    }
}

/// One entry from an inventory, container, or floor listing.
///
/// Items are snapshots. Updating a flag produces a new value instead of
/// mutating the listing the item came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    tag: u32,
    num: u32,
    weight: i64,
    flags: ItemFlags,
    client_type: u32,
    name: String,
}

impl Item {
    /// Creates an item snapshot.
    #[must_use]
    pub fn new(
        tag: u32,
        num: u32,
        weight: i64,
        flags: ItemFlags,
        client_type: u32,
        name: impl Into<String>,
    ) -> Self {
        Self {
            tag,
            num,
            weight,
            flags,
            client_type,
            name: name.into(),
        }
    }

    /// Unique identifier used to refer to the item in commands.
    #[must_use]
    pub const fn tag(&self) -> u32 {
        self.tag
    }

    /// Stack size.
    #[must_use]
    pub const fn num(&self) -> u32 {
        self.num
    }

    /// Weight in grams.
    #[must_use]
    pub const fn weight(&self) -> i64 {
        self.weight
    }

    /// Raw status flags.
    #[must_use]
    pub const fn flags(&self) -> ItemFlags {
        self.flags
    }

    /// Client-defined type code; listings are sorted by it.
    #[must_use]
    pub const fn client_type(&self) -> u32 {
        self.client_type
    }

    /// Display name as sent by the client.
    ///
    /// Includes custom names and any stack description ("nine silver
    /// coins"); it is never re-pluralised here.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns a copy with `flag` set or cleared.
    #[must_use]
    pub fn with_flag(&self, flag: ItemFlags, value: bool) -> Self {
        let mut flags = self.flags;
        flags.set(flag, value);
        Self {
            flags,
            ..self.clone()
        }
    }

    /// Whether the item is unidentified.
    #[must_use]
    pub const fn unidentified(&self) -> bool {
        self.flags.contains(ItemFlags::UNIDENTIFIED)
    }

    /// Whether the item is magical.
    #[must_use]
    pub const fn magical(&self) -> bool {
        self.flags.contains(ItemFlags::MAGICAL)
    }

    /// Whether the item is cursed.
    #[must_use]
    pub const fn cursed(&self) -> bool {
        self.flags.contains(ItemFlags::CURSED)
    }

    /// Whether the item is damned.
    #[must_use]
    pub const fn damned(&self) -> bool {
        self.flags.contains(ItemFlags::DAMNED)
    }

    /// Whether the item is unpaid.
    #[must_use]
    pub const fn unpaid(&self) -> bool {
        self.flags.contains(ItemFlags::UNPAID)
    }

    /// Whether the item is locked.
    #[must_use]
    pub const fn locked(&self) -> bool {
        self.flags.contains(ItemFlags::LOCKED)
    }

    /// Whether the item is applied.
    #[must_use]
    pub const fn applied(&self) -> bool {
        self.flags.contains(ItemFlags::APPLIED)
    }

    /// Whether the container is open.
    #[must_use]
    pub const fn open(&self) -> bool {
        self.flags.contains(ItemFlags::OPEN)
    }

    /// Whether the container was open.
    #[must_use]
    pub const fn was_open(&self) -> bool {
        self.flags.contains(ItemFlags::WAS_OPEN)
    }

    /// Whether the inventory-updated bit is set.
    #[must_use]
    pub const fn inv_updated(&self) -> bool {
        self.flags.contains(ItemFlags::INV_UPDATED)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn locked_magic_ring() -> Item {
        Item::new(
            7,
            1,
            30,
            ItemFlags::from_bits_retain(0x0010 | 0x0100),
            101,
            "a ring",
        )
    }

    #[rstest]
    fn reports_only_the_bits_that_are_set(locked_magic_ring: Item) {
        assert!(locked_magic_ring.locked());
        assert!(locked_magic_ring.magical());
        assert!(!locked_magic_ring.unidentified());
        assert!(!locked_magic_ring.cursed());
        assert!(!locked_magic_ring.damned());
        assert!(!locked_magic_ring.unpaid());
        assert!(!locked_magic_ring.applied());
        assert!(!locked_magic_ring.open());
        assert!(!locked_magic_ring.was_open());
        assert!(!locked_magic_ring.inv_updated());
    }

    #[rstest]
    fn clearing_a_flag_leaves_the_rest(locked_magic_ring: Item) {
        let unlocked = locked_magic_ring.with_flag(ItemFlags::LOCKED, false);
        assert_eq!(unlocked.flags().bits(), 0x0100);
        assert!(!unlocked.locked());
        assert!(locked_magic_ring.locked(), "original snapshot is untouched");
    }

    #[rstest]
    fn setting_a_flag_adds_the_bit(locked_magic_ring: Item) {
        let applied = locked_magic_ring.with_flag(ItemFlags::APPLIED, true);
        assert!(applied.applied());
        assert_eq!(applied.flags().bits(), 0x0118);
    }

    #[rstest]
    fn unknown_bits_are_retained() {
        let item = Item::new(1, 1, 0, ItemFlags::from_bits_retain(0x8000), 0, "odd");
        assert_eq!(item.flags().bits(), 0x8000);
        assert!(!item.locked());
    }
}
