//! Draw colours understood by the game client.
//!
//! The client renders only the twelve codes below; anything from 13 upwards
//! is rejected and drawn as plain black. Code 0 is not a colour but selects
//! the lower message panel, see [`DrawTarget::LowerPanel`].

/// Colour codes accepted by the `draw` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Color {
    /// Bold black.
    Black,
    /// Same colour as most readables.
    #[default]
    Navy,
    /// Same colour as shouts and level changes.
    Red,
    /// Same colour as tells.
    Orange,
    /// Same colour as chat.
    Blue,
    /// Darker orange.
    DarkOrange,
    /// Green.
    Green,
    /// Pale green.
    PaleGreen,
    /// Gray.
    Gray,
    /// Brown.
    Brown,
    /// Yellow.
    Yellow,
    /// Pale yellow.
    PaleYellow,
}

impl Color {
    /// Wire code for this colour.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Black => 1,
            Self::Navy => 2,
            Self::Red => 3,
            Self::Orange => 4,
            Self::Blue => 5,
            Self::DarkOrange => 6,
            Self::Green => 7,
            Self::PaleGreen => 8,
            Self::Gray => 9,
            Self::Brown => 10,
            Self::Yellow => 11,
            Self::PaleYellow => 12,
        }
    }
}

/// Where a drawn message ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawTarget {
    /// The main message window, in the given colour.
    Panel(Color),
    /// The lower, non-critical message panel.
    LowerPanel,
    /// The operator console (stderr). Never parsed by the game.
    Console,
}

impl Default for DrawTarget {
    fn default() -> Self {
        Self::Panel(Color::default())
    }
}

impl From<Color> for DrawTarget {
    fn from(color: Color) -> Self {
        Self::Panel(color)
    }
}

/// Lower panel code used in place of a colour.
pub(crate) const LOWER_PANEL_CODE: u8 = 0;
