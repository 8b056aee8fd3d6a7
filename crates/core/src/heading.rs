//! Horizontal facing shared by start positions and spawned objects.
//!
//! Rooms are side-on, so only two headings exist. The numeric form is what
//! the authoring tools and legacy room data store.

use serde::{Deserialize, Serialize};

/// Left/right facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Heading {
    /// Facing towards decreasing x.
    Left = 0,
    /// Facing towards increasing x.
    Right = 1,
}

impl Heading {
    /// Default heading for freshly authored data.
    pub const DEFAULT: Self = Self::Right;

    /// Convert to a stable numeric representation.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Try to convert from the stable numeric representation.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }

    /// The opposite heading.
    pub const fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Unit step along x.
    pub const fn dx(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

impl Default for Heading {
    fn default() -> Self {
        Self::DEFAULT
    }
}
