//! Cell encoding: a content identifier plus orthogonal modifier bits.
//!
//! The persisted form of a cell is a single `u32`: the low 12 bits hold the
//! content id, the bits above hold the modifier flags. In memory a cell keeps
//! the cover state (covered / hidden / cracked) as one enum so that two cover
//! flags can never be set at the same time.
//!
//! Two content ids are canonical stand-ins for a modifier applied to an empty
//! cell: [`Content::DIRT`] is `Empty | Covered` and [`Content::CRACKED_BLOCK`]
//! is `Empty | Cracked`. Every constructor and transformation normalizes
//! through these, so compare cells through the accessors rather than by raw
//! value.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Mask selecting the content part of a raw cell value.
pub const CONTENT_MASK: u32 = 0x0FFF;

/// First content id reserved for synthetic compound items (no sprite of
/// their own; see [`Cell::display_tile`]).
pub const SYNTHETIC_BASE: u16 = 0x800;

/// Enumerated item/block identifier stored in the low 12 bits of a cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(into = "u16", try_from = "u16")]
pub struct Content(u16);

impl Content {
    pub const EMPTY: Content = Content(0);
    /// Stand-in for `Empty | Covered`; the plain breakable block.
    pub const DIRT: Content = Content(1);
    /// Stand-in for `Empty | Cracked`.
    pub const CRACKED_BLOCK: Content = Content(2);
    pub const CONCRETE: Content = Content(3);
    pub const ASH: Content = Content(5);
    pub const MIRROR: Content = Content(6);
    pub const BAT: Content = Content(7);
    pub const PUZZLE: Content = Content(8);

    pub const KEY: Content = Content(16);
    pub const SEAL_KEY: Content = Content(17);

    pub const DOOR: Content = Content(32);
    pub const DOOR_OPEN: Content = Content(33);
    pub const WARP_DOOR: Content = Content(34);
    pub const WARP_DOOR_OPEN: Content = Content(35);
    pub const DARK_DOOR: Content = Content(36);
    pub const DARK_DOOR_OPEN: Content = Content(37);

    pub const BLUE_COIN: Content = Content(64);
    pub const BLUE_GEM: Content = Content(65);
    pub const BLUE_JEWEL: Content = Content(66);
    pub const BLUE_CHALICE: Content = Content(67);
    pub const GOLD_COIN: Content = Content(68);
    pub const GOLD_GEM: Content = Content(69);
    pub const GOLD_JEWEL: Content = Content(70);
    pub const GOLD_CHALICE: Content = Content(71);
    pub const RED_COIN: Content = Content(72);
    pub const RED_GEM: Content = Content(73);
    pub const RED_JEWEL: Content = Content(74);
    pub const RED_CHALICE: Content = Content(75);
    pub const BOOK: Content = Content(80);

    pub const REWARD_BAG: Content = Content(96);
    pub const REWARD_BAG_LARGE: Content = Content(97);
    pub const BELL: Content = Content(98);
    pub const SCROLL: Content = Content(99);
    pub const EXTRA_LIFE: Content = Content(100);

    pub const RABBIT: Content = Content(112);
    pub const POTION: Content = Content(113);
    pub const FAIRY: Content = Content(114);
    pub const JAR: Content = Content(115);

    /// Placeholder that turns into [`Content::RABBIT`] when revealed.
    pub const GRAY_RABBIT: Content = Content(SYNTHETIC_BASE);
    /// Breakable block drawn as concrete.
    pub const FAKE_CONCRETE: Content = Content(SYNTHETIC_BASE + 1);
    /// Closed door with no sprite.
    pub const INVISIBLE_DOOR: Content = Content(SYNTHETIC_BASE + 2);

    /// Build a content id, masking to 12 bits.
    pub const fn new(id: u16) -> Self {
        Self(id & CONTENT_MASK as u16)
    }

    /// Stable numeric id.
    pub const fn id(self) -> u16 {
        self.0
    }

    /// True for compound ids that must be mapped before drawing.
    pub const fn is_synthetic(self) -> bool {
        self.0 >= SYNTHETIC_BASE
    }

    /// Sprite used to draw this content when it is fully visible.
    pub fn tile(self) -> Content {
        match self {
            Content::GRAY_RABBIT => Content::RABBIT,
            Content::FAKE_CONCRETE => Content::CONCRETE,
            Content::INVISIBLE_DOOR => Content::EMPTY,
            other => other,
        }
    }
}

impl From<Content> for u16 {
    fn from(content: Content) -> Self {
        content.0
    }
}

impl TryFrom<u16> for Content {
    type Error = ContentRangeError;

    fn try_from(id: u16) -> Result<Self, Self::Error> {
        if u32::from(id) > CONTENT_MASK {
            return Err(ContentRangeError(id));
        }
        Ok(Content(id))
    }
}

/// A content id that does not fit in the 12-bit content field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("content id 0x{0:04X} does not fit in 12 bits")]
pub struct ContentRangeError(pub u16);

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags::bitflags! {
    /// Raw modifier bits as stored above the content id.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Modifier: u32 {
        const COVERED = 0x1000;
        const HIDDEN = 0x2000;
        const CRACKED = 0x4000;
        const FROZEN = 0x8000;
        const TEMPORARY = 0x1_0000;
    }
}

impl Modifier {
    /// The mutually exclusive cover group.
    pub const COVER_GROUP: Modifier = Modifier::COVERED
        .union(Modifier::HIDDEN)
        .union(Modifier::CRACKED);
}

/// Cover state of a cell. At most one cover applies at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cover {
    #[default]
    None,
    Covered,
    Hidden,
    Cracked,
}

impl Cover {
    fn bits(self) -> Modifier {
        match self {
            Cover::None => Modifier::empty(),
            Cover::Covered => Modifier::COVERED,
            Cover::Hidden => Modifier::HIDDEN,
            Cover::Cracked => Modifier::CRACKED,
        }
    }
}

/// Failure to decode a raw cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CellDecodeError {
    #[error("cell 0x{0:08X} sets more than one of covered/hidden/cracked")]
    ConflictingCover(u32),
    #[error("cell 0x{0:08X} sets unknown modifier bits")]
    UnknownModifier(u32),
}

/// One grid cell: content plus modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub struct Cell {
    content: Content,
    cover: Cover,
    frozen: bool,
    temporary: bool,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        content: Content::EMPTY,
        cover: Cover::None,
        frozen: false,
        temporary: false,
    };

    /// A fully visible cell holding `content`.
    pub fn new(content: Content) -> Self {
        Self {
            content,
            ..Self::EMPTY
        }
        .normalized()
    }

    /// `content` under the given cover.
    pub fn with_cover(content: Content, cover: Cover) -> Self {
        Self {
            content,
            cover,
            ..Self::EMPTY
        }
        .normalized()
    }

    pub fn content(self) -> Content {
        self.content
    }

    pub fn cover(self) -> Cover {
        self.cover
    }

    /// Modifier bits exactly as they would be persisted.
    pub fn modifier(self) -> Modifier {
        let mut bits = self.cover.bits();
        bits.set(Modifier::FROZEN, self.frozen);
        bits.set(Modifier::TEMPORARY, self.temporary);
        bits
    }

    /// Modifier bits with the stand-in contents read as their implied cover.
    pub fn effective_modifier(self) -> Modifier {
        let (_, cover) = self.expanded();
        let mut bits = self.modifier();
        bits.remove(Modifier::COVER_GROUP);
        bits | cover.bits()
    }

    /// Content with the stand-ins read as empty.
    pub fn effective_content(self) -> Content {
        self.expanded().0
    }

    /// Replace the content, keeping the (effective) modifier.
    pub fn with_content(self, content: Content) -> Self {
        let (_, cover) = self.expanded();
        Self {
            content,
            cover,
            ..self
        }
        .normalized()
    }

    pub fn to_cracked(self) -> Self {
        self.recovered(Cover::Cracked)
    }

    pub fn to_covered(self) -> Self {
        self.recovered(Cover::Covered)
    }

    pub fn to_hidden(self) -> Self {
        self.recovered(Cover::Hidden)
    }

    /// Strip every modifier; stand-ins become empty.
    pub fn to_visible(self) -> Self {
        let (content, _) = self.expanded();
        Self::new(content)
    }

    /// Remove only the cover, keeping frozen/temporary.
    pub fn uncovered(self) -> Self {
        self.recovered(Cover::None)
    }

    pub fn to_frozen(self) -> Self {
        Self {
            frozen: true,
            ..self
        }
    }

    pub fn thawed(self) -> Self {
        Self {
            frozen: false,
            ..self
        }
    }

    pub fn to_temporary(self) -> Self {
        Self {
            temporary: true,
            ..self
        }
    }

    pub fn settled(self) -> Self {
        Self {
            temporary: false,
            ..self
        }
    }

    pub fn is_covered(self) -> bool {
        self.effective_modifier().contains(Modifier::COVERED)
    }

    pub fn is_cracked(self) -> bool {
        self.effective_modifier().contains(Modifier::CRACKED)
    }

    pub fn is_hidden(self) -> bool {
        self.cover == Cover::Hidden
    }

    pub fn is_frozen(self) -> bool {
        self.frozen
    }

    pub fn is_temporary(self) -> bool {
        self.temporary
    }

    /// No modifier at all, stand-ins included.
    pub fn is_fully_visible(self) -> bool {
        self.effective_modifier().is_empty()
    }

    /// Plain empty space with nothing pending on it.
    pub fn is_empty_equivalent(self) -> bool {
        self.content == Content::EMPTY && self.modifier().is_empty()
    }

    /// Sprite to draw for this cell. Hidden cells draw nothing.
    pub fn display_tile(self) -> Content {
        if self.temporary && self.effective_content() == Content::EMPTY {
            return Content::DIRT;
        }
        match self.cover {
            Cover::Hidden => Content::EMPTY,
            Cover::Covered => Content::DIRT,
            Cover::Cracked => Content::CRACKED_BLOCK,
            Cover::None => self.content.tile(),
        }
    }

    /// Persisted 32-bit encoding.
    pub fn to_raw(self) -> u32 {
        u32::from(self.content.0) | self.modifier().bits()
    }

    /// Decode a persisted value, normalizing stand-ins.
    pub fn from_raw(raw: u32) -> Result<Self, CellDecodeError> {
        let bits = raw & !CONTENT_MASK;
        let modifier =
            Modifier::from_bits(bits).ok_or(CellDecodeError::UnknownModifier(raw))?;
        let cover_bits = modifier.intersection(Modifier::COVER_GROUP);
        let cover = if cover_bits.is_empty() {
            Cover::None
        } else if cover_bits == Modifier::COVERED {
            Cover::Covered
        } else if cover_bits == Modifier::HIDDEN {
            Cover::Hidden
        } else if cover_bits == Modifier::CRACKED {
            Cover::Cracked
        } else {
            return Err(CellDecodeError::ConflictingCover(raw));
        };
        Ok(Self {
            content: Content::new((raw & CONTENT_MASK) as u16),
            cover,
            frozen: modifier.contains(Modifier::FROZEN),
            temporary: modifier.contains(Modifier::TEMPORARY),
        }
        .normalized())
    }

    fn recovered(self, cover: Cover) -> Self {
        let (content, _) = self.expanded();
        Self {
            content,
            cover,
            ..self
        }
        .normalized()
    }

    /// Split stand-ins into `(Empty, cover)`.
    fn expanded(self) -> (Content, Cover) {
        match (self.content, self.cover) {
            (Content::DIRT, Cover::None) => (Content::EMPTY, Cover::Covered),
            (Content::CRACKED_BLOCK, Cover::None) => (Content::EMPTY, Cover::Cracked),
            (content, cover) => (content, cover),
        }
    }

    /// Fold `Empty | cover` back into the canonical stand-ins. A stand-in
    /// under an explicit cover reads as empty under that cover.
    fn normalized(self) -> Self {
        let content = match (self.content, self.cover) {
            (Content::DIRT | Content::CRACKED_BLOCK, cover) if cover != Cover::None => {
                Content::EMPTY
            }
            (content, _) => content,
        };
        let (content, cover) = match (content, self.cover) {
            (Content::EMPTY, Cover::Covered) => (Content::DIRT, Cover::None),
            (Content::EMPTY, Cover::Cracked) => (Content::CRACKED_BLOCK, Cover::None),
            (Content::EMPTY, Cover::Hidden) => (Content::EMPTY, Cover::None),
            other => other,
        };
        Self {
            content,
            cover,
            ..self
        }
    }
}

impl From<Cell> for u32 {
    fn from(cell: Cell) -> Self {
        cell.to_raw()
    }
}

impl TryFrom<u32> for Cell {
    type Error = CellDecodeError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Cell::from_raw(raw)
    }
}

impl From<Content> for Cell {
    fn from(content: Content) -> Self {
        Cell::new(content)
    }
}
