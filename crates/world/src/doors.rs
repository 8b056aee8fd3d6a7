//! Door/key linkage: which keys open which doors, door opening, and removal
//! of keys whose doors are all open.

use crate::cell::{Cell, Content};
use crate::events::{EffectKind, RoomEvent};
use crate::grid::{Grid, GridPos};
use crate::session::SessionContext;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Closed door contents paired with their opened counterparts.
const DOOR_PAIRS: [(Content, Content); 4] = [
    (Content::DOOR, Content::DOOR_OPEN),
    (Content::WARP_DOOR, Content::WARP_DOOR_OPEN),
    (Content::DARK_DOOR, Content::DARK_DOOR_OPEN),
    (Content::INVISIBLE_DOOR, Content::DOOR_OPEN),
];

/// Any door content, open or closed.
pub fn is_door_at_all(content: Content) -> bool {
    DOOR_PAIRS
        .iter()
        .any(|&(closed, open)| content == closed || content == open)
}

/// Closed door contents only.
pub fn is_closed_door(content: Content) -> bool {
    opened_variant(content).is_some()
}

/// Content a closed door turns into when opened.
pub fn opened_variant(content: Content) -> Option<Content> {
    DOOR_PAIRS
        .iter()
        .find(|&&(closed, _)| closed == content)
        .map(|&(_, open)| open)
}

/// Any key content.
pub fn is_key_at_all(content: Content) -> bool {
    matches!(content, Content::KEY | Content::SEAL_KEY)
}

/// One key → door link. A key may link to many doors and a door may be
/// linked from many keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KeyInfo {
    pub key: GridPos,
    pub door: GridPos,
}

impl KeyInfo {
    pub fn new(key: GridPos, door: GridPos) -> Self {
        Self { key, door }
    }

    /// Both ends must be set (the origin is the unset sentinel).
    pub fn is_valid(&self) -> bool {
        !self.key.is_origin() && !self.door.is_origin()
    }
}

/// What walking through a door does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DoorKind {
    /// Leaves to the destination room.
    #[default]
    Exit,
    /// Warps within the room.
    Warp,
    /// Warps when a warp target is active, exits otherwise.
    Both,
}

/// Authoring data attached to a door cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorInfo {
    pub pos: GridPos,
    pub dest_room: u16,
    pub warp: GridPos,
    pub kind: DoorKind,
    pub show_room_number: bool,
    pub alt_star: bool,
}

impl DoorInfo {
    pub fn new(pos: GridPos) -> Self {
        Self {
            pos,
            ..Self::default()
        }
    }
}

/// Key links and door data for one room.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorGraph {
    pub keys: Vec<KeyInfo>,
    pub doors: Vec<DoorInfo>,
}

impl DoorGraph {
    /// Link `key` to `door`. Duplicate links are ignored.
    pub fn link_key(&mut self, key: GridPos, door: GridPos) {
        let info = KeyInfo::new(key, door);
        if !self.keys.contains(&info) {
            self.keys.push(info);
        }
    }

    /// Remove the `key` → `door` link, returning whether it existed.
    pub fn unlink_key(&mut self, key: GridPos, door: GridPos) -> bool {
        let before = self.keys.len();
        self.keys.retain(|info| *info != KeyInfo::new(key, door));
        self.keys.len() != before
    }

    /// Door data for `pos`, if the cell there is still a door.
    pub fn door_info(&self, grid: &Grid, pos: GridPos) -> Option<&DoorInfo> {
        let pos = grid.wrap(pos);
        if !is_door_at_all(grid.get(pos).content()) {
            return None;
        }
        self.doors.iter().find(|info| info.pos == pos)
    }

    /// Door data for `pos`, created on first use. `None` if the cell is not
    /// a door.
    pub fn door_info_mut(&mut self, grid: &Grid, pos: GridPos) -> Option<&mut DoorInfo> {
        let pos = grid.wrap(pos);
        if !is_door_at_all(grid.get(pos).content()) {
            return None;
        }
        let idx = match self.doors.iter().position(|info| info.pos == pos) {
            Some(idx) => idx,
            None => {
                self.doors.push(DoorInfo::new(pos));
                self.doors.len() - 1
            }
        };
        self.doors.get_mut(idx)
    }

    /// Doors opened by the key at `key_pos`: its explicit links if it has
    /// any, otherwise every door in the room.
    pub fn find_doors_for_key(&self, grid: &Grid, key_pos: GridPos) -> Vec<GridPos> {
        let key_pos = grid.wrap(key_pos);
        let mut linked: Vec<GridPos> = self
            .keys
            .iter()
            .filter(|info| info.is_valid() && grid.wrap(info.key) == key_pos)
            .map(|info| grid.wrap(info.door))
            .collect();
        if linked.is_empty() {
            return grid.find(|cell| is_door_at_all(cell.content()));
        }
        linked.sort();
        linked.dedup();
        linked
    }

    /// Drop door data for cells that stopped being doors and key links that
    /// are degenerate or dangling.
    pub fn prune_links(&mut self, grid: &Grid) {
        self.doors
            .retain(|info| is_door_at_all(grid.get(info.pos).content()));
        self.keys.retain(|info| {
            info.is_valid()
                && is_key_at_all(grid.get(info.key).content())
                && is_door_at_all(grid.get(info.door).content())
        });
    }

    /// Remove every key whose doors have all been opened this visit.
    /// Returns the removed key positions.
    pub fn check_for_orphaned_keys(
        &self,
        grid: &mut Grid,
        room: u16,
        session: &dyn SessionContext,
        show_effects: bool,
        events: &mut Vec<RoomEvent>,
    ) -> Vec<GridPos> {
        let keys = grid.find(|cell| is_key_at_all(cell.content()));
        let mut removed = Vec::new();
        for key in keys {
            let doors = self.find_doors_for_key(grid, key);
            // A key with nothing to open is never orphaned.
            if doors.is_empty() || !doors.iter().all(|&d| session.is_door_opened(room, d)) {
                continue;
            }
            let cell = grid.get(key);
            grid.set(key, cell.with_content(Content::EMPTY));
            if show_effects && cell.is_fully_visible() {
                events.push(RoomEvent::effect(EffectKind::KeyVanish, key));
            }
            debug!(room, %key, "removed orphaned key");
            removed.push(key);
        }
        removed
    }
}

/// Open the closed door at `pos`. Invisible doors become plain open doors
/// and lose their modifier; other doors keep it.
pub fn open_door(
    grid: &mut Grid,
    pos: GridPos,
    room: u16,
    session: &mut dyn SessionContext,
    events: &mut Vec<RoomEvent>,
) -> bool {
    let pos = grid.wrap(pos);
    let cell = grid.get(pos);
    let Some(open) = opened_variant(cell.content()) else {
        return false;
    };
    let next = if cell.content() == Content::INVISIBLE_DOOR {
        Cell::new(open)
    } else {
        cell.with_content(open)
    };
    grid.set(pos, next);
    session.record_door_opened(room, pos);
    if next.is_fully_visible() {
        events.push(RoomEvent::effect(EffectKind::HalfOpenDoor, pos));
    }
    debug!(room, %pos, "door opened");
    true
}
