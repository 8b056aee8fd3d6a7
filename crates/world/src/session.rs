//! Facts that outlive a single room visit.

use crate::cell::Content;
use crate::grid::GridPos;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Read/write view of the long-lived session the room rules consult.
///
/// Passed explicitly into the rule engine, door/key graph and spell
/// evaluator so each can be driven by a fake in tests.
pub trait SessionContext {
    /// Number of `item` currently in the player's inventory.
    fn inventory_count(&self, item: Content) -> u32;
    /// Whether spell `spell` of `room` has executed. Room 0 matches any room.
    fn has_executed_spell(&self, room: u16, spell: u32) -> bool;
    /// Record a spell execution.
    fn record_spell(&mut self, room: u16, spell: u32);
    /// Whether the door at `door` has been opened during the current visit.
    fn is_door_opened(&self, room: u16, door: GridPos) -> bool;
    /// Record a door opening for the current visit.
    fn record_door_opened(&mut self, room: u16, door: GridPos);
    /// Apprentice (easy) mode disables the frozen-block melt-through.
    fn is_apprentice(&self) -> bool;
}

/// In-memory session used by the headless driver and tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub inventory: BTreeMap<Content, u32>,
    pub spell_history: BTreeSet<(u16, u32)>,
    pub doors_opened: BTreeSet<(u16, GridPos)>,
    pub apprentice: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apprentice() -> Self {
        Self {
            apprentice: true,
            ..Self::default()
        }
    }

    pub fn add_item(&mut self, item: Content, count: u32) {
        *self.inventory.entry(item).or_insert(0) += count;
    }

    /// Forget door openings for `room`; called when the room is re-entered.
    pub fn clear_doors_for(&mut self, room: u16) {
        self.doors_opened.retain(|(r, _)| *r != room);
    }
}

impl SessionContext for Session {
    fn inventory_count(&self, item: Content) -> u32 {
        self.inventory.get(&item).copied().unwrap_or(0)
    }

    fn has_executed_spell(&self, room: u16, spell: u32) -> bool {
        if room == 0 {
            self.spell_history.iter().any(|&(_, id)| id == spell)
        } else {
            self.spell_history.contains(&(room, spell))
        }
    }

    fn record_spell(&mut self, room: u16, spell: u32) {
        self.spell_history.insert((room, spell));
    }

    fn is_door_opened(&self, room: u16, door: GridPos) -> bool {
        self.doors_opened.contains(&(room, door))
    }

    fn record_door_opened(&mut self, room: u16, door: GridPos) {
        self.doors_opened.insert((room, door));
    }

    fn is_apprentice(&self) -> bool {
        self.apprentice
    }
}
