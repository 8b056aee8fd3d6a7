//! The persisted room: grid plus every authored list that belongs to it.

use crate::cell::Content;
use crate::doors::DoorGraph;
use crate::grid::{Grid, GridPos};
use crate::spawns::Spawn;
use crate::spells::{next_spell_id, Spell, SpellAction, Trigger};
use anyhow::{Context, Result};
use roomsim_core::Heading;
use serde::{Deserialize, Serialize};

/// Default next-room numbers for each exit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NextRooms {
    pub normal: u16,
    pub wing: u16,
    pub secret: u16,
}

/// Where a playable character appears, and which way it faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartPosition {
    pub pos: GridPos,
    pub facing: Heading,
}

impl Default for StartPosition {
    fn default() -> Self {
        Self {
            pos: GridPos::ORIGIN,
            facing: Heading::DEFAULT,
        }
    }
}

/// Camera limits in cells. A zero-sized box means "whole room".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraBounds {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl CameraBounds {
    pub fn is_unbounded(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Entering `pos` swaps the camera to `bounds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeTrigger {
    pub pos: GridPos,
    pub bounds: CameraBounds,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub bounds: CameraBounds,
    pub start: GridPos,
    pub resize_triggers: Vec<ResizeTrigger>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cosmetics {
    pub background_color: [u8; 3],
    pub foreground_color: [u8; 3],
    pub background_opacity: f32,
    pub foreground_opacity: f32,
    pub music: Option<String>,
    pub ambience: Option<String>,
}

impl Default for Cosmetics {
    fn default() -> Self {
        Self {
            background_color: [0, 0, 0],
            foreground_color: [255, 255, 255],
            background_opacity: 1.0,
            foreground_opacity: 1.0,
            music: None,
            ambience: None,
        }
    }
}

/// One room as authored. Created fresh per room entry and mutated in place
/// while the room runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub number: u16,
    /// Story / variant tag; the same room number may exist per story.
    pub story: u16,
    pub name: String,
    pub shrine: Option<u8>,
    pub next_rooms: NextRooms,
    pub starts: [StartPosition; 2],
    pub camera: Camera,
    pub grid: Grid,
    pub links: DoorGraph,
    pub spawns: Vec<Spawn>,
    pub spells: Vec<Spell>,
    pub random_items: Vec<Content>,
    pub cosmetics: Cosmetics,
}

impl Layout {
    pub fn new(number: u16, story: u16, width: u32, height: u32) -> Self {
        Self {
            number,
            story,
            grid: Grid::new(width, height),
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse room layout")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize room layout")
    }

    /// Fresh-load reset: every spell becomes runnable again. Repeat counters
    /// are left alone.
    pub fn reset_spells(&mut self) {
        for spell in &mut self.spells {
            spell.reset();
        }
    }

    /// Append a spell with the next free id and return that id.
    pub fn add_spell(&mut self, pos: GridPos, action: SpellAction, trigger: Trigger) -> u32 {
        let id = next_spell_id(&self.spells);
        self.spells.push(Spell::new(id, pos, action, trigger));
        id
    }

    pub fn spell(&self, id: u32) -> Option<&Spell> {
        self.spells.iter().find(|s| s.id == id)
    }

    /// Index of the spawn placed at `pos`, if any.
    pub fn spawn_at(&self, pos: GridPos) -> Option<usize> {
        let pos = self.grid.wrap(pos);
        self.spawns.iter().position(|s| self.grid.wrap(s.pos) == pos)
    }
}
