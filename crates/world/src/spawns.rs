//! Spawn points: a 64-slot phase bitmask releasing queued object
//! definitions, plus an optional random liquid droplet.
//!
//! The two 32-bit masks are read high bit first, `phase0` covering cycle
//! ticks 0–31 and `phase1` ticks 32–63. On each tick whose bit is set the
//! spawn releases the next definition round-robin. Enforcing each
//! definition's `max_instances` cap is left to the object layer, which is
//! the only place that knows how many instances are alive.

use crate::events::RoomEvent;
use crate::grid::GridPos;
use rand::Rng;
use roomsim_core::Heading;
use serde::{Deserialize, Serialize};

/// Length of one phase cycle in ticks.
pub const PHASE_CYCLE: u8 = 64;

/// Game-object type id understood by the object layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ObjectKind(pub u16);

bitflags::bitflags! {
    /// Per-definition behaviour flags passed through to the object layer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SpawnFlags: u16 {
        const FALLING = 0b0001;
        const BLINKING = 0b0010;
        const GUARDING = 0b0100;
        const BONUS = 0b1000;
    }
}

/// One queued object definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnDef {
    pub kind: ObjectKind,
    pub heading: Heading,
    pub flags: SpawnFlags,
    pub max_instances: u8,
}

impl Default for SpawnDef {
    fn default() -> Self {
        Self {
            kind: ObjectKind::default(),
            heading: Heading::DEFAULT,
            flags: SpawnFlags::empty(),
            max_instances: 1,
        }
    }
}

impl SpawnDef {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }
}

/// Liquid released by droplet mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Liquid {
    #[default]
    Water,
    Lava,
    Acid,
}

/// Droplet sub-mode: every `rate` ticks, release a drop with `chance`%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Droplet {
    pub liquid: Liquid,
    pub rate: u32,
    pub chance: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SpawnCursor {
    cycle: u8,
    next: usize,
    droplet_timer: u32,
}

/// A spawn point.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Spawn {
    pub pos: GridPos,
    pub queue: Vec<SpawnDef>,
    pub phase0: u32,
    pub phase1: u32,
    /// Lifetime in ticks given to dispensed objects (0 = unlimited).
    pub ttl: u32,
    pub droplet: Option<Droplet>,
    #[serde(skip)]
    cursor: SpawnCursor,
}

impl Spawn {
    pub fn new(pos: GridPos) -> Self {
        Self {
            pos,
            ..Self::default()
        }
    }

    /// Whether cycle tick `slot` (0–63) releases an object.
    pub fn phase_bit(&self, slot: u8) -> bool {
        let slot = slot % PHASE_CYCLE;
        let (word, bit) = if slot < 32 {
            (self.phase0, slot)
        } else {
            (self.phase1, slot - 32)
        };
        word & (0x8000_0000 >> bit) != 0
    }

    /// Position within the current phase cycle.
    pub fn cycle_tick(&self) -> u8 {
        self.cursor.cycle
    }

    /// Rewind the cycle, queue and droplet timer.
    pub fn reset(&mut self) {
        self.cursor = SpawnCursor::default();
    }

    /// Take the next queued definition round-robin. `None` if the queue is
    /// empty.
    pub fn dispense_next(&mut self) -> Option<SpawnDef> {
        if self.queue.is_empty() {
            return None;
        }
        let def = self.queue[self.cursor.next % self.queue.len()];
        self.cursor.next = (self.cursor.next + 1) % self.queue.len();
        Some(def)
    }

    /// Advance one tick, pushing whatever this spawn releases.
    pub fn tick<R: Rng>(&mut self, index: usize, rng: &mut R, events: &mut Vec<RoomEvent>) {
        if self.phase_bit(self.cursor.cycle) {
            if let Some(def) = self.dispense_next() {
                events.push(RoomEvent::Dispense {
                    spawn: index,
                    pos: self.pos,
                    def,
                    ttl: self.ttl,
                });
            }
        }
        self.cursor.cycle = (self.cursor.cycle + 1) % PHASE_CYCLE;

        if let Some(droplet) = self.droplet {
            if droplet.rate == 0 {
                return;
            }
            self.cursor.droplet_timer += 1;
            if self.cursor.droplet_timer >= droplet.rate {
                self.cursor.droplet_timer = 0;
                if rng.gen_range(0..100u8) < droplet.chance {
                    events.push(RoomEvent::Droplet {
                        spawn: index,
                        pos: self.pos,
                        liquid: droplet.liquid,
                    });
                }
            }
        }
    }
}

/// Run the scheduler over every spawn in the room.
pub fn tick_spawns<R: Rng>(spawns: &mut [Spawn], rng: &mut R, events: &mut Vec<RoomEvent>) {
    for (index, spawn) in spawns.iter_mut().enumerate() {
        spawn.tick(index, rng, events);
    }
}
