//! Outbound room events and the collaborator interfaces the room calls into.
//!
//! The room never draws, plays audio or owns game objects. Every visible
//! consequence of a rule is pushed as a [`RoomEvent`] and drained by the host
//! once per tick. The two synchronous questions the rules need answered are
//! behind [`ObjectLayer`] (magic hitting a game object) and
//! [`SessionContext`](crate::SessionContext) (facts that outlive the room).

use crate::cell::Content;
use crate::grid::GridPos;
use crate::spawns::{Liquid, SpawnDef};
use serde::{Deserialize, Serialize};

/// One-shot visual effect kinds requested from the object layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Magic sparkle over a cell.
    Sparkle,
    /// Block debris after a head-hit or break.
    Debris,
    /// Melted ice left behind by a frozen cell.
    Remains,
    /// Door half-way between closed and open.
    HalfOpenDoor,
    /// Key fading out after its doors were all opened.
    KeyVanish,
}

/// Token handed back through [`RoomSim::complete`](crate::RoomSim::complete)
/// when an effect's animation ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Completion {
    /// Turn the temporary block at this cell into a real covered block.
    MakeBlockFinish(GridPos),
}

/// Everything the room asks its host to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoomEvent {
    Effect {
        kind: EffectKind,
        pos: GridPos,
        on_complete: Option<Completion>,
    },
    /// A cell content left the static grid and became a falling object.
    Promote { content: Content, pos: GridPos },
    /// Generic "something happened" sound cue.
    Cue { pos: GridPos },
    /// A spawn point released a queued object.
    Dispense {
        spawn: usize,
        pos: GridPos,
        def: SpawnDef,
        ttl: u32,
    },
    /// A spawn point released a liquid droplet.
    Droplet {
        spawn: usize,
        pos: GridPos,
        liquid: Liquid,
    },
    /// Magic reached the book; start the ending.
    EndingSequence { pos: GridPos },
    /// A spell asked for the exit door sequence.
    ExitDoor { pos: GridPos },
    /// Every sparky should reverse direction and handedness.
    ReverseSparkies,
}

impl RoomEvent {
    /// Short label used in event logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RoomEvent::Effect { .. } => "Effect",
            RoomEvent::Promote { .. } => "Promote",
            RoomEvent::Cue { .. } => "Cue",
            RoomEvent::Dispense { .. } => "Dispense",
            RoomEvent::Droplet { .. } => "Droplet",
            RoomEvent::EndingSequence { .. } => "EndingSequence",
            RoomEvent::ExitDoor { .. } => "ExitDoor",
            RoomEvent::ReverseSparkies => "ReverseSparkies",
        }
    }

    pub(crate) fn effect(kind: EffectKind, pos: GridPos) -> Self {
        RoomEvent::Effect {
            kind,
            pos,
            on_complete: None,
        }
    }
}

/// Answer from the object layer when magic is cast at a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MagicResponse {
    /// Nothing at this cell cares about magic.
    #[default]
    NotBlocked,
    /// An object here stops the magic.
    Blocked,
    /// An object here accepted the magic and has already reacted to it.
    Consumed,
}

/// Game-object collaborator queried by the rules.
pub trait ObjectLayer {
    /// Ask the objects overlapping `pos` whether they block or absorb magic.
    /// The layer invokes the absorbing object itself before answering
    /// [`MagicResponse::Consumed`].
    fn magic_at(&mut self, pos: GridPos) -> MagicResponse;
}

/// Object layer with no objects in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObjects;

impl ObjectLayer for NoObjects {
    fn magic_at(&mut self, _pos: GridPos) -> MagicResponse {
        MagicResponse::NotBlocked
    }
}
