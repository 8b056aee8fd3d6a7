//! Room driver: one [`Layout`] plus the runtime state of a single visit.

use crate::blocks::{BlockRules, CastOutcome, MagicOutcome, MakeBlockOutcome};
use crate::doors;
use crate::events::{Completion, ObjectLayer, RoomEvent};
use crate::grid::{GridPos, TileRect};
use crate::layout::Layout;
use crate::session::SessionContext;
use crate::spawns::tick_spawns;
use crate::spells::{evaluate_spells, RandomPool, SpellWorld, TriggerState, Warp};
use rand::rngs::StdRng;
use roomsim_core::{scoped_rng, SimTick};
use serde::{Deserialize, Serialize};
use std::mem;
use tracing::{debug, info};

/// Lifecycle state of a room visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoomPhase {
    /// Room is being set up; only pre-load spells run.
    #[default]
    PreLoad,
    /// Normal play.
    Active,
    /// Player walked into the exit door; exit-level spells run.
    DoorStar,
    /// Leaving the room. Nothing runs.
    Transition,
}

/// Room-wide switches flipped by spells or by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomFlags {
    pub scroll_enabled: bool,
    pub secret_exit: bool,
    pub warp_override: Option<Warp>,
    /// Room-wide visual mode; read by the vapour-mode trigger.
    pub vapour_mode: bool,
}

/// Discrete things the player did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    HeadHit(GridPos),
    /// Break a breakable cell, otherwise try to create a block.
    CastMagic(GridPos),
    /// Cycle a loot item or hit the book.
    MagicTransform(GridPos),
    Melt(GridPos),
    PotionCollected,
    OpenDoor(GridPos),
}

/// Host input for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickInput {
    pub player_hitbox: Option<TileRect>,
    pub enemy_count: u32,
    pub actions: Vec<PlayerAction>,
}

impl TickInput {
    fn first_cast(&self) -> Option<GridPos> {
        self.actions.iter().find_map(|a| match a {
            PlayerAction::CastMagic(pos) => Some(*pos),
            _ => None,
        })
    }

    fn first_head_hit(&self) -> Option<GridPos> {
        self.actions.iter().find_map(|a| match a {
            PlayerAction::HeadHit(pos) => Some(*pos),
            _ => None,
        })
    }
}

/// A running room.
pub struct RoomSim {
    layout: Layout,
    rules: BlockRules,
    rng: StdRng,
    pool: RandomPool,
    phase: RoomPhase,
    flags: RoomFlags,
    tick: SimTick,
    events: Vec<RoomEvent>,
}

impl RoomSim {
    /// Load `layout` for a fresh visit.
    ///
    /// Resets spells and spawn cursors, seeds the random pool, promotes
    /// anything already unobstructed, drops stale links, clears keys whose
    /// doors are all open, then runs one pre-load spell pass before going
    /// active. Events produced here are waiting in [`RoomSim::take_events`].
    pub fn enter(mut layout: Layout, session: &mut dyn SessionContext, seed: u64) -> Self {
        layout.reset_spells();
        for spawn in &mut layout.spawns {
            spawn.reset();
        }
        let pool = RandomPool::build(&layout.random_items, &layout.spells);
        let rng = scoped_rng(seed, layout.number, layout.story);

        let mut sim = Self {
            layout,
            rules: BlockRules::new(),
            rng,
            pool,
            phase: RoomPhase::PreLoad,
            flags: RoomFlags::default(),
            tick: SimTick::ZERO,
            events: Vec::new(),
        };

        let promoted = sim
            .rules
            .check_promote_all(&mut sim.layout.grid, &mut sim.events);
        sim.layout.links.prune_links(&sim.layout.grid);
        sim.clear_orphaned_keys(session);
        let preloaded = sim.run_spells(&TickInput::default(), session);
        sim.phase = RoomPhase::Active;

        info!(
            room = sim.layout.number,
            story = sim.layout.story,
            promoted,
            preloaded,
            pool = sim.pool.len(),
            "entered room"
        );
        sim
    }

    /// One fixed-rate update: spells, then spawns, then player actions.
    pub fn tick(
        &mut self,
        input: &TickInput,
        session: &mut dyn SessionContext,
        objects: &mut dyn ObjectLayer,
    ) {
        if self.phase == RoomPhase::Transition {
            return;
        }
        self.run_spells(input, session);
        if self.phase == RoomPhase::Active {
            tick_spawns(&mut self.layout.spawns, &mut self.rng, &mut self.events);
        }
        for action in &input.actions {
            self.apply(*action, session, objects);
        }
        self.rules.tick();
        self.tick = self.tick.advance(1);
    }

    /// Apply one player action outside the tick loop. Returns whether it
    /// changed anything.
    pub fn apply(
        &mut self,
        action: PlayerAction,
        session: &mut dyn SessionContext,
        objects: &mut dyn ObjectLayer,
    ) -> bool {
        let grid = &mut self.layout.grid;
        match action {
            PlayerAction::HeadHit(pos) => self.rules.head_hit(grid, pos, &mut self.events),
            PlayerAction::CastMagic(pos) => {
                let outcome =
                    self.rules
                        .cast_magic(grid, pos, &*session, objects, &mut self.events);
                !matches!(
                    outcome,
                    CastOutcome::Make(MakeBlockOutcome::Nothing | MakeBlockOutcome::Blocked)
                )
            }
            PlayerAction::MagicTransform(pos) => {
                self.rules.magic_block(grid, pos, &mut self.events) != MagicOutcome::Nothing
            }
            PlayerAction::Melt(pos) => self.rules.melt(grid, pos, &mut self.events),
            PlayerAction::PotionCollected => {
                for spell in &mut self.layout.spells {
                    spell.potion_collected();
                }
                true
            }
            PlayerAction::OpenDoor(pos) => self.open_door(pos, session),
        }
    }

    /// Open the door at `pos`, then drop keys that no longer open anything.
    pub fn open_door(&mut self, pos: GridPos, session: &mut dyn SessionContext) -> bool {
        let opened = doors::open_door(
            &mut self.layout.grid,
            pos,
            self.layout.number,
            session,
            &mut self.events,
        );
        if opened {
            self.clear_orphaned_keys(session);
        }
        opened
    }

    /// Hand back a completion token from an effect that finished animating.
    pub fn complete(&mut self, completion: Completion) -> bool {
        match completion {
            Completion::MakeBlockFinish(pos) => {
                self.rules
                    .make_block_finish(&mut self.layout.grid, pos, &mut self.events)
            }
        }
    }

    /// Drain everything the room asked its host to do.
    pub fn take_events(&mut self) -> Vec<RoomEvent> {
        mem::take(&mut self.events)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    pub fn into_layout(self) -> Layout {
        self.layout
    }

    pub fn rules(&self) -> &BlockRules {
        &self.rules
    }

    pub fn random_pool(&self) -> &RandomPool {
        &self.pool
    }

    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    /// Host-driven phase change (exit door reached, room leaving).
    pub fn set_phase(&mut self, phase: RoomPhase) {
        debug!(room = self.layout.number, from = ?self.phase, to = ?phase, "room phase");
        self.phase = phase;
    }

    pub fn flags(&self) -> &RoomFlags {
        &self.flags
    }

    pub fn flags_mut(&mut self) -> &mut RoomFlags {
        &mut self.flags
    }

    pub fn now(&self) -> SimTick {
        self.tick
    }

    /// Ticks run since entry.
    pub fn ticks_in_room(&self) -> u64 {
        self.tick.since(SimTick::ZERO)
    }

    fn clear_orphaned_keys(&mut self, session: &dyn SessionContext) {
        let show_effects = self.phase == RoomPhase::Active;
        self.layout.links.check_for_orphaned_keys(
            &mut self.layout.grid,
            self.layout.number,
            session,
            show_effects,
            &mut self.events,
        );
    }

    fn run_spells(&mut self, input: &TickInput, session: &mut dyn SessionContext) -> usize {
        let state = TriggerState {
            room: self.layout.number,
            phase: self.phase,
            casting_at: input.first_cast().map(|p| self.layout.grid.wrap(p)),
            head_hit: input.first_head_hit().map(|p| self.layout.grid.wrap(p)),
            player_hitbox: input.player_hitbox,
            enemy_count: input.enemy_count,
            ticks_in_room: self.ticks_in_room(),
        };
        let Layout {
            grid,
            spawns,
            spells,
            ..
        } = &mut self.layout;
        let mut world = SpellWorld {
            grid,
            spawns,
            rules: &mut self.rules,
            flags: &mut self.flags,
            pool: &mut self.pool,
            rng: &mut self.rng,
            events: &mut self.events,
        };
        evaluate_spells(spells, &state, session, &mut world)
    }
}
