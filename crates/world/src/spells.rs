//! Per-room scripted events.
//!
//! Every tick the room walks its spell list. A spell that is not finished,
//! whose prerequisites hold and whose trigger fired counts down its
//! `require_count` (and waits for a later pass) or runs its action and
//! latches `finished`.

use crate::blocks::BlockRules;
use crate::cell::{Cell, Content};
use crate::events::{EffectKind, RoomEvent};
use crate::grid::{Grid, GridPos, TileRect};
use crate::room::{RoomFlags, RoomPhase};
use crate::session::SessionContext;
use crate::spawns::Spawn;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Ticks a room must have run before `NoEnemies` can fire.
pub const NO_ENEMIES_GRACE_TICKS: u64 = 60;

/// Condition class that fires a spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Trigger {
    #[default]
    Immediate,
    PreLoad,
    CastsMagic,
    DanaTouches,
    HeadHit,
    VapourMode,
    Potion,
    ExitLevel,
    NoEnemies,
}

/// Reference to another spell. `room == 0` matches the spell id in any room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SpellRef {
    pub room: u16,
    pub spell: u32,
}

/// Warp destination override set by a spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Warp {
    pub room: u16,
    pub pos: GridPos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpellAction {
    /// Write `cell` at the spell position.
    ChangeCell { cell: Cell, sparkle: bool },
    /// Dispense the next definition of the spawn at this index.
    SpawnObject { spawn: usize },
    EnableScroll,
    DisableScroll,
    SecretExit,
    /// Place the next value drawn from the room's random pool.
    RandomCell,
    ExitDoor,
    RevealHidden,
    ReverseSparkies,
    SetWarp(Warp),
}

impl Default for SpellAction {
    fn default() -> Self {
        SpellAction::ChangeCell {
            cell: Cell::EMPTY,
            sparkle: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Spell {
    pub id: u32,
    pub pos: GridPos,
    pub action: SpellAction,
    pub trigger: Trigger,
    pub required_item: Option<Content>,
    /// Countdown shared by the item threshold (zero reads as one), potion
    /// arming and deferral. Not restored on reload.
    pub require_count: u32,
    pub required_spell: Option<SpellRef>,
    pub finished: bool,
    #[serde(skip)]
    potion_armed: bool,
}

impl Spell {
    pub fn new(id: u32, pos: GridPos, action: SpellAction, trigger: Trigger) -> Self {
        Self {
            id,
            pos,
            action,
            trigger,
            ..Self::default()
        }
    }

    /// Fresh room load: clear the latch and potion arming, keep
    /// `require_count`.
    pub fn reset(&mut self) {
        self.finished = false;
        self.potion_armed = false;
    }

    fn required_count(&self) -> u32 {
        self.require_count.max(1)
    }

    /// Count one collected potion; the collection that runs the counter
    /// out arms the trigger.
    pub fn potion_collected(&mut self) {
        if self.trigger != Trigger::Potion || self.finished {
            return;
        }
        self.require_count = self.require_count.saturating_sub(1);
        if self.require_count == 0 {
            self.potion_armed = true;
        }
    }

    pub fn is_potion_armed(&self) -> bool {
        self.potion_armed
    }
}

/// Next free spell id for a room.
pub fn next_spell_id(spells: &[Spell]) -> u32 {
    spells.iter().map(|s| s.id).max().map_or(1, |id| id + 1)
}

/// Working pool for [`SpellAction::RandomCell`], drawn without replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RandomPool {
    items: Vec<Content>,
}

impl RandomPool {
    /// Seed from the authored list, padded with empties up to the number of
    /// random-cell spells.
    pub fn build(authored: &[Content], spells: &[Spell]) -> Self {
        let wanted = spells
            .iter()
            .filter(|s| s.action == SpellAction::RandomCell)
            .count();
        let mut items = authored.to_vec();
        if items.len() < wanted {
            items.resize(wanted, Content::EMPTY);
        }
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Content] {
        &self.items
    }

    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Content> {
        if self.items.is_empty() {
            return None;
        }
        let slot = rng.gen_range(0..self.items.len());
        Some(self.items.swap_remove(slot))
    }
}

/// What the player and room did this tick, as seen by triggers.
#[derive(Debug, Clone, Default)]
pub struct TriggerState {
    pub room: u16,
    pub phase: RoomPhase,
    pub casting_at: Option<GridPos>,
    pub head_hit: Option<GridPos>,
    pub player_hitbox: Option<TileRect>,
    pub enemy_count: u32,
    pub ticks_in_room: u64,
}

/// Mutable room state spell actions write to.
pub struct SpellWorld<'a, R: Rng + ?Sized> {
    pub grid: &'a mut Grid,
    pub spawns: &'a mut [Spawn],
    pub rules: &'a mut BlockRules,
    pub flags: &'a mut RoomFlags,
    pub pool: &'a mut RandomPool,
    pub rng: &'a mut R,
    pub events: &'a mut Vec<RoomEvent>,
}

fn phase_allows(trigger: Trigger, phase: RoomPhase) -> bool {
    match trigger {
        Trigger::PreLoad => matches!(phase, RoomPhase::PreLoad | RoomPhase::Active),
        Trigger::ExitLevel => matches!(phase, RoomPhase::Active | RoomPhase::DoorStar),
        _ => phase == RoomPhase::Active,
    }
}

fn meets_prereqs(spell: &Spell, state: &TriggerState, session: &dyn SessionContext) -> bool {
    if !phase_allows(spell.trigger, state.phase) {
        return false;
    }
    if let Some(item) = spell.required_item {
        if session.inventory_count(item) < spell.required_count() {
            return false;
        }
    }
    match spell.required_spell {
        Some(req) => session.has_executed_spell(req.room, req.spell),
        None => true,
    }
}

fn trigger_fired(spell: &Spell, pos: GridPos, state: &TriggerState, flags: &RoomFlags) -> bool {
    match spell.trigger {
        Trigger::Immediate | Trigger::PreLoad => true,
        Trigger::CastsMagic => state.casting_at == Some(pos),
        Trigger::DanaTouches => state.player_hitbox.is_some_and(|hitbox| {
            let (x, y) = pos.center();
            hitbox.contains(x, y)
        }),
        Trigger::HeadHit => state.head_hit == Some(pos),
        Trigger::VapourMode => flags.vapour_mode,
        Trigger::Potion => spell.is_potion_armed(),
        Trigger::ExitLevel => state.phase == RoomPhase::DoorStar,
        Trigger::NoEnemies => {
            state.enemy_count == 0 && state.ticks_in_room >= NO_ENEMIES_GRACE_TICKS
        }
    }
}

/// One evaluator pass. Returns the number of spells that executed.
pub fn evaluate_spells<R: Rng + ?Sized>(
    spells: &mut [Spell],
    state: &TriggerState,
    session: &mut dyn SessionContext,
    world: &mut SpellWorld<'_, R>,
) -> usize {
    let mut executed = 0;
    for index in 0..spells.len() {
        let spell = &mut spells[index];
        let pos = world.grid.wrap(spell.pos);
        if spell.finished
            || !meets_prereqs(spell, state, session)
            || !trigger_fired(spell, pos, state, world.flags)
        {
            continue;
        }
        if spell.require_count > 0 {
            spell.require_count -= 1;
            debug!(spell = spell.id, remaining = spell.require_count, "spell deferred");
            continue;
        }

        execute(spell, world);
        spell.finished = true;
        session.record_spell(state.room, spell.id);
        executed += 1;
    }
    executed
}

fn execute<R: Rng + ?Sized>(spell: &Spell, world: &mut SpellWorld<'_, R>) {
    let pos = world.grid.wrap(spell.pos);
    debug!(spell = spell.id, %pos, action = ?spell.action, "spell executed");
    match spell.action {
        SpellAction::ChangeCell { cell, sparkle } => {
            world.grid.set(pos, cell);
            if sparkle {
                world.events.push(RoomEvent::effect(EffectKind::Sparkle, pos));
            }
            world.rules.check_promote(world.grid, pos, world.events);
        }
        SpellAction::SpawnObject { spawn } => match world.spawns.get_mut(spawn) {
            Some(target) => {
                if let Some(def) = target.dispense_next() {
                    world.events.push(RoomEvent::Dispense {
                        spawn,
                        pos: target.pos,
                        def,
                        ttl: target.ttl,
                    });
                }
            }
            None => warn!(spell = spell.id, spawn, "spell references a missing spawn"),
        },
        SpellAction::EnableScroll => world.flags.scroll_enabled = true,
        SpellAction::DisableScroll => world.flags.scroll_enabled = false,
        SpellAction::SecretExit => world.flags.secret_exit = true,
        SpellAction::RandomCell => {
            if let Some(content) = world.pool.draw(world.rng) {
                let cell = world.grid.get(pos).with_content(content);
                world.grid.set(pos, cell);
                if cell.is_fully_visible() && content != Content::EMPTY {
                    world.events.push(RoomEvent::effect(EffectKind::Sparkle, pos));
                }
                world.rules.check_promote(world.grid, pos, world.events);
            }
        }
        SpellAction::ExitDoor => world.events.push(RoomEvent::ExitDoor { pos }),
        SpellAction::RevealHidden => {
            for hidden in world.grid.find(Cell::is_hidden) {
                let cell = world.grid.get(hidden).uncovered();
                world.grid.set(hidden, cell);
                world.events.push(RoomEvent::effect(EffectKind::Sparkle, hidden));
                world.rules.check_promote(world.grid, hidden, world.events);
            }
        }
        SpellAction::ReverseSparkies => world.events.push(RoomEvent::ReverseSparkies),
        SpellAction::SetWarp(warp) => world.flags.warp_override = Some(warp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::spawns::{ObjectKind, SpawnDef};
    use rand::{rngs::StdRng, SeedableRng};

    struct Fixture {
        grid: Grid,
        spawns: Vec<Spawn>,
        rules: BlockRules,
        flags: RoomFlags,
        pool: RandomPool,
        rng: StdRng,
        events: Vec<RoomEvent>,
        session: Session,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                grid: Grid::new(15, 12),
                spawns: Vec::new(),
                rules: BlockRules::new(),
                flags: RoomFlags::default(),
                pool: RandomPool::default(),
                rng: StdRng::seed_from_u64(11),
                events: Vec::new(),
                session: Session::new(),
            }
        }

        fn run(&mut self, spells: &mut [Spell], state: &TriggerState) -> usize {
            let mut world = SpellWorld {
                grid: &mut self.grid,
                spawns: &mut self.spawns,
                rules: &mut self.rules,
                flags: &mut self.flags,
                pool: &mut self.pool,
                rng: &mut self.rng,
                events: &mut self.events,
            };
            evaluate_spells(spells, state, &mut self.session, &mut world)
        }
    }

    fn active(room: u16) -> TriggerState {
        TriggerState {
            room,
            phase: RoomPhase::Active,
            ..TriggerState::default()
        }
    }

    fn change_to(content: Content) -> SpellAction {
        SpellAction::ChangeCell {
            cell: Cell::new(content),
            sparkle: true,
        }
    }

    #[test]
    fn immediate_spell_runs_once_and_is_recorded() {
        let mut fx = Fixture::new();
        let pos = GridPos::new(3, 3);
        let mut spells = vec![Spell::new(1, pos, change_to(Content::JAR), Trigger::Immediate)];

        assert_eq!(fx.run(&mut spells, &active(4)), 1);
        assert!(spells[0].finished);
        assert_eq!(fx.grid.get(pos).content(), Content::JAR);
        assert!(fx.session.has_executed_spell(4, 1));

        fx.grid.set(pos, Cell::EMPTY);
        assert_eq!(fx.run(&mut spells, &active(4)), 0);
        assert_eq!(fx.grid.get(pos), Cell::EMPTY);
    }

    #[test]
    fn unexecuted_required_spell_blocks_forever() {
        let mut fx = Fixture::new();
        let mut spells = vec![Spell {
            required_spell: Some(SpellRef { room: 9, spell: 2 }),
            ..Spell::new(1, GridPos::new(1, 1), SpellAction::SecretExit, Trigger::Immediate)
        }];
        for _ in 0..200 {
            fx.run(&mut spells, &active(1));
        }
        assert!(!spells[0].finished);
        assert!(!fx.flags.secret_exit);

        fx.session.record_spell(9, 2);
        fx.run(&mut spells, &active(1));
        assert!(spells[0].finished);
        assert!(fx.flags.secret_exit);
    }

    #[test]
    fn required_spell_same_pass_chain() {
        let mut fx = Fixture::new();
        let mut spells = vec![
            Spell::new(1, GridPos::new(1, 1), SpellAction::EnableScroll, Trigger::Immediate),
            Spell {
                required_spell: Some(SpellRef { room: 0, spell: 1 }),
                ..Spell::new(2, GridPos::new(1, 1), SpellAction::SecretExit, Trigger::Immediate)
            },
        ];
        assert_eq!(fx.run(&mut spells, &active(3)), 2);
    }

    #[test]
    fn item_prerequisite_uses_count_floor_of_one() {
        let mut fx = Fixture::new();
        let mut spells = vec![Spell {
            required_item: Some(Content::FAIRY),
            require_count: 2,
            ..Spell::new(1, GridPos::new(1, 1), SpellAction::SecretExit, Trigger::Immediate)
        }];
        fx.session.add_item(Content::FAIRY, 1);
        fx.run(&mut spells, &active(1));
        assert!(!spells[0].finished);
        fx.session.add_item(Content::FAIRY, 1);
        fx.run(&mut spells, &active(1));
        assert!(!spells[0].finished);
        assert_eq!(spells[0].require_count, 1);
        fx.run(&mut spells, &active(1));
        assert_eq!(spells[0].require_count, 0);
        assert!(!spells[0].finished);
        fx.run(&mut spells, &active(1));
        assert!(spells[0].finished);

        let mut zero = vec![Spell {
            required_item: Some(Content::JAR),
            ..Spell::new(2, GridPos::new(1, 1), SpellAction::SecretExit, Trigger::Immediate)
        }];
        fx.run(&mut zero, &active(1));
        assert!(!zero[0].finished);
    }

    #[test]
    fn require_count_counts_down_before_running() {
        let mut fx = Fixture::new();
        let mut spells = vec![Spell {
            require_count: 3,
            ..Spell::new(1, GridPos::new(1, 1), SpellAction::ExitDoor, Trigger::Immediate)
        }];
        assert_eq!(fx.run(&mut spells, &active(1)), 0);
        assert!(!spells[0].finished);
        assert_eq!(spells[0].require_count, 2);
        assert_eq!(fx.run(&mut spells, &active(1)), 0);
        assert_eq!(spells[0].require_count, 1);
        assert_eq!(fx.run(&mut spells, &active(1)), 0);
        assert_eq!(spells[0].require_count, 0);
        assert_eq!(fx.run(&mut spells, &active(1)), 1);
        assert!(fx.events.contains(&RoomEvent::ExitDoor {
            pos: GridPos::new(1, 1)
        }));

        // A reload clears the latch but not the spent counter.
        spells[0].reset();
        assert!(!spells[0].finished);
        assert_eq!(spells[0].require_count, 0);
        assert_eq!(fx.run(&mut spells, &active(1)), 1);
    }

    #[test]
    fn counter_only_moves_when_the_trigger_fires() {
        let mut fx = Fixture::new();
        let pos = GridPos::new(4, 4);
        let mut spells = vec![Spell {
            require_count: 2,
            ..Spell::new(1, pos, SpellAction::SecretExit, Trigger::HeadHit)
        }];
        for _ in 0..5 {
            fx.run(&mut spells, &active(1));
        }
        assert_eq!(spells[0].require_count, 2);

        let hit = TriggerState {
            head_hit: Some(pos),
            ..active(1)
        };
        assert_eq!(fx.run(&mut spells, &hit), 0);
        assert_eq!(fx.run(&mut spells, &hit), 0);
        assert!(!fx.flags.secret_exit);
        assert_eq!(fx.run(&mut spells, &hit), 1);
        assert!(fx.flags.secret_exit);
    }

    #[test]
    fn player_triggers_match_wrapped_spell_position() {
        let mut fx = Fixture::new();
        // Authored one room-width to the right of (2, 3).
        let authored = GridPos::new(17, 3);
        let mut spells = vec![
            Spell::new(1, authored, SpellAction::EnableScroll, Trigger::CastsMagic),
            Spell::new(2, authored, SpellAction::SecretExit, Trigger::HeadHit),
        ];
        let hit = TriggerState {
            casting_at: Some(GridPos::new(2, 3)),
            head_hit: Some(GridPos::new(2, 3)),
            ..active(1)
        };
        assert_eq!(fx.run(&mut spells, &hit), 2);
        assert!(fx.flags.scroll_enabled);
        assert!(fx.flags.secret_exit);
    }

    #[test]
    fn phases_gate_triggers() {
        let mut fx = Fixture::new();
        let preload = TriggerState {
            phase: RoomPhase::PreLoad,
            ..active(1)
        };
        let mut spells = vec![
            Spell::new(1, GridPos::new(1, 1), SpellAction::EnableScroll, Trigger::Immediate),
            Spell::new(2, GridPos::new(1, 1), SpellAction::SecretExit, Trigger::PreLoad),
            Spell::new(3, GridPos::new(1, 1), SpellAction::ExitDoor, Trigger::ExitLevel),
        ];
        assert_eq!(fx.run(&mut spells, &preload), 1);
        assert!(spells[1].finished);
        assert!(!spells[0].finished);

        assert_eq!(fx.run(&mut spells, &active(1)), 1);
        assert!(spells[0].finished);
        assert!(!spells[2].finished);

        let door_star = TriggerState {
            phase: RoomPhase::DoorStar,
            ..active(1)
        };
        assert_eq!(fx.run(&mut spells, &door_star), 1);
        assert!(spells[2].finished);
    }

    #[test]
    fn player_triggers_match_exact_cell() {
        let mut fx = Fixture::new();
        let pos = GridPos::new(5, 6);
        let mut spells = vec![
            Spell::new(1, pos, SpellAction::EnableScroll, Trigger::CastsMagic),
            Spell::new(2, pos, SpellAction::SecretExit, Trigger::HeadHit),
            Spell::new(3, pos, SpellAction::ReverseSparkies, Trigger::DanaTouches),
        ];
        let miss = TriggerState {
            casting_at: Some(GridPos::new(5, 7)),
            head_hit: Some(GridPos::new(4, 6)),
            player_hitbox: Some(TileRect::new(6.0, 6.0, 1.0, 1.0)),
            ..active(1)
        };
        assert_eq!(fx.run(&mut spells, &miss), 0);

        let hit = TriggerState {
            casting_at: Some(pos),
            head_hit: Some(pos),
            player_hitbox: Some(TileRect::new(5.2, 6.1, 0.8, 0.9)),
            ..active(1)
        };
        assert_eq!(fx.run(&mut spells, &hit), 3);
        assert!(fx.events.contains(&RoomEvent::ReverseSparkies));
    }

    #[test]
    fn no_enemies_waits_for_grace_period() {
        let mut fx = Fixture::new();
        let mut spells = vec![Spell::new(
            1,
            GridPos::new(1, 1),
            SpellAction::SecretExit,
            Trigger::NoEnemies,
        )];
        let early = TriggerState {
            ticks_in_room: 59,
            ..active(1)
        };
        assert_eq!(fx.run(&mut spells, &early), 0);
        let enemies = TriggerState {
            ticks_in_room: 100,
            enemy_count: 2,
            ..active(1)
        };
        assert_eq!(fx.run(&mut spells, &enemies), 0);
        let clear = TriggerState {
            ticks_in_room: 60,
            ..active(1)
        };
        assert_eq!(fx.run(&mut spells, &clear), 1);
    }

    #[test]
    fn potion_trigger_arms_on_nth_potion() {
        let mut fx = Fixture::new();
        let mut spells = vec![Spell {
            require_count: 3,
            ..Spell::new(1, GridPos::new(1, 1), SpellAction::SecretExit, Trigger::Potion)
        }];
        for _ in 0..2 {
            spells[0].potion_collected();
            assert_eq!(fx.run(&mut spells, &active(1)), 0);
        }
        spells[0].potion_collected();
        assert_eq!(fx.run(&mut spells, &active(1)), 1);
    }

    #[test]
    fn vapour_mode_follows_room_flag() {
        let mut fx = Fixture::new();
        let mut spells = vec![Spell::new(
            1,
            GridPos::new(1, 1),
            SpellAction::EnableScroll,
            Trigger::VapourMode,
        )];
        assert_eq!(fx.run(&mut spells, &active(1)), 0);
        fx.flags.vapour_mode = true;
        assert_eq!(fx.run(&mut spells, &active(1)), 1);
        assert!(fx.flags.scroll_enabled);
    }

    #[test]
    fn random_pool_pads_and_draws_without_replacement() {
        let random = |id| Spell::new(id, GridPos::new(id as i32, 2), SpellAction::RandomCell, Trigger::Immediate);
        let mut spells = vec![random(1), random(2), random(3)];
        let mut fx = Fixture::new();
        fx.pool = RandomPool::build(&[Content::FAIRY], &spells);
        assert_eq!(fx.pool.len(), 3);
        assert_eq!(
            fx.pool.items().iter().filter(|&&c| c == Content::EMPTY).count(),
            2
        );

        assert_eq!(fx.run(&mut spells, &active(1)), 3);
        assert!(fx.pool.is_empty());
        let placed: Vec<Content> = (1..=3)
            .map(|x| fx.grid.get(GridPos::new(x, 2)).content())
            .collect();
        assert_eq!(placed.iter().filter(|&&c| c == Content::FAIRY).count(), 1);
        assert_eq!(placed.iter().filter(|&&c| c == Content::EMPTY).count(), 2);
    }

    #[test]
    fn random_pool_keeps_excess_items_undrawn() {
        let spells = vec![Spell::new(
            1,
            GridPos::new(1, 1),
            SpellAction::RandomCell,
            Trigger::Immediate,
        )];
        let mut pool = RandomPool::build(&[Content::FAIRY, Content::JAR, Content::BELL], &spells);
        assert_eq!(pool.len(), 3);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(pool.draw(&mut rng).is_some());
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn random_cell_keeps_cover() {
        let mut fx = Fixture::new();
        let pos = GridPos::new(2, 2);
        fx.grid.set(pos, Cell::new(Content::DIRT));
        let mut spells = vec![Spell::new(1, pos, SpellAction::RandomCell, Trigger::Immediate)];
        fx.pool = RandomPool::build(&[Content::POTION], &spells);
        fx.run(&mut spells, &active(1));
        let cell = fx.grid.get(pos);
        assert_eq!(cell.content(), Content::POTION);
        assert!(cell.is_covered());
    }

    #[test]
    fn spawn_object_dispenses_and_missing_spawn_is_inert() {
        let mut fx = Fixture::new();
        let mut spawn = Spawn::new(GridPos::new(7, 7));
        spawn.queue.push(SpawnDef::new(ObjectKind(12)));
        fx.spawns.push(spawn);
        let mut spells = vec![
            Spell::new(1, GridPos::new(1, 1), SpellAction::SpawnObject { spawn: 0 }, Trigger::Immediate),
            Spell::new(2, GridPos::new(1, 1), SpellAction::SpawnObject { spawn: 5 }, Trigger::Immediate),
        ];
        assert_eq!(fx.run(&mut spells, &active(1)), 2);
        let dispensed: Vec<_> = fx
            .events
            .iter()
            .filter(|e| matches!(e, RoomEvent::Dispense { .. }))
            .collect();
        assert_eq!(dispensed.len(), 1);
    }

    #[test]
    fn reveal_hidden_uncovers_every_hidden_cell() {
        let mut fx = Fixture::new();
        let a = GridPos::new(1, 1);
        let b = GridPos::new(8, 9);
        fx.grid.set(a, Cell::with_cover(Content::JAR, crate::cell::Cover::Hidden));
        fx.grid.set(b, Cell::with_cover(Content::FAIRY, crate::cell::Cover::Hidden).to_frozen());
        let mut spells = vec![Spell::new(1, a, SpellAction::RevealHidden, Trigger::Immediate)];
        fx.run(&mut spells, &active(1));
        assert_eq!(fx.grid.get(a), Cell::new(Content::JAR));
        assert_eq!(fx.grid.get(b), Cell::new(Content::FAIRY).to_frozen());
    }

    #[test]
    fn set_warp_overrides_room_flags() {
        let mut fx = Fixture::new();
        let warp = Warp {
            room: 22,
            pos: GridPos::new(3, 4),
        };
        let mut spells = vec![Spell::new(1, GridPos::new(1, 1), SpellAction::SetWarp(warp), Trigger::Immediate)];
        fx.run(&mut spells, &active(1));
        assert_eq!(fx.flags.warp_override, Some(warp));
    }

    #[test]
    fn next_id_is_one_past_max() {
        assert_eq!(next_spell_id(&[]), 1);
        let spells = vec![
            Spell::new(4, GridPos::ORIGIN, SpellAction::ExitDoor, Trigger::Immediate),
            Spell::new(2, GridPos::ORIGIN, SpellAction::ExitDoor, Trigger::Immediate),
        ];
        assert_eq!(next_spell_id(&spells), 5);
    }
}
