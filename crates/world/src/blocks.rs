//! Block interaction rules: head-hits, magic breaking, block creation,
//! loot transformation and melting.
//!
//! Every entry point re-runs cell promotion afterwards so reward items that
//! become unobstructed leave the static grid immediately.

use crate::cell::{Cell, Content};
use crate::events::{Completion, EffectKind, MagicResponse, ObjectLayer, RoomEvent};
use crate::grid::{Grid, GridPos};
use crate::session::SessionContext;
use tracing::debug;

/// Magic hits on the same frozen cell needed to break it.
pub const FROZEN_HITS_TO_BREAK: u8 = 8;

/// Ticks without a hit before the frozen-hit counter resets.
pub const FROZEN_HIT_DECAY_TICKS: u32 = 90;

/// Loot rings cycled by [`BlockRules::magic_block`], one per colour family.
pub const LOOT_RINGS: [[Content; 4]; 3] = [
    [
        Content::BLUE_COIN,
        Content::BLUE_GEM,
        Content::BLUE_JEWEL,
        Content::BLUE_CHALICE,
    ],
    [
        Content::GOLD_COIN,
        Content::GOLD_GEM,
        Content::GOLD_JEWEL,
        Content::GOLD_CHALICE,
    ],
    [
        Content::RED_COIN,
        Content::RED_GEM,
        Content::RED_JEWEL,
        Content::RED_CHALICE,
    ],
];

/// Dense contents ignore head-hits and magic breaking even when covered.
pub fn is_dense(content: Content) -> bool {
    crate::doors::is_door_at_all(content)
        || crate::doors::is_key_at_all(content)
        || matches!(content, Content::MIRROR | Content::BAT | Content::PUZZLE)
}

/// Contents that become falling objects once nothing covers them.
pub fn is_promotable(content: Content) -> bool {
    matches!(
        content,
        Content::REWARD_BAG
            | Content::REWARD_BAG_LARGE
            | Content::BELL
            | Content::SCROLL
            | Content::EXTRA_LIFE
    )
}

/// Whether a head-hit changes this cell.
pub fn is_head_breakable(cell: Cell) -> bool {
    if cell.is_frozen() || cell.is_temporary() || is_dense(cell.effective_content()) {
        return false;
    }
    cell.is_covered()
        || cell.is_cracked()
        || (cell.is_fully_visible()
            && matches!(cell.content(), Content::FAKE_CONCRETE | Content::ASH))
}

/// Whether magic breaks this cell outright.
pub fn is_magic_breakable(cell: Cell) -> bool {
    if cell.is_frozen() {
        return false;
    }
    cell.is_temporary() || is_head_breakable(cell)
}

fn reveal(cell: Cell) -> Cell {
    let visible = cell.uncovered();
    if visible.content() == Content::GRAY_RABBIT {
        visible.with_content(Content::RABBIT)
    } else {
        visible
    }
}

/// Result of [`BlockRules::make_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MakeBlockOutcome {
    /// An object at the cell stopped the magic.
    Blocked,
    /// An object at the cell took the magic.
    Consumed,
    /// A temporary block is forming; finishes through a completion token.
    Started,
    /// A frozen cell took another hit but held.
    FrozenHit { hits: u8 },
    /// A frozen cell took its final hit and broke.
    FrozenBroken,
    /// Nothing happened.
    Nothing,
}

/// Result of [`BlockRules::magic_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicOutcome {
    Transformed(Content),
    Ending,
    Nothing,
}

/// Result of [`BlockRules::cast_magic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOutcome {
    Broke,
    Make(MakeBlockOutcome),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FrozenHits {
    target: Option<GridPos>,
    hits: u8,
    decay: u32,
}

/// Block rule engine plus the per-room state it carries between calls.
#[derive(Debug, Clone, Default)]
pub struct BlockRules {
    frozen: FrozenHits,
}

impl BlockRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current frozen-hit target and count.
    pub fn frozen_hits(&self) -> Option<(GridPos, u8)> {
        self.frozen.target.map(|pos| (pos, self.frozen.hits))
    }

    /// Advance per-tick counters.
    pub fn tick(&mut self) {
        if self.frozen.decay > 0 {
            self.frozen.decay -= 1;
            if self.frozen.decay == 0 {
                self.frozen = FrozenHits::default();
            }
        }
    }

    /// Player's head hit the cell at `pos` from below.
    pub fn head_hit(&mut self, grid: &mut Grid, pos: GridPos, events: &mut Vec<RoomEvent>) -> bool {
        let pos = grid.wrap(pos);
        let cell = grid.get(pos);
        if !is_head_breakable(cell) {
            return false;
        }

        if cell.is_fully_visible() && cell.content() == Content::ASH {
            self.cascade_destroy(grid, pos, cell.to_raw(), Some(EffectKind::Debris), events);
        } else {
            let next = if cell.is_fully_visible() && cell.content() == Content::FAKE_CONCRETE {
                Cell::new(Content::CRACKED_BLOCK)
            } else if cell.is_cracked() {
                reveal(cell)
            } else {
                cell.to_cracked()
            };
            debug!(%pos, from = cell.to_raw(), to = next.to_raw(), "head hit");
            grid.set(pos, next);
            events.push(RoomEvent::effect(EffectKind::Debris, pos));
        }
        events.push(RoomEvent::Cue { pos });
        self.check_promote(grid, pos, events);
        true
    }

    /// Magic breaks the cell at `pos` in one step. Ash cascades to its
    /// neighbours unless `cascade` is false.
    pub fn break_block(
        &mut self,
        grid: &mut Grid,
        pos: GridPos,
        anim: Option<EffectKind>,
        cascade: bool,
        events: &mut Vec<RoomEvent>,
    ) -> bool {
        let pos = grid.wrap(pos);
        let cell = grid.get(pos);
        if cell.is_frozen() || is_dense(cell.effective_content()) {
            return false;
        }

        if cell.is_temporary() {
            grid.set(pos, cell.settled());
        } else if cell.is_fully_visible() && cell.content() == Content::ASH {
            if cascade {
                self.cascade_destroy(grid, pos, cell.to_raw(), anim, events);
                self.check_promote(grid, pos, events);
                return true;
            }
            grid.set(pos, Cell::EMPTY);
        } else if cell.is_fully_visible() && cell.content() == Content::FAKE_CONCRETE {
            grid.set(pos, Cell::EMPTY);
        } else if cell.is_covered() || cell.is_cracked() {
            grid.set(pos, reveal(cell));
        } else {
            return false;
        }

        if let Some(kind) = anim {
            events.push(RoomEvent::effect(kind, pos));
        }
        self.check_promote(grid, pos, events);
        true
    }

    /// Destroy `pos` and every direct neighbour whose raw value equals
    /// `match_raw`. One ring only; neighbours do not cascade further.
    pub fn cascade_destroy(
        &mut self,
        grid: &mut Grid,
        pos: GridPos,
        match_raw: u32,
        anim: Option<EffectKind>,
        events: &mut Vec<RoomEvent>,
    ) {
        let origin = grid.wrap(pos);
        let ring = grid.neighbors4(origin);
        let mut destroyed = vec![origin];
        destroyed.extend(
            ring.into_iter()
                .filter(|&n| n != origin && grid.get(n).to_raw() == match_raw),
        );
        for p in destroyed {
            grid.set(p, Cell::EMPTY);
            if let Some(kind) = anim {
                events.push(RoomEvent::effect(kind, p));
            }
            self.check_promote(grid, p, events);
        }
    }

    /// Cycle a loot item through its colour ring, or trigger the ending on
    /// the book.
    pub fn magic_block(
        &mut self,
        grid: &mut Grid,
        pos: GridPos,
        events: &mut Vec<RoomEvent>,
    ) -> MagicOutcome {
        let pos = grid.wrap(pos);
        let cell = grid.get(pos);
        if !cell.is_fully_visible() {
            return MagicOutcome::Nothing;
        }
        if cell.content() == Content::BOOK {
            events.push(RoomEvent::EndingSequence { pos });
            return MagicOutcome::Ending;
        }
        let next = LOOT_RINGS.iter().find_map(|ring| {
            ring.iter()
                .position(|&c| c == cell.content())
                .map(|i| ring[(i + 1) % ring.len()])
        });
        match next {
            Some(content) => {
                grid.set(pos, cell.with_content(content));
                events.push(RoomEvent::effect(EffectKind::Sparkle, pos));
                self.check_promote(grid, pos, events);
                MagicOutcome::Transformed(content)
            }
            None => MagicOutcome::Nothing,
        }
    }

    /// Try to create a temporary block at `pos`.
    pub fn make_block(
        &mut self,
        grid: &mut Grid,
        pos: GridPos,
        session: &dyn SessionContext,
        objects: &mut dyn ObjectLayer,
        events: &mut Vec<RoomEvent>,
    ) -> MakeBlockOutcome {
        let pos = grid.wrap(pos);
        match objects.magic_at(pos) {
            MagicResponse::Blocked => return MakeBlockOutcome::Blocked,
            MagicResponse::Consumed => return MakeBlockOutcome::Consumed,
            MagicResponse::NotBlocked => {}
        }

        let cell = grid.get(pos);
        let open = cell.is_empty_equivalent()
            || (cell.is_hidden() && !cell.is_frozen() && !cell.is_temporary());
        if open {
            grid.set(pos, cell.to_temporary());
            events.push(RoomEvent::Effect {
                kind: EffectKind::Sparkle,
                pos,
                on_complete: Some(Completion::MakeBlockFinish(pos)),
            });
            return MakeBlockOutcome::Started;
        }

        if cell.is_frozen() && !session.is_apprentice() {
            return self.hit_frozen(grid, pos, events);
        }
        MakeBlockOutcome::Nothing
    }

    fn hit_frozen(
        &mut self,
        grid: &mut Grid,
        pos: GridPos,
        events: &mut Vec<RoomEvent>,
    ) -> MakeBlockOutcome {
        if self.frozen.target == Some(pos) {
            self.frozen.hits = self.frozen.hits.saturating_add(1);
        } else {
            self.frozen.target = Some(pos);
            self.frozen.hits = 1;
        }
        self.frozen.decay = FROZEN_HIT_DECAY_TICKS;

        if self.frozen.hits < FROZEN_HITS_TO_BREAK {
            events.push(RoomEvent::Cue { pos });
            return MakeBlockOutcome::FrozenHit {
                hits: self.frozen.hits,
            };
        }

        debug!(%pos, "frozen block broken");
        self.frozen = FrozenHits::default();
        self.melt(grid, pos, events);
        self.break_block(grid, pos, Some(EffectKind::Sparkle), true, events);
        MakeBlockOutcome::FrozenBroken
    }

    /// Completion of the make-block sparkle: the temporary block becomes a
    /// real covered block. No-op if the cell changed meanwhile.
    pub fn make_block_finish(
        &mut self,
        grid: &mut Grid,
        pos: GridPos,
        events: &mut Vec<RoomEvent>,
    ) -> bool {
        let pos = grid.wrap(pos);
        let cell = grid.get(pos);
        if !cell.is_temporary() {
            return false;
        }
        grid.set(pos, cell.settled().to_covered());
        events.push(RoomEvent::Cue { pos });
        true
    }

    /// Clear the frozen bit.
    pub fn melt(&mut self, grid: &mut Grid, pos: GridPos, events: &mut Vec<RoomEvent>) -> bool {
        let pos = grid.wrap(pos);
        let cell = grid.get(pos);
        if !cell.is_frozen() {
            return false;
        }
        grid.set(pos, cell.thawed());
        events.push(RoomEvent::effect(EffectKind::Remains, pos));
        self.check_promote(grid, pos, events);
        true
    }

    /// Break what magic can break, otherwise try to create a block.
    pub fn cast_magic(
        &mut self,
        grid: &mut Grid,
        pos: GridPos,
        session: &dyn SessionContext,
        objects: &mut dyn ObjectLayer,
        events: &mut Vec<RoomEvent>,
    ) -> CastOutcome {
        if is_magic_breakable(grid.get(pos))
            && self.break_block(grid, pos, Some(EffectKind::Sparkle), true, events)
        {
            return CastOutcome::Broke;
        }
        CastOutcome::Make(self.make_block(grid, pos, session, objects, events))
    }

    /// Promote the cell at `pos` into a falling object if it qualifies.
    pub fn check_promote(
        &mut self,
        grid: &mut Grid,
        pos: GridPos,
        events: &mut Vec<RoomEvent>,
    ) -> bool {
        let pos = grid.wrap(pos);
        let cell = grid.get(pos);
        if !cell.is_fully_visible() || !is_promotable(cell.content()) {
            return false;
        }
        grid.set(pos, Cell::EMPTY);
        events.push(RoomEvent::Promote {
            content: cell.content(),
            pos,
        });
        true
    }

    /// Promote every qualifying cell in the room.
    pub fn check_promote_all(&mut self, grid: &mut Grid, events: &mut Vec<RoomEvent>) -> usize {
        let candidates = grid.find(|cell| cell.is_fully_visible() && is_promotable(cell.content()));
        candidates
            .into_iter()
            .filter(|&pos| self.check_promote(grid, pos, events))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cover;
    use crate::events::NoObjects;
    use crate::session::Session;

    fn grid_with(pos: GridPos, cell: Cell) -> Grid {
        let mut grid = Grid::default();
        grid.set(pos, cell);
        grid
    }

    #[test]
    fn head_hit_cracks_before_revealing() {
        let pos = GridPos::new(3, 3);
        let mut grid = grid_with(pos, Cell::with_cover(Content::BLUE_COIN, Cover::Covered));
        let mut rules = BlockRules::new();
        let mut events = Vec::new();

        assert!(rules.head_hit(&mut grid, pos, &mut events));
        assert_eq!(grid.get(pos), Cell::with_cover(Content::BLUE_COIN, Cover::Cracked));

        assert!(rules.head_hit(&mut grid, pos, &mut events));
        assert_eq!(grid.get(pos), Cell::new(Content::BLUE_COIN));

        assert!(!rules.head_hit(&mut grid, pos, &mut events));
    }

    #[test]
    fn head_hit_walks_dirt_to_empty() {
        let pos = GridPos::new(1, 1);
        let mut grid = grid_with(pos, Cell::new(Content::DIRT));
        let mut rules = BlockRules::new();
        let mut events = Vec::new();
        rules.head_hit(&mut grid, pos, &mut events);
        assert_eq!(grid.get(pos).content(), Content::CRACKED_BLOCK);
        rules.head_hit(&mut grid, pos, &mut events);
        assert_eq!(grid.get(pos), Cell::EMPTY);
    }

    #[test]
    fn head_hit_turns_fake_concrete_into_cracked_block() {
        let pos = GridPos::new(1, 1);
        let mut grid = grid_with(pos, Cell::new(Content::FAKE_CONCRETE));
        let mut rules = BlockRules::new();
        assert!(rules.head_hit(&mut grid, pos, &mut Vec::new()));
        assert_eq!(grid.get(pos), Cell::new(Content::CRACKED_BLOCK));
    }

    #[test]
    fn gray_rabbit_reveals_as_rabbit() {
        let pos = GridPos::new(2, 2);
        let mut grid = grid_with(pos, Cell::with_cover(Content::GRAY_RABBIT, Cover::Cracked));
        let mut rules = BlockRules::new();
        rules.head_hit(&mut grid, pos, &mut Vec::new());
        assert_eq!(grid.get(pos), Cell::new(Content::RABBIT));
    }

    #[test]
    fn dense_cells_ignore_head_hits() {
        let pos = GridPos::new(2, 2);
        let covered_key = Cell::with_cover(Content::KEY, Cover::Covered);
        let mut grid = grid_with(pos, covered_key);
        let mut rules = BlockRules::new();
        assert!(!rules.head_hit(&mut grid, pos, &mut Vec::new()));
        assert_eq!(grid.get(pos), covered_key);
    }

    #[test]
    fn break_block_reveals_in_one_step_and_sparkles_only_with_anim() {
        let pos = GridPos::new(4, 4);
        let mut grid = grid_with(pos, Cell::with_cover(Content::RED_GEM, Cover::Covered));
        let mut rules = BlockRules::new();
        let mut events = Vec::new();
        assert!(rules.break_block(&mut grid, pos, None, true, &mut events));
        assert_eq!(grid.get(pos), Cell::new(Content::RED_GEM));
        assert!(events.is_empty());

        grid.set(pos, Cell::new(Content::DIRT));
        assert!(rules.break_block(&mut grid, pos, Some(EffectKind::Sparkle), true, &mut events));
        assert_eq!(grid.get(pos), Cell::EMPTY);
        assert_eq!(events, vec![RoomEvent::effect(EffectKind::Sparkle, pos)]);
    }

    #[test]
    fn ash_cascade_is_one_ring_deep() {
        let pos = GridPos::new(5, 5);
        let ash = Cell::new(Content::ASH);
        let mut grid = grid_with(pos, ash);
        grid.set(pos.offset(1, 0), ash);
        grid.set(pos.offset(2, 0), ash);
        grid.set(pos.offset(0, 1), ash.to_frozen());
        let mut rules = BlockRules::new();

        assert!(rules.break_block(&mut grid, pos, None, true, &mut Vec::new()));
        assert_eq!(grid.get(pos), Cell::EMPTY);
        assert_eq!(grid.get(pos.offset(1, 0)), Cell::EMPTY);
        assert_eq!(grid.get(pos.offset(2, 0)), ash);
        assert_eq!(grid.get(pos.offset(0, 1)), ash.to_frozen());
    }

    #[test]
    fn ash_without_cascade_leaves_neighbours() {
        let pos = GridPos::new(5, 5);
        let ash = Cell::new(Content::ASH);
        let mut grid = grid_with(pos, ash);
        grid.set(pos.offset(-1, 0), ash);
        let mut rules = BlockRules::new();
        assert!(rules.break_block(&mut grid, pos, None, false, &mut Vec::new()));
        assert_eq!(grid.get(pos.offset(-1, 0)), ash);
    }

    #[test]
    fn magic_block_cycles_ring_and_wraps() {
        let pos = GridPos::new(6, 2);
        let mut grid = grid_with(pos, Cell::new(Content::GOLD_COIN));
        let mut rules = BlockRules::new();
        let mut events = Vec::new();
        let seen: Vec<_> = (0..4)
            .map(|_| rules.magic_block(&mut grid, pos, &mut events))
            .collect();
        assert_eq!(
            seen,
            vec![
                MagicOutcome::Transformed(Content::GOLD_GEM),
                MagicOutcome::Transformed(Content::GOLD_JEWEL),
                MagicOutcome::Transformed(Content::GOLD_CHALICE),
                MagicOutcome::Transformed(Content::GOLD_COIN),
            ]
        );
    }

    #[test]
    fn magic_on_book_requests_ending() {
        let pos = GridPos::new(6, 2);
        let mut grid = grid_with(pos, Cell::new(Content::BOOK));
        let mut rules = BlockRules::new();
        let mut events = Vec::new();
        assert_eq!(rules.magic_block(&mut grid, pos, &mut events), MagicOutcome::Ending);
        assert_eq!(events, vec![RoomEvent::EndingSequence { pos }]);
        assert_eq!(grid.get(pos).content(), Content::BOOK);
    }

    #[test]
    fn make_block_is_temporary_until_finished() {
        let pos = GridPos::new(7, 7);
        let mut grid = Grid::default();
        let mut rules = BlockRules::new();
        let mut events = Vec::new();
        let outcome = rules.make_block(&mut grid, pos, &Session::new(), &mut NoObjects, &mut events);
        assert_eq!(outcome, MakeBlockOutcome::Started);
        assert!(grid.get(pos).is_temporary());
        assert_eq!(
            events[0],
            RoomEvent::Effect {
                kind: EffectKind::Sparkle,
                pos,
                on_complete: Some(Completion::MakeBlockFinish(pos)),
            }
        );

        assert!(rules.make_block_finish(&mut grid, pos, &mut events));
        assert_eq!(grid.get(pos), Cell::new(Content::DIRT));
        assert!(!rules.make_block_finish(&mut grid, pos, &mut events));
    }

    #[test]
    fn make_block_over_hidden_item_covers_it() {
        let pos = GridPos::new(7, 7);
        let mut grid = grid_with(pos, Cell::with_cover(Content::FAIRY, Cover::Hidden));
        let mut rules = BlockRules::new();
        let mut events = Vec::new();
        rules.make_block(&mut grid, pos, &Session::new(), &mut NoObjects, &mut events);
        rules.make_block_finish(&mut grid, pos, &mut events);
        assert_eq!(grid.get(pos), Cell::with_cover(Content::FAIRY, Cover::Covered));
    }

    struct Wall(MagicResponse);

    impl ObjectLayer for Wall {
        fn magic_at(&mut self, _pos: GridPos) -> MagicResponse {
            self.0
        }
    }

    #[test]
    fn make_block_respects_object_layer() {
        let pos = GridPos::new(7, 7);
        let mut grid = Grid::default();
        let mut rules = BlockRules::new();
        let mut events = Vec::new();
        let session = Session::new();
        assert_eq!(
            rules.make_block(&mut grid, pos, &session, &mut Wall(MagicResponse::Blocked), &mut events),
            MakeBlockOutcome::Blocked
        );
        assert_eq!(
            rules.make_block(&mut grid, pos, &session, &mut Wall(MagicResponse::Consumed), &mut events),
            MakeBlockOutcome::Consumed
        );
        assert_eq!(grid.get(pos), Cell::EMPTY);
        assert!(events.is_empty());
    }

    #[test]
    fn frozen_block_breaks_on_eighth_hit() {
        let a = GridPos::new(3, 8);
        let mut grid = grid_with(a, Cell::new(Content::DIRT).to_frozen());
        let mut rules = BlockRules::new();
        let session = Session::new();
        let mut events = Vec::new();
        for expected in 1..FROZEN_HITS_TO_BREAK {
            let outcome = rules.make_block(&mut grid, a, &session, &mut NoObjects, &mut events);
            assert_eq!(outcome, MakeBlockOutcome::FrozenHit { hits: expected });
            assert!(grid.get(a).is_frozen());
        }
        let outcome = rules.make_block(&mut grid, a, &session, &mut NoObjects, &mut events);
        assert_eq!(outcome, MakeBlockOutcome::FrozenBroken);
        assert_eq!(grid.get(a), Cell::EMPTY);
        assert_eq!(rules.frozen_hits(), None);
    }

    #[test]
    fn hitting_another_frozen_cell_resets_the_count() {
        let a = GridPos::new(3, 8);
        let b = GridPos::new(4, 8);
        let frozen = Cell::new(Content::DIRT).to_frozen();
        let mut grid = grid_with(a, frozen);
        grid.set(b, frozen);
        let mut rules = BlockRules::new();
        let session = Session::new();
        let mut events = Vec::new();

        rules.make_block(&mut grid, a, &session, &mut NoObjects, &mut events);
        rules.make_block(&mut grid, b, &session, &mut NoObjects, &mut events);
        assert_eq!(rules.frozen_hits(), Some((b, 1)));

        for _ in 0..7 {
            rules.make_block(&mut grid, a, &session, &mut NoObjects, &mut events);
        }
        assert!(grid.get(a).is_frozen());
        rules.make_block(&mut grid, a, &session, &mut NoObjects, &mut events);
        assert!(!grid.get(a).is_frozen());
    }

    #[test]
    fn frozen_hits_decay_over_time() {
        let a = GridPos::new(3, 8);
        let mut grid = grid_with(a, Cell::new(Content::DIRT).to_frozen());
        let mut rules = BlockRules::new();
        rules.make_block(&mut grid, a, &Session::new(), &mut NoObjects, &mut Vec::new());
        for _ in 0..FROZEN_HIT_DECAY_TICKS {
            rules.tick();
        }
        assert_eq!(rules.frozen_hits(), None);
    }

    #[test]
    fn apprentice_cannot_melt_through() {
        let a = GridPos::new(3, 8);
        let frozen = Cell::new(Content::DIRT).to_frozen();
        let mut grid = grid_with(a, frozen);
        let mut rules = BlockRules::new();
        let session = Session::apprentice();
        for _ in 0..10 {
            let outcome = rules.make_block(&mut grid, a, &session, &mut NoObjects, &mut Vec::new());
            assert_eq!(outcome, MakeBlockOutcome::Nothing);
        }
        assert_eq!(grid.get(a), frozen);
    }

    #[test]
    fn melt_clears_frozen_and_promotes() {
        let pos = GridPos::new(9, 9);
        let mut grid = grid_with(pos, Cell::new(Content::BELL).to_frozen());
        let mut rules = BlockRules::new();
        let mut events = Vec::new();
        assert!(rules.melt(&mut grid, pos, &mut events));
        assert_eq!(grid.get(pos), Cell::EMPTY);
        assert_eq!(
            events,
            vec![
                RoomEvent::effect(EffectKind::Remains, pos),
                RoomEvent::Promote {
                    content: Content::BELL,
                    pos
                },
            ]
        );
        assert!(!rules.melt(&mut grid, pos, &mut events));
    }

    #[test]
    fn revealing_a_reward_promotes_it() {
        let pos = GridPos::new(2, 9);
        let mut grid = grid_with(pos, Cell::with_cover(Content::REWARD_BAG, Cover::Covered));
        let mut rules = BlockRules::new();
        let mut events = Vec::new();
        rules.break_block(&mut grid, pos, None, true, &mut events);
        assert_eq!(grid.get(pos), Cell::EMPTY);
        assert!(events.contains(&RoomEvent::Promote {
            content: Content::REWARD_BAG,
            pos
        }));
    }

    #[test]
    fn cast_magic_breaks_blocks_and_builds_on_empty() {
        let pos = GridPos::new(2, 9);
        let mut grid = grid_with(pos, Cell::new(Content::DIRT));
        let mut rules = BlockRules::new();
        let session = Session::new();
        let mut events = Vec::new();
        assert_eq!(
            rules.cast_magic(&mut grid, pos, &session, &mut NoObjects, &mut events),
            CastOutcome::Broke
        );
        assert_eq!(
            rules.cast_magic(&mut grid, pos, &session, &mut NoObjects, &mut events),
            CastOutcome::Make(MakeBlockOutcome::Started)
        );
    }
}
