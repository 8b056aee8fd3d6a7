#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod heading;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

pub use heading::Heading;

/// Fixed logical tick (one update per rendered frame, no wall-clock input).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }

    /// Ticks elapsed since `earlier`, saturating at zero.
    pub fn since(self, earlier: SimTick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Helper to derive a reproducible RNG for one room visit.
///
/// The room number and story tag are folded into the seed so two rooms
/// entered with the same session seed still draw independent sequences.
pub fn scoped_rng(session_seed: u64, room: u16, story: u16) -> StdRng {
    let room_hash = (u64::from(story) << 16) | u64::from(room);
    let seed = session_seed ^ room_hash.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(seed)
}
