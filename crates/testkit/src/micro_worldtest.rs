//! Micro-worldtests: step a tiny room for a fixed number of ticks, snapshot
//! chosen state, compare the report against a golden file.

use crate::snapshot::assert_json_snapshot;
use anyhow::Result;
use roomsim_core::SimTick;
use serde::Serialize;
use std::path::PathBuf;

/// Which ticks end up in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capture {
    /// One frame per tick.
    #[default]
    EveryTick,
    /// Tick 0 plus every tick whose snapshot differs from the last recorded
    /// one. Keeps long runs of a mostly idle room readable.
    OnChange,
}

/// Configuration for a micro-worldtest.
#[derive(Debug, Clone)]
pub struct MicroWorldtestConfig {
    /// Written into the report.
    pub name: String,
    /// Number of steps; tick 0 is captured before the first one.
    pub ticks: u64,
    /// Frame selection.
    pub capture: Capture,
    /// Golden JSON file.
    pub snapshot_path: PathBuf,
}

impl MicroWorldtestConfig {
    /// Every-tick capture into `snapshot_path`.
    pub fn new(name: impl Into<String>, ticks: u64, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            ticks,
            capture: Capture::EveryTick,
            snapshot_path: snapshot_path.into(),
        }
    }

    /// Switch to [`Capture::OnChange`].
    pub fn on_change(mut self) -> Self {
        self.capture = Capture::OnChange;
        self
    }
}

/// One captured frame.
#[derive(Debug, Clone, Serialize)]
pub struct MicroWorldtestFrame<S> {
    /// Tick number.
    pub tick: u64,
    /// Snapshot payload.
    pub snapshot: S,
}

#[derive(Debug, Clone, Serialize)]
struct MicroWorldtestReport<S> {
    name: String,
    ticks: u64,
    frames: Vec<MicroWorldtestFrame<S>>,
}

/// Collect the frames of a run without touching the filesystem.
pub fn record_frames<State, Snapshot, StepFn, SnapFn>(
    ticks: u64,
    capture: Capture,
    state: &mut State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> Vec<MicroWorldtestFrame<Snapshot>>
where
    Snapshot: PartialEq,
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let mut tick = SimTick::ZERO;
    let mut frames = vec![MicroWorldtestFrame {
        tick: tick.0,
        snapshot: snapshot(tick, state),
    }];

    for _ in 0..ticks {
        step(tick, state);
        tick = tick.advance(1);
        let snap = snapshot(tick, state);
        let changed = frames.last().map_or(true, |last| last.snapshot != snap);
        if capture == Capture::EveryTick || changed {
            frames.push(MicroWorldtestFrame {
                tick: tick.0,
                snapshot: snap,
            });
        }
    }
    frames
}

/// Run a micro-worldtest and assert (or update) its golden file.
pub fn run_micro_worldtest<State, Snapshot, StepFn, SnapFn>(
    config: MicroWorldtestConfig,
    mut state: State,
    step: StepFn,
    snapshot: SnapFn,
) -> Result<()>
where
    Snapshot: Serialize + PartialEq,
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let frames = record_frames(config.ticks, config.capture, &mut state, step, snapshot);
    let report = MicroWorldtestReport {
        name: config.name,
        ticks: config.ticks,
        frames,
    };
    assert_json_snapshot(config.snapshot_path, &report)
}
