use crate::config::SimConfig;
use anyhow::{Context, Result};
use roomsim_testkit::{EventRecord, JsonlSink, RunSummary};
use roomsim_world::{
    Cell, InputReplay, Layout, LayoutPack, NoObjects, RoomSim, Session, TickInput,
};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Enter the configured room, step it and log what it emits.
pub fn run(cfg: &SimConfig) -> Result<RunSummary> {
    let (layout, replay) = load_room(cfg);
    let mut session = if cfg.apprentice {
        Session::apprentice()
    } else {
        Session::new()
    };
    session.clear_doors_for(layout.number);

    let mut summary = RunSummary {
        room: layout.number,
        story: layout.story,
        ..RunSummary::default()
    };
    let mut sink = match cfg.events.as_deref() {
        Some(path) => Some(open_sink(path)?),
        None => None,
    };

    let mut sim = RoomSim::enter(layout, &mut session, cfg.seed);
    drain(&mut sim, sink.as_mut(), &mut summary)?;

    let idle = TickInput::default();
    for step in 0..cfg.ticks {
        let input = replay
            .as_ref()
            .and_then(|r| usize::try_from(step).ok().and_then(|i| r.frames.get(i)))
            .unwrap_or(&idle);
        sim.tick(input, &mut session, &mut NoObjects);
        drain(&mut sim, sink.as_mut(), &mut summary)?;
    }

    if let Some(sink) = sink.as_mut() {
        sink.flush()?;
    }

    summary.ticks = sim.ticks_in_room();
    summary.occupied_cells = sim.layout().grid.find(|cell| cell != Cell::EMPTY).len();
    info!(
        room = summary.room,
        story = summary.story,
        ticks = summary.ticks,
        events = summary.events.values().sum::<usize>(),
        "Headless run finished"
    );

    if let Some(path) = cfg.summary.as_deref() {
        summary.write_to(path)?;
    }
    Ok(summary)
}

fn load_room(cfg: &SimConfig) -> (Layout, Option<InputReplay>) {
    let blank = || Layout::new(cfg.room, cfg.story, 0, 0);
    let Some(path) = cfg.pack.as_deref() else {
        return (blank(), None);
    };

    let pack = match LayoutPack::load(path) {
        Ok(pack) => pack,
        Err(err) => {
            warn!(%err, path = %path.display(), "Failed to load room pack; using a blank room");
            return (blank(), None);
        }
    };

    let layout = pack.room(cfg.room, cfg.story).unwrap_or_else(|| {
        warn!(
            room = cfg.room,
            story = cfg.story,
            "Room missing from pack; using a blank room"
        );
        blank()
    });

    let replay = cfg.replay.and_then(|index| match pack.replay(index) {
        Some(replay) if replay.room == cfg.room && replay.story == cfg.story => {
            Some(replay.clone())
        }
        Some(replay) => {
            warn!(
                index,
                replay_room = replay.room,
                room = cfg.room,
                "Replay recorded for a different room; ignoring it"
            );
            None
        }
        None => {
            warn!(index, "Replay index out of range; running without input");
            None
        }
    });

    (layout, replay)
}

fn open_sink(path: &Path) -> Result<JsonlSink> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log dir {}", parent.display()))?;
    }
    JsonlSink::create(path)
}

fn drain(
    sim: &mut RoomSim,
    mut sink: Option<&mut JsonlSink>,
    summary: &mut RunSummary,
) -> Result<()> {
    let tick = sim.now();
    for event in sim.take_events() {
        summary.count(event.kind());
        if let Some(sink) = sink.as_deref_mut() {
            let record = EventRecord {
                tick,
                kind: event.kind(),
                payload: serde_json::to_value(&event)?,
            };
            sink.write(&record)?;
        }
    }
    Ok(())
}
