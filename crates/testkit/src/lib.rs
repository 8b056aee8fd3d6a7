#![warn(missing_docs)]
//! Deterministic testing surfaces: room event logs, golden snapshots and the
//! micro-worldtest harness.

mod micro_worldtest;
mod snapshot;

use anyhow::{Context, Result};
use roomsim_core::SimTick;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub use micro_worldtest::*;
pub use snapshot::*;

/// One line of a room event log.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Tick the event was drained on.
    pub tick: SimTick,
    /// Short kind label.
    pub kind: &'a str,
    /// Event body.
    pub payload: serde_json::Value,
}

/// Newline-delimited JSON writer for event logs.
pub struct JsonlSink {
    out: BufWriter<File>,
    written: usize,
}

impl JsonlSink {
    /// Create (or truncate) the log at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create event log {}", path.display()))?;
        Ok(Self {
            out: BufWriter::new(file),
            written: 0,
        })
    }

    /// Append one record.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered lines to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().context("Failed to flush event log")
    }
}

/// End-of-run summary of one headless room run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Room number.
    pub room: u16,
    /// Story / variant tag.
    pub story: u16,
    /// Ticks stepped.
    pub ticks: u64,
    /// Event counts keyed by kind label.
    pub events: BTreeMap<String, usize>,
    /// Cells that are not plain empty at the end of the run.
    pub occupied_cells: usize,
}

impl RunSummary {
    /// Count one event of `kind`.
    pub fn count(&mut self, kind: &str) {
        *self.events.entry(kind.to_string()).or_insert(0) += 1;
    }

    /// Write as pretty JSON, creating parent directories if needed.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }
}
