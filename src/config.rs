use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/roomsim.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimConfig {
    /// Room pack to load. A blank room is used when unset.
    pub pack: Option<PathBuf>,
    pub room: u16,
    /// Story / variant tag of the room.
    pub story: u16,
    /// Ticks to step after entering the room.
    pub ticks: u64,
    pub seed: u64,
    pub apprentice: bool,
    /// JSONL event log destination.
    pub events: Option<PathBuf>,
    /// End-of-run summary destination.
    pub summary: Option<PathBuf>,
    /// Index of the pack replay to feed as per-tick input.
    pub replay: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            pack: None,
            room: 1,
            story: 0,
            ticks: 600,
            seed: 0,
            apprentice: false,
            events: None,
            summary: None,
            replay: None,
        }
    }
}

impl SimConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<SimConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    SimConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("Config not found at {}. Using defaults", path.display());
                }
                SimConfig::default()
            }
        }
    }
}
