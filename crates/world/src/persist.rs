//! Room pack persistence with zstd compression.
//!
//! A pack bundles every room of a game plus recorded input replays. On disk
//! it is a 14-byte header followed by a zstd-compressed bincode payload,
//! validated with CRC32.

use crate::layout::Layout;
use crate::room::TickInput;
use anyhow::{Context, Result};
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Magic number for pack file identification ("RMPK").
const PACK_MAGIC: u32 = 0x524D_504B;

/// Current pack format version.
const PACK_VERSION: u16 = 1;

const HEADER_LEN: usize = 14;

/// Pack file header structure.
#[derive(Debug, Clone)]
struct PackHeader {
    magic: u32,
    version: u16,
    crc32: u32,
    payload_len: u32,
}

impl PackHeader {
    fn new(crc32: u32, payload_len: u32) -> Self {
        Self {
            magic: PACK_MAGIC,
            version: PACK_VERSION,
            crc32,
            payload_len,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN);
        bytes.extend_from_slice(&self.magic.to_le_bytes());
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.crc32.to_le_bytes());
        bytes.extend_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            anyhow::bail!("Pack header too short");
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != PACK_MAGIC {
            anyhow::bail!(
                "Invalid pack magic: expected 0x{:08X}, got 0x{:08X}",
                PACK_MAGIC,
                magic
            );
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        let crc32 = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let payload_len = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

        Ok(Self {
            magic,
            version,
            crc32,
            payload_len,
        })
    }
}

/// Recorded per-tick input for one room.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputReplay {
    pub room: u16,
    pub story: u16,
    pub frames: Vec<TickInput>,
}

/// Many rooms plus their recorded replays.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutPack {
    pub rooms: Vec<Layout>,
    pub replays: Vec<InputReplay>,
}

impl LayoutPack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the room with the same number and story tag.
    pub fn insert(&mut self, layout: Layout) {
        match self
            .rooms
            .iter_mut()
            .find(|r| r.number == layout.number && r.story == layout.story)
        {
            Some(existing) => *existing = layout,
            None => self.rooms.push(layout),
        }
    }

    /// A fresh copy of the room. The pack's own instance is never handed
    /// out because rooms mutate their layout while running.
    pub fn room(&self, number: u16, story: u16) -> Option<Layout> {
        self.rooms
            .iter()
            .find(|r| r.number == number && r.story == story)
            .cloned()
    }

    pub fn replay(&self, index: usize) -> Option<&InputReplay> {
        self.replays.get(index)
    }

    /// Encode to the on-disk byte form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let serialized = bincode::serialize(self).context("Failed to serialize pack")?;

        // Level 3 matches the rest of the workspace's zstd use.
        let compressed =
            zstd::encode_all(&serialized[..], 3).context("Failed to compress pack")?;

        let mut hasher = Hasher::new();
        hasher.update(&compressed);
        let crc32 = hasher.finalize();

        let header = PackHeader::new(crc32, compressed.len() as u32);
        let mut bytes = header.to_bytes();
        bytes.extend_from_slice(&compressed);
        Ok(bytes)
    }

    /// Decode the on-disk byte form. Any damage is a load failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = PackHeader::from_bytes(bytes)?;
        let end = HEADER_LEN + header.payload_len as usize;
        if bytes.len() < end {
            anyhow::bail!(
                "Pack payload truncated: expected {} bytes, got {}",
                header.payload_len,
                bytes.len() - HEADER_LEN
            );
        }
        let compressed = &bytes[HEADER_LEN..end];

        let mut hasher = Hasher::new();
        hasher.update(compressed);
        let computed_crc = hasher.finalize();
        if computed_crc != header.crc32 {
            anyhow::bail!(
                "CRC32 mismatch: expected {:08X}, got {:08X}",
                header.crc32,
                computed_crc
            );
        }

        let decompressed = zstd::decode_all(compressed).context("Failed to decompress pack")?;
        bincode::deserialize(&decompressed).context("Failed to deserialize pack")
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create pack directory")?;
        }
        let bytes = self.to_bytes()?;
        let mut file = File::create(path).context("Failed to create pack file")?;
        file.write_all(&bytes).context("Failed to write pack")?;
        info!(path = %path.display(), rooms = self.rooms.len(), "saved room pack");
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).context("Failed to open pack file")?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .context("Failed to read pack file")?;
        let pack = Self::from_bytes(&bytes)?;
        info!(
            path = %path.display(),
            rooms = pack.rooms.len(),
            replays = pack.replays.len(),
            "loaded room pack"
        );
        Ok(pack)
    }
}
