//! High score leaderboard system
//!
//! Persisted as a fixed-layout binary record, tracks the top 5 runs.

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use crate::consts::TIME_BUDGET_FRAMES;
use crate::persistence::{self, PersistError};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;
/// Initials per entry
pub const NAME_LEN: usize = 3;
/// File name inside the data directory
pub const HIGH_SCORES_FILE: &str = "highscores.bin";

const MAGIC: [u8; 4] = *b"DBHS";
const VERSION: u32 = 1;

/// Reason a stored table was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("wrong record size ({0} bytes)")]
    Size(usize),
    #[error("bad magic tag")]
    Magic,
    #[error("unsupported version {0}")]
    Version(u32),
    #[error("entry count {0} out of range")]
    Count(u32),
    #[error("invalid name in slot {0}")]
    Name(usize),
    #[error("entries out of order")]
    Order,
}

/// Score for a finished run
///
/// Kills are worth 1000 each; the remaining time budget adds a bonus of one
/// point per six frames, never negative.
pub fn calculate_score(total_kills: u32, total_frames: u32) -> u32 {
    let time_bonus = TIME_BUDGET_FRAMES.saturating_sub(total_frames) / 6;
    total_kills.saturating_mul(1000).saturating_add(time_bonus)
}

/// A single high score entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighScoreEntry {
    /// Player initials (uppercase ASCII)
    pub name: [u8; NAME_LEN],
    pub score: u32,
    /// Run length in frames
    pub time_frames: u32,
    pub kills: u32,
    /// Highest level reached (1-based)
    pub max_level: u32,
}

impl HighScoreEntry {
    pub fn new(name: [u8; NAME_LEN], score: u32, time_frames: u32, kills: u32, max_level: u32) -> Self {
        Self {
            name,
            score,
            time_frames,
            kills,
            max_level,
        }
    }

    pub fn name_str(&self) -> &str {
        std::str::from_utf8(&self.name).unwrap_or("???")
    }
}

/// On-disk entry; the name is padded to keep the record free of padding bytes
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct RawEntry {
    name: [u8; 4],
    score: u32,
    time_frames: u32,
    kills: u32,
    max_level: u32,
}

/// On-disk table: magic tag, version, entry count, fixed entry array
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct RawTable {
    magic: [u8; 4],
    version: u32,
    count: u32,
    entries: [RawEntry; MAX_HIGH_SCORES],
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighScoreTable {
    entries: Vec<HighScoreEntry>,
}

impl HighScoreTable {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    pub fn capacity(&self) -> usize {
        MAX_HIGH_SCORES
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert an entry, keeping order and capacity
    ///
    /// Ties go after existing entries of the same score. Returns the rank
    /// achieved (1-indexed) or None if the entry fell off the table.
    pub fn insert(&mut self, entry: HighScoreEntry) -> Option<usize> {
        let rank = self.potential_rank(entry.score)?;
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    /// Serialize to the fixed-layout record
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut raw = RawTable::zeroed();
        raw.magic = MAGIC;
        raw.version = VERSION;
        raw.count = self.entries.len() as u32;
        for (slot, e) in raw.entries.iter_mut().zip(&self.entries) {
            slot.name[..NAME_LEN].copy_from_slice(&e.name);
            slot.score = e.score;
            slot.time_frames = e.time_frames;
            slot.kills = e.kills;
            slot.max_level = e.max_level;
        }
        bytemuck::bytes_of(&raw).to_vec()
    }

    /// Parse a fixed-layout record, rejecting anything that fails validation
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        let raw: RawTable = bytemuck::try_pod_read_unaligned(bytes)
            .map_err(|_| RecordError::Size(bytes.len()))?;
        if raw.magic != MAGIC {
            return Err(RecordError::Magic);
        }
        if raw.version != VERSION {
            return Err(RecordError::Version(raw.version));
        }
        let count = raw.count as usize;
        if count > MAX_HIGH_SCORES {
            return Err(RecordError::Count(raw.count));
        }

        let mut entries = Vec::with_capacity(count);
        for (i, slot) in raw.entries[..count].iter().enumerate() {
            let mut name = [0u8; NAME_LEN];
            name.copy_from_slice(&slot.name[..NAME_LEN]);
            if !name.iter().all(|c| c.is_ascii_uppercase() || *c == b'-') {
                return Err(RecordError::Name(i));
            }
            entries.push(HighScoreEntry::new(
                name,
                slot.score,
                slot.time_frames,
                slot.kills,
                slot.max_level,
            ));
        }
        if entries.windows(2).any(|w| w[0].score < w[1].score) {
            return Err(RecordError::Order);
        }
        Ok(Self { entries })
    }

    /// Read and validate the table stored at `path`
    pub fn read(path: &Path) -> Result<Self, PersistError> {
        let bytes = persistence::read(path)?;
        Self::from_bytes(&bytes).map_err(|source| PersistError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from disk; absence or corruption yields an empty table
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(table) => {
                log::info!("Loaded {} high scores", table.entries.len());
                table
            }
            Err(e) if e.is_not_found() => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("{e}; starting with an empty table");
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        persistence::write_atomic(path, &self.to_bytes())?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// Format a frame count as M:SS
pub fn format_time(frames: u32) -> String {
    let seconds = frames / crate::consts::TICKS_PER_SECOND;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
