//! Level descriptors, the built-in level set and JSON level packs
//!
//! Descriptors are static input. Loading validates the grid, spawn points
//! and music notation once, so nothing downstream has an error path.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grid::{Cell, TileGrid};
use super::state::{MusicCue, Pose};
use crate::audio::notation::{Note, NotationConfig, NotationError, parse_notation};
use crate::consts::MAX_ENEMIES;

/// Errors raised while loading level content
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level grid is empty")]
    EmptyGrid,
    #[error("level grid {width}x{height} exceeds the maximum size")]
    GridTooLarge { width: usize, height: usize },
    #[error("grid row {row} has a different width than row 0")]
    RaggedRow { row: usize },
    #[error("unknown grid cell {ch:?} at ({x}, {y})")]
    UnknownCell { ch: char, x: usize, y: usize },
    #[error("level {level:?} has {count} enemies, more than the enemy table holds")]
    TooManyEnemies { level: String, count: usize },
    #[error("level {level:?} requires {required} kills but spawns only {available}")]
    UnreachableKillCount {
        level: String,
        required: u32,
        available: usize,
    },
    #[error("level {level:?} places an entity inside a wall at ({x}, {y})")]
    SpawnInWall { level: String, x: f32, y: f32 },
    #[error("level {level:?} music: {source}")]
    Music {
        level: String,
        #[source]
        source: NotationError,
    },
    #[error("level pack contains no levels")]
    EmptyPack,
    #[error("failed to read level pack: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse level pack: {0}")]
    Json(#[from] serde_json::Error),
}

/// Spawn pose as written in level data
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnPose {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

/// Externally supplied level content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDescriptor {
    pub name: String,
    /// Rows of `#` (wall) and `.` (empty)
    pub map: Vec<String>,
    pub player: SpawnPose,
    /// Enemy spawn positions (cell-space floats)
    pub enemies: Vec<[f32; 2]>,
    pub kills_required: u32,
    /// Theme color as RGB
    pub theme: [u8; 3],
    /// Note-notation music string
    pub music: String,
}

/// On-disk level pack format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelPack {
    pub levels: Vec<LevelDescriptor>,
}

/// A validated, ready-to-play level
#[derive(Debug, Clone)]
pub struct Level {
    pub name: String,
    pub grid: TileGrid,
    pub spawn: Pose,
    pub enemy_spawns: Vec<Vec2>,
    pub kills_required: u32,
    pub theme: [u8; 3],
    pub music: Vec<Note>,
}

impl Level {
    pub fn load(desc: &LevelDescriptor, notation: &NotationConfig) -> Result<Self, LevelError> {
        let grid = TileGrid::parse(&desc.map)?;
        if !grid.is_enclosed() {
            log::warn!("Level {:?} is not fully enclosed by walls", desc.name);
        }

        if desc.enemies.len() > MAX_ENEMIES {
            return Err(LevelError::TooManyEnemies {
                level: desc.name.clone(),
                count: desc.enemies.len(),
            });
        }
        if desc.kills_required as usize > desc.enemies.len() {
            return Err(LevelError::UnreachableKillCount {
                level: desc.name.clone(),
                required: desc.kills_required,
                available: desc.enemies.len(),
            });
        }

        let in_wall = |x: f32, y: f32| grid.get(x.floor() as i32, y.floor() as i32) != Some(Cell::Empty);
        let spawn_points = std::iter::once([desc.player.x, desc.player.y]).chain(desc.enemies.iter().copied());
        for [x, y] in spawn_points {
            if in_wall(x, y) {
                return Err(LevelError::SpawnInWall {
                    level: desc.name.clone(),
                    x,
                    y,
                });
            }
        }

        let music = parse_notation(&desc.music, notation).map_err(|source| LevelError::Music {
            level: desc.name.clone(),
            source,
        })?;

        Ok(Self {
            name: desc.name.clone(),
            grid,
            spawn: Pose::new(desc.player.x, desc.player.y, desc.player.angle),
            enemy_spawns: desc.enemies.iter().map(|&[x, y]| Vec2::new(x, y)).collect(),
            kills_required: desc.kills_required,
            theme: desc.theme,
            music,
        })
    }
}

/// Music used outside of levels
#[derive(Debug, Clone)]
pub struct Tracks {
    pub fanfare: Vec<Note>,
    pub dirge: Vec<Note>,
}

/// All levels of a run plus the interstitial tracks
#[derive(Debug, Clone)]
pub struct LevelSet {
    pub levels: Vec<Level>,
    pub tracks: Tracks,
}

impl LevelSet {
    pub fn from_descriptors(
        descs: &[LevelDescriptor],
        notation: &NotationConfig,
    ) -> Result<Self, LevelError> {
        if descs.is_empty() {
            return Err(LevelError::EmptyPack);
        }
        let levels = descs
            .iter()
            .map(|d| Level::load(d, notation))
            .collect::<Result<Vec<_>, _>>()?;
        let track = |name: &str, text: &str| {
            parse_notation(text, notation).map_err(|source| LevelError::Music {
                level: name.to_string(),
                source,
            })
        };
        let tracks = Tracks {
            fanfare: track("fanfare", FANFARE)?,
            dirge: track("dirge", DIRGE)?,
        };
        log::info!("Loaded {} levels", levels.len());
        Ok(Self { levels, tracks })
    }

    pub fn builtin(notation: &NotationConfig) -> Result<Self, LevelError> {
        Self::from_descriptors(&builtin_descriptors(), notation)
    }

    /// Load a JSON level pack from disk
    pub fn from_json_file(path: &Path, notation: &NotationConfig) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path)?;
        let pack: LevelPack = serde_json::from_str(&text)?;
        Self::from_descriptors(&pack.levels, notation)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Notes for a music cue; `None` means stop the music
    pub fn track(&self, cue: MusicCue) -> Option<&[Note]> {
        match cue {
            MusicCue::Level(index) => self.get(index).map(|l| l.music.as_slice()),
            MusicCue::Fanfare => Some(&self.tracks.fanfare),
            MusicCue::Dirge => Some(&self.tracks.dirge),
            MusicCue::Silence => None,
        }
    }
}

const FANFARE: &str = "C5:150 E5:150 G5:150 C6:450 R:300 G5:150 C6:600 R:600";
const DIRGE: &str = "A3:500 G3:500 F3:500 E3:1000 R:500 D3:500 E3:1500 R:1000";

struct BuiltinLevel {
    name: &'static str,
    map: &'static [&'static str],
    player: (f32, f32, f32),
    enemies: &'static [[f32; 2]],
    kills_required: u32,
    theme: [u8; 3],
    music: &'static str,
}

const BUILTIN_LEVELS: &[BuiltinLevel] = &[
    BuiltinLevel {
        name: "THE CRYPT",
        map: &[
            "############",
            "#..........#",
            "#..##..##..#",
            "#..#....#..#",
            "#..........#",
            "#.##.##.##.#",
            "#..........#",
            "#..#....#..#",
            "#..##..##..#",
            "#..........#",
            "#..........#",
            "############",
        ],
        player: (1.5, 1.5, 0.8),
        enemies: &[[5.5, 4.5], [9.5, 6.5], [2.5, 9.5], [10.5, 10.5], [6.5, 9.5]],
        kills_required: 4,
        theme: [0xCC, 0x44, 0x22],
        music: "E4:200 G4:200 A4:400 R:100 E4:200 G4:200 B4:400 R:100 A4:200 G4:200 E4:400 D4:200 E4:600 R:200",
    },
    BuiltinLevel {
        name: "BONE HALLS",
        map: &[
            "################",
            "#......#.......#",
            "#.####.#.#####.#",
            "#.#..........#.#",
            "#.#.##.##.##.#.#",
            "#..............#",
            "#.#.##.##.##.#.#",
            "#.#..........#.#",
            "#.####.#.#####.#",
            "#......#.......#",
            "#..............#",
            "################",
        ],
        player: (1.5, 10.5, 0.0),
        enemies: &[
            [8.5, 5.5],
            [14.5, 1.5],
            [3.5, 3.5],
            [12.5, 7.5],
            [1.5, 5.5],
            [10.5, 9.5],
        ],
        kills_required: 5,
        theme: [0x88, 0xAA, 0x33],
        music: "A3:300 C4:300 D#4:300 E4:600 R:150 D4:300 C4:300 A3:600 R:300",
    },
    BuiltinLevel {
        name: "THE PIT",
        map: &[
            "##############",
            "#............#",
            "#.##########.#",
            "#.#........#.#",
            "#.#.######.#.#",
            "#.#.#....#.#.#",
            "#...#....#...#",
            "#.#.#....#.#.#",
            "#.#.##..##.#.#",
            "#.#........#.#",
            "#.##########.#",
            "#............#",
            "#............#",
            "##############",
        ],
        player: (1.5, 12.5, -std::f32::consts::FRAC_PI_2),
        enemies: &[
            [6.5, 6.5],
            [7.5, 5.5],
            [5.5, 3.5],
            [10.5, 9.5],
            [12.5, 1.5],
            [1.5, 1.5],
            [8.5, 11.5],
            [12.5, 6.5],
        ],
        kills_required: 6,
        theme: [0x77, 0x33, 0xCC],
        music: "D4:150 F4:150 G#4:150 A4:300 R:100 G4:150 F4:150 D4:450 R:150 C#4:150 D4:600 R:300",
    },
];

/// The levels shipped with the game, as descriptors
pub fn builtin_descriptors() -> Vec<LevelDescriptor> {
    BUILTIN_LEVELS
        .iter()
        .map(|b| LevelDescriptor {
            name: b.name.to_string(),
            map: b.map.iter().map(|r| r.to_string()).collect(),
            player: SpawnPose {
                x: b.player.0,
                y: b.player.1,
                angle: b.player.2,
            },
            enemies: b.enemies.to_vec(),
            kills_required: b.kills_required,
            theme: b.theme,
            music: b.music.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_levels_validate() {
        let set = LevelSet::builtin(&NotationConfig::default()).unwrap();
        assert_eq!(set.len(), BUILTIN_LEVELS.len());
        for level in &set.levels {
            assert!(level.grid.is_enclosed(), "{} is open", level.name);
            assert!(!level.music.is_empty());
        }
    }

    #[test]
    fn test_spawn_in_wall_rejected() {
        let mut desc = builtin_descriptors().remove(0);
        desc.enemies[0] = [0.5, 0.5];
        let err = Level::load(&desc, &NotationConfig::default()).unwrap_err();
        assert!(matches!(err, LevelError::SpawnInWall { .. }));
    }

    #[test]
    fn test_bad_music_fails_fast() {
        let mut desc = builtin_descriptors().remove(0);
        desc.music = "C4:100 H9:100".to_string();
        let err = Level::load(&desc, &NotationConfig::default()).unwrap_err();
        assert!(matches!(err, LevelError::Music { .. }));
    }

    #[test]
    fn test_level_pack_json_roundtrip() {
        let pack = LevelPack {
            levels: builtin_descriptors(),
        };
        let json = serde_json::to_string(&pack).unwrap();
        let path = std::env::temp_dir().join(format!("demon-blaster-pack-{}.json", std::process::id()));
        std::fs::write(&path, json).unwrap();
        let set = LevelSet::from_json_file(&path, &NotationConfig::default()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(set.levels[1].name, "BONE HALLS");
    }

    #[test]
    fn test_empty_pack_rejected() {
        assert!(matches!(
            LevelSet::from_descriptors(&[], &NotationConfig::default()),
            Err(LevelError::EmptyPack)
        ));
    }

    #[test]
    fn test_music_cues_resolve() {
        let set = LevelSet::builtin(&NotationConfig::default()).unwrap();
        assert_eq!(set.track(MusicCue::Level(2)).map(|t| t.len()), Some(set.levels[2].music.len()));
        assert!(set.track(MusicCue::Level(99)).is_none());
        assert!(set.track(MusicCue::Silence).is_none());
        assert!(!set.track(MusicCue::Dirge).unwrap_or_default().is_empty());
    }
}
