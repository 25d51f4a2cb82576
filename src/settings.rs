//! Game settings and preferences
//!
//! Persisted as `settings.json` in the data directory. Every tunable the
//! two game variants disagree on lives here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::audio::notation::NotationConfig;
use crate::persistence::{self, PersistError};
use crate::sim::tick::Tuning;

/// File name inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Variant presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Profile {
    /// Low-pitched music, detailed textures
    #[default]
    Blaster,
    /// Brighter music, plain textures
    Hunters,
}

impl Profile {
    /// Music pitch multiplier applied to the equal-tempered frequency
    pub fn pitch_scale(&self) -> f32 {
        match self {
            Profile::Blaster => 0.25,
            Profile::Hunters => 0.5,
        }
    }

    pub fn texture_detail(&self) -> TextureDetail {
        match self {
            Profile::Blaster => TextureDetail::High,
            Profile::Hunters => TextureDetail::Low,
        }
    }
}

/// Wall texture fidelity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TextureDetail {
    /// Plain brick everywhere
    Low,
    /// Per-level texture sets with accent tiles
    #[default]
    High,
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub profile: Profile,

    // === Tuning ===
    /// Music pitch multiplier
    pub pitch_scale: f32,
    /// Note duration multiplier
    pub tempo_scale: f32,
    /// Radians per tick
    pub turn_speed: f32,
    /// Grid units per tick
    pub move_speed: f32,
    /// Ticks between blaster sounds
    pub shoot_cooldown_frames: u32,
    pub texture_detail: TextureDetail,

    // === HUD ===
    pub show_fps: bool,
    pub show_minimap: bool,
    pub show_timer: bool,
    /// Ask for initials on a qualifying score
    pub name_entry: bool,

    // === Render ===
    /// Cast every other column and duplicate it
    pub half_resolution: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    /// JSON level pack replacing the built-in levels
    pub level_pack: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_profile(Profile::default())
    }
}

impl Settings {
    /// Create settings from a profile (applies profile defaults)
    pub fn from_profile(profile: Profile) -> Self {
        Self {
            profile,
            pitch_scale: profile.pitch_scale(),
            tempo_scale: 2.0,
            turn_speed: 0.05,
            move_speed: 0.08,
            shoot_cooldown_frames: 10,
            texture_detail: profile.texture_detail(),

            show_fps: true,
            show_minimap: true,
            show_timer: true,
            name_entry: true,

            half_resolution: true,

            master_volume: 0.8,
            music_volume: 0.7,
            sfx_volume: 1.0,
            muted: false,

            level_pack: None,
        }
    }

    /// Effective music gain
    pub fn music_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.music_volume).clamp(0.0, 1.0)
        }
    }

    /// Effective effect gain
    pub fn sfx_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    pub fn tuning(&self) -> Tuning {
        Tuning {
            turn_speed: self.turn_speed,
            move_speed: self.move_speed,
            name_entry: self.name_entry,
        }
    }

    /// Notation settings for a device running at `sample_rate`
    pub fn notation(&self, sample_rate: u32) -> NotationConfig {
        NotationConfig {
            pitch_scale: self.pitch_scale,
            tempo_scale: self.tempo_scale,
            sample_rate,
        }
    }

    /// Load from a JSON file; absent or invalid files yield defaults
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) if e.is_not_found() => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::info!("{e}; using default settings");
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self, PersistError> {
        let bytes = persistence::read(path)?;
        Self::from_json(&bytes).map_err(|source| PersistError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse settings JSON
    ///
    /// Profile-dependent fields the file leaves out take the chosen
    /// profile's values rather than the default profile's.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        let given = |key: &str| value.get(key).is_some();
        let (keep_pitch, keep_detail) = (given("pitch_scale"), given("texture_detail"));

        let mut settings: Settings = serde_json::from_value(value)?;
        if !keep_pitch {
            settings.pitch_scale = settings.profile.pitch_scale();
        }
        if !keep_detail {
            settings.texture_detail = settings.profile.texture_detail();
        }
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        let json = serde_json::to_vec_pretty(self).map_err(|source| PersistError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        persistence::write_atomic(path, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
