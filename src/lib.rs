//! Demon Blaster - a first-person raycasting demon shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, raycasting, combat, state machine)
//! - `renderer`: Software compositor plus wgpu presentation
//! - `audio`: Music sequencer and effect synthesis on producer threads
//! - `highscores`: Score formula and the persisted leaderboard
//! - `settings`: Tunable configuration and variant profiles
//! - `persistence`: Atomic file storage
//! - `platform`: Input intent mapping and frame timing

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::{HighScoreEntry, HighScoreTable, calculate_score};
pub use settings::{Profile, Settings, TextureDetail};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Framebuffer dimensions
    pub const SCREEN_WIDTH: usize = 480;
    pub const SCREEN_HEIGHT: usize = 272;

    /// Horizontal field of view (radians, 60 degrees)
    pub const FOV: f32 = 1.047;
    /// Simulation and display cadence
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Most ticks run for one displayed frame after a stall
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Largest grid a level may declare (cells per side)
    pub const MAX_MAP_SIZE: usize = 36;
    /// Enemy slots per level
    pub const MAX_ENEMIES: usize = 46;
    pub const MAX_LIVES: u8 = 3;

    /// Wall texture resolution (texels per side)
    pub const TEXTURE_SIZE: usize = 32;
    /// Walls fade to the fog floor at this distance (grid units)
    pub const VISIBILITY_RANGE: f32 = 20.0;
    /// Fog multiplier floor, in 1/256 units
    pub const MIN_FOG_FP: i32 = 38;
    /// Sprites nearer than this are not drawn
    pub const MIN_SPRITE_DISTANCE: f32 = 0.5;

    /// Enemy movement
    pub const ENEMY_SPEED: f32 = 0.02;
    /// Enemies stop closing inside this range
    pub const ENEMY_STOP_DISTANCE: f32 = 1.0;
    /// Contact closer than this costs a life
    pub const ENEMY_DAMAGE_DISTANCE: f32 = 0.5;
    pub const INVULNERABILITY_FRAMES: u32 = 120;
    /// Damage border is drawn while invulnerability is above this
    pub const DAMAGE_FLASH_THRESHOLD: u32 = 100;
    pub const DEATH_ANIMATION_FRAMES: u32 = 12;

    /// Hit-scan cone half-width (radians, ~5 degrees)
    pub const SHOT_CONE: f32 = 0.087;
    pub const SHOT_RANGE: f32 = 15.0;

    /// State machine timers (ticks)
    pub const LEVEL_INTRO_TICKS: u32 = 120;
    pub const LEVEL_COMPLETE_TICKS: u32 = 150;
    /// Confirm skips the rest of the level complete card below this
    pub const LEVEL_COMPLETE_CONFIRM_AFTER: u32 = 80;
    pub const GAME_OVER_TICKS: u32 = 240;
    /// Confirm is ignored on the game over screen until the timer drops below this
    pub const GAME_OVER_CONFIRM_AFTER: u32 = 180;
    pub const VICTORY_TICKS: u32 = 900;
    pub const HIGH_SCORES_DEBOUNCE_TICKS: u32 = 30;

    /// Score time budget (ticks); see `calculate_score`
    pub const TIME_BUDGET_FRAMES: u32 = 216_000;

    /// Audio
    pub const SAMPLE_RATE: u32 = 22_050;
    /// Stereo frames per emitted block
    pub const AUDIO_BLOCK_FRAMES: usize = 512;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit direction for a facing angle
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((normalize_angle(-0.5) + 0.5).abs() < 1e-6);
        assert!(normalize_angle(PI) < PI);
    }
}
