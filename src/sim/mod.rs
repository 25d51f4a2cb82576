//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (enemy slot order)
//! - No rendering, audio or platform dependencies; side effects leave as
//!   `GameEvent`s for the caller to act on

pub mod collision;
pub mod combat;
pub mod grid;
pub mod level;
pub mod raycast;
pub mod state;
pub mod tick;

pub use collision::slide_move;
pub use combat::{fire, in_firing_cone, update_enemies};
pub use grid::{Cell, TileGrid};
pub use level::{Level, LevelDescriptor, LevelError, LevelSet};
pub use raycast::{Axis, HitKind, RayHit, RayTable, cast_ray};
pub use state::{
    Enemy, GameEvent, GameSession, GameState, MusicCue, NameEntry, Player, Pose, RunStats,
};
pub use tick::{TickInput, Tuning, tick};
