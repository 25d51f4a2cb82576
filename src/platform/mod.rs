//! Platform abstraction layer
//!
//! Handles the native host side of the game:
//! - Keyboard (and optional gamepad) input mapped onto game intents
//! - Fixed-step pacing and the FPS counter

#[cfg(feature = "gamepad")]
pub mod gamepad;
pub mod input;
pub mod time;

pub use input::{InputState, Intent};
pub use time::{FixedStep, FpsCounter};
