//! Software rendering module
//!
//! Every frame is composed on the CPU into a `Framebuffer`. The raycast
//! view is only used while playing; every other state draws a flat card.
//! `present` hands the finished frame to the GPU for display.

pub mod compositor;
pub mod font;
pub mod framebuffer;
pub mod present;
pub mod screens;
pub mod textures;

pub use compositor::Compositor;
pub use framebuffer::{Color, Framebuffer};
pub use present::{PresentError, Presenter};

use crate::highscores::HighScoreTable;
use crate::settings::Settings;
use crate::sim::level::LevelSet;
use crate::sim::state::{GameSession, GameState};

/// Frame composer for all game states
pub struct Renderer {
    frame: Framebuffer,
    compositor: Compositor,
}

impl Renderer {
    pub fn new(width: usize, height: usize, settings: &Settings) -> Self {
        Self {
            frame: Framebuffer::new(width, height),
            compositor: Compositor::new(width, height, settings),
        }
    }

    /// Compose the frame for the session's current state
    pub fn render(
        &mut self,
        session: &GameSession,
        levels: &LevelSet,
        scores: &HighScoreTable,
        fps: u32,
    ) -> &Framebuffer {
        let frame = session.frame_count;
        let fb = &mut self.frame;
        let level = levels.get(session.level_index);

        match (session.state, level) {
            (GameState::Title, _) => screens::title(fb, frame),
            (GameState::LevelIntro, Some(level)) => {
                screens::level_intro(fb, session.level_index, level, session.state_timer)
            }
            (GameState::Playing, Some(level)) => {
                self.compositor.render_playing(fb, session, level, fps)
            }
            (GameState::LevelComplete, Some(level)) => {
                screens::level_complete(fb, session, level, levels.len())
            }
            (GameState::GameOver, _) => screens::game_over(fb, session.state_timer),
            (GameState::Victory, _) => screens::victory(fb, levels.len(), frame),
            (GameState::NameEntry, _) => screens::name_entry(fb, session, frame),
            (GameState::HighScores, _) => {
                screens::high_scores(fb, scores, session.last_rank, frame)
            }
            (state, None) => {
                log::warn!(
                    "No level {} for {:?}; drawing blank frame",
                    session.level_index,
                    state
                );
                fb.clear(Color::BLACK);
            }
        }

        &self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::notation::NotationConfig;
    use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};

    #[test]
    fn test_every_state_renders() {
        let levels = LevelSet::builtin(&NotationConfig::default()).unwrap();
        let scores = HighScoreTable::new();
        let mut session = GameSession::new(&levels);
        let mut renderer = Renderer::new(SCREEN_WIDTH, SCREEN_HEIGHT, &Settings::default());

        let states = [
            GameState::Title,
            GameState::LevelIntro,
            GameState::Playing,
            GameState::LevelComplete,
            GameState::GameOver,
            GameState::Victory,
            GameState::NameEntry,
            GameState::HighScores,
        ];
        let mut frames = Vec::new();
        for state in states {
            session.state = state;
            let fb = renderer.render(&session, &levels, &scores, 60);
            assert_eq!(fb.width(), SCREEN_WIDTH);
            assert!(fb.pixels().iter().any(|&c| c != Color::BLACK));
            frames.push(fb.pixels().to_vec());
        }
        // Each state draws something distinct
        for i in 0..frames.len() {
            for j in i + 1..frames.len() {
                assert_ne!(frames[i], frames[j], "{:?} vs {:?}", states[i], states[j]);
            }
        }
    }
}
