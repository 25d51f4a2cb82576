//! Game session state and core simulation types
//!
//! One `GameSession` is owned by the main loop and mutated only by `tick`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::TileGrid;
use super::level::{Level, LevelSet};
use crate::consts::*;
use crate::highscores::NAME_LEN;

/// Screen-level state of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Title screen, waiting for confirm
    Title,
    /// Level card with countdown
    LevelIntro,
    /// Active raycast gameplay
    Playing,
    /// Level cleared card
    LevelComplete,
    /// Out of lives
    GameOver,
    /// Every level cleared
    Victory,
    /// Entering initials for a qualifying score
    NameEntry,
    /// Leaderboard
    HighScores,
}

/// Position and facing in grid units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub pos: Vec2,
    /// Facing angle (radians)
    pub angle: f32,
}

impl Pose {
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            angle,
        }
    }
}

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pose: Pose,
    pub lives: u8,
    /// Kills this level
    pub kills: u32,
    pub invulnerable_frames: u32,
    /// Fire was held last tick (fire is edge-triggered)
    #[serde(skip)]
    pub fire_latched: bool,
}

impl Player {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            lives: MAX_LIVES,
            kills: 0,
            invulnerable_frames: 0,
            fire_latched: false,
        }
    }

    /// Recently hit; drives the damage border
    #[inline]
    pub fn recently_hit(&self) -> bool {
        self.invulnerable_frames > DAMAGE_FLASH_THRESHOLD
    }
}

/// A demon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    /// False once fully dead: no collision, rendering, AI or combat
    pub alive: bool,
    /// Nonzero while dying: rendered flashing, otherwise inert
    pub death_frames: u32,
    /// Distance to the player, refreshed once per tick
    #[serde(skip)]
    pub distance: f32,
}

impl Enemy {
    pub fn spawn(pos: Vec2) -> Self {
        Self {
            pos,
            alive: true,
            death_frames: 0,
            distance: 0.0,
        }
    }

    /// Alive and not dying
    #[inline]
    pub fn is_threat(&self) -> bool {
        self.alive && self.death_frames == 0
    }

    #[inline]
    pub fn is_dying(&self) -> bool {
        self.alive && self.death_frames > 0
    }
}

/// Run-wide accumulators for scoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub kills: u32,
    pub frames: u32,
    /// Highest level reached (1-based)
    pub max_level: u32,
}

/// Initials being typed on the name entry screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameEntry {
    pub letters: [u8; NAME_LEN],
    pub cursor: usize,
}

impl Default for NameEntry {
    fn default() -> Self {
        Self {
            letters: [b'A'; NAME_LEN],
            cursor: 0,
        }
    }
}

impl NameEntry {
    /// Cycle the letter under the cursor through A-Z
    pub fn cycle(&mut self, delta: i32) {
        let letter = &mut self.letters[self.cursor];
        let idx = (*letter - b'A') as i32;
        *letter = b'A' + (idx + delta).rem_euclid(26) as u8;
    }

    pub fn move_cursor(&mut self, delta: i32) {
        self.cursor = (self.cursor as i32 + delta).clamp(0, NAME_LEN as i32 - 1) as usize;
    }
}

/// Music selection requested by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicCue {
    Level(usize),
    Fanfare,
    Dirge,
    Silence,
}

/// Side effects produced by a tick, drained by the main loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Fire pressed
    Shot,
    EnemyKilled,
    PlayerHit,
    /// Level cleared, play the level-up arpeggio
    LevelUp,
    Music(MusicCue),
    /// Table changed and should be persisted
    HighScoresChanged,
}

/// The authoritative game session
#[derive(Debug, Clone)]
pub struct GameSession {
    pub state: GameState,
    /// Index into the level set
    pub level_index: usize,
    pub grid: TileGrid,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    /// Kills needed to clear the current level
    pub kills_required: u32,
    /// Ticks since the session was created (animation clock)
    pub frame_count: u64,
    /// Countdown for timed states
    pub state_timer: u32,
    /// Ticks spent playing the current level
    pub level_frames: u32,
    pub run: RunStats,
    /// Score of the finished run, set on GameOver/Victory
    pub final_score: u32,
    /// 1-based rank of the last inserted score
    pub last_rank: Option<usize>,
    pub name_entry: NameEntry,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) prev_input: super::tick::TickInput,
}

impl GameSession {
    /// Fresh session on the title screen
    pub fn new(levels: &LevelSet) -> Self {
        let first = &levels.levels[0];
        let mut session = Self {
            state: GameState::Title,
            level_index: 0,
            grid: first.grid.clone(),
            player: Player::new(first.spawn),
            enemies: Vec::with_capacity(MAX_ENEMIES),
            kills_required: first.kills_required,
            frame_count: 0,
            state_timer: 0,
            level_frames: 0,
            run: RunStats::default(),
            final_score: 0,
            last_rank: None,
            name_entry: NameEntry::default(),
            events: Vec::new(),
            prev_input: Default::default(),
        };
        session.populate(first);
        session
    }

    /// Install a level's grid, spawn and enemies; lives carry over
    pub fn load_level(&mut self, index: usize, level: &Level) {
        self.level_index = index;
        self.populate(level);
        self.player.pose = level.spawn;
        self.player.kills = 0;
        self.player.invulnerable_frames = 0;
        self.player.fire_latched = true;
        self.level_frames = 0;
        self.state = GameState::LevelIntro;
        self.state_timer = LEVEL_INTRO_TICKS;
        self.run.max_level = self.run.max_level.max(index as u32 + 1);
        self.emit(GameEvent::Music(MusicCue::Level(index)));
        log::info!("Loaded level {} ({})", index + 1, level.name);
    }

    fn populate(&mut self, level: &Level) {
        self.grid = level.grid.clone();
        self.kills_required = level.kills_required;
        self.enemies.clear();
        self.enemies
            .extend(level.enemy_spawns.iter().take(MAX_ENEMIES).map(|&p| Enemy::spawn(p)));
    }

    /// Reset lives and run statistics for a new run
    pub fn reset_run(&mut self) {
        self.player.lives = MAX_LIVES;
        self.run = RunStats::default();
        self.final_score = 0;
        self.last_rank = None;
        self.name_entry = NameEntry::default();
    }

    /// Fold the current level's kills and time into the run totals
    pub fn accumulate_level(&mut self) {
        self.run.kills += self.player.kills;
        self.run.frames += self.level_frames;
    }

    /// Recompute each living enemy's distance to the player
    pub fn refresh_distances(&mut self) {
        let player = self.player.pose.pos;
        for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
            enemy.distance = enemy.pos.distance(player);
        }
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::notation::NotationConfig;

    #[test]
    fn test_name_entry_cycles_and_clamps() {
        let mut entry = NameEntry::default();
        entry.cycle(-1);
        assert_eq!(entry.letters[0], b'Z');
        entry.cycle(2);
        assert_eq!(entry.letters[0], b'B');
        entry.move_cursor(10);
        assert_eq!(entry.cursor, NAME_LEN - 1);
        entry.move_cursor(-10);
        assert_eq!(entry.cursor, 0);
    }

    #[test]
    fn test_load_level_resets_level_state() {
        let levels = LevelSet::builtin(&NotationConfig::default()).unwrap();
        let mut session = GameSession::new(&levels);
        session.player.kills = 3;
        session.player.lives = 1;
        session.load_level(1, &levels.levels[1]);
        assert_eq!(session.state, GameState::LevelIntro);
        assert_eq!(session.player.kills, 0);
        assert_eq!(session.player.lives, 1);
        assert_eq!(session.enemies.len(), levels.levels[1].enemy_spawns.len());
        assert_eq!(session.run.max_level, 2);
        assert_eq!(
            session.drain_events(),
            vec![GameEvent::Music(MusicCue::Level(1))]
        );
    }
}
