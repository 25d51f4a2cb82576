//! Fixed timestep state machine tick
//!
//! One call per displayed frame. Only `Playing` runs movement, AI and combat;
//! the other states count down timers and wait for confirm.

use super::collision::slide_move;
use super::combat::{fire, update_enemies};
use super::level::LevelSet;
use super::state::{GameEvent, GameSession, GameState, MusicCue};
use crate::consts::*;
use crate::highscores::{HighScoreEntry, HighScoreTable, calculate_score};
use crate::{heading, normalize_angle};

/// Input intents for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub forward: bool,
    pub back: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    /// Held state; firing triggers on the press edge
    pub fire: bool,
    /// Held state; screens advance on the press edge
    pub confirm: bool,
    /// Toggle between title and the leaderboard
    pub show_scores: bool,
}

/// Movement and feature tunables read by the tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Radians per tick
    pub turn_speed: f32,
    /// Grid units per tick
    pub move_speed: f32,
    /// Ask for initials on a qualifying score
    pub name_entry: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            turn_speed: 0.05,
            move_speed: 0.08,
            name_entry: true,
        }
    }
}

/// Name recorded when initials entry is disabled
const ANONYMOUS: [u8; 3] = *b"---";

/// Press edges derived from the held state of this and the previous tick
#[derive(Debug, Clone, Copy, Default)]
struct Pressed {
    confirm: bool,
    show_scores: bool,
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl Pressed {
    fn between(prev: &TickInput, now: &TickInput) -> Self {
        Self {
            confirm: now.confirm && !prev.confirm,
            show_scores: now.show_scores && !prev.show_scores,
            up: now.forward && !prev.forward,
            down: now.back && !prev.back,
            left: now.turn_left && !prev.turn_left,
            right: now.turn_right && !prev.turn_right,
        }
    }
}

/// Advance the session by one tick
pub fn tick(
    session: &mut GameSession,
    input: &TickInput,
    levels: &LevelSet,
    scores: &mut HighScoreTable,
    tuning: &Tuning,
) {
    let pressed = Pressed::between(&session.prev_input, input);
    session.prev_input = *input;
    session.frame_count += 1;
    session.state_timer = session.state_timer.saturating_sub(1);

    let before = session.state;
    match session.state {
        GameState::Title => {
            if pressed.confirm {
                start_run(session, levels);
            } else if pressed.show_scores {
                enter_high_scores(session);
            }
        }
        GameState::LevelIntro => {
            if session.state_timer == 0 {
                session.state = GameState::Playing;
            }
        }
        GameState::Playing => tick_playing(session, input, tuning),
        GameState::LevelComplete => {
            let confirmed = pressed.confirm && session.state_timer < LEVEL_COMPLETE_CONFIRM_AFTER;
            if confirmed || session.state_timer == 0 {
                let next = session.level_index + 1;
                match levels.get(next) {
                    Some(level) => session.load_level(next, level),
                    None => {
                        session.final_score = run_score(session);
                        session.state = GameState::Victory;
                        session.state_timer = VICTORY_TICKS;
                    }
                }
            }
        }
        GameState::GameOver => {
            let confirmed = pressed.confirm && session.state_timer < GAME_OVER_CONFIRM_AFTER;
            if confirmed || session.state_timer == 0 {
                if scores.qualifies(session.final_score) {
                    begin_name_entry(session, scores, tuning);
                } else {
                    return_to_title(session);
                }
            }
        }
        GameState::Victory => {
            if pressed.confirm || session.state_timer == 0 {
                if scores.qualifies(session.final_score) {
                    begin_name_entry(session, scores, tuning);
                } else {
                    enter_high_scores(session);
                }
            }
        }
        GameState::NameEntry => {
            let entry = &mut session.name_entry;
            if pressed.up {
                entry.cycle(1);
            }
            if pressed.down {
                entry.cycle(-1);
            }
            if pressed.left {
                entry.move_cursor(-1);
            }
            if pressed.right {
                entry.move_cursor(1);
            }
            if pressed.confirm {
                let letters = session.name_entry.letters;
                record_score(session, scores, letters);
                enter_high_scores(session);
            }
        }
        GameState::HighScores => {
            if session.state_timer == 0 && (pressed.confirm || pressed.show_scores) {
                return_to_title(session);
            }
        }
    }

    if session.state != before {
        log::debug!("State {:?} -> {:?}", before, session.state);
    }
}

fn tick_playing(session: &mut GameSession, input: &TickInput, tuning: &Tuning) {
    session.level_frames += 1;

    let player = &mut session.player;
    if input.turn_left {
        player.pose.angle -= tuning.turn_speed;
    }
    if input.turn_right {
        player.pose.angle += tuning.turn_speed;
    }
    player.pose.angle = normalize_angle(player.pose.angle);

    let facing = heading(player.pose.angle);
    // Screen y grows downward, so the left-hand side is facing rotated by -90 degrees
    let left = glam::Vec2::new(facing.y, -facing.x);
    let mut step = glam::Vec2::ZERO;
    if input.forward {
        step += facing;
    }
    if input.back {
        step -= facing;
    }
    if input.strafe_left {
        step += left;
    }
    if input.strafe_right {
        step -= left;
    }
    if step != glam::Vec2::ZERO {
        let delta = step.normalize() * tuning.move_speed;
        player.pose.pos = slide_move(&session.grid, player.pose.pos, delta);
    }
    player.invulnerable_frames = player.invulnerable_frames.saturating_sub(1);

    let contact = update_enemies(&session.grid, &mut session.enemies, &mut session.player);
    if contact.player_hit {
        session.emit(GameEvent::PlayerHit);
    }

    let fire_pressed = input.fire && !session.player.fire_latched;
    session.player.fire_latched = input.fire;
    if fire_pressed {
        session.emit(GameEvent::Shot);
        if fire(&mut session.enemies, &mut session.player).is_some() {
            session.emit(GameEvent::EnemyKilled);
        }
    }

    session.refresh_distances();

    // Losing outranks clearing the level on the same tick
    if session.player.lives == 0 {
        session.accumulate_level();
        session.final_score = run_score(session);
        session.state = GameState::GameOver;
        session.state_timer = GAME_OVER_TICKS;
        session.emit(GameEvent::Music(MusicCue::Dirge));
        log::info!("Game over with score {}", session.final_score);
    } else if session.player.kills >= session.kills_required {
        session.accumulate_level();
        session.state = GameState::LevelComplete;
        session.state_timer = LEVEL_COMPLETE_TICKS;
        session.emit(GameEvent::LevelUp);
        session.emit(GameEvent::Music(MusicCue::Fanfare));
        log::info!(
            "Level {} complete in {} frames",
            session.level_index + 1,
            session.level_frames
        );
    }
}

fn start_run(session: &mut GameSession, levels: &LevelSet) {
    session.reset_run();
    if let Some(first) = levels.get(0) {
        session.load_level(0, first);
    }
}

fn run_score(session: &GameSession) -> u32 {
    calculate_score(session.run.kills, session.run.frames)
}

fn begin_name_entry(session: &mut GameSession, scores: &mut HighScoreTable, tuning: &Tuning) {
    if tuning.name_entry {
        session.name_entry = Default::default();
        session.state = GameState::NameEntry;
    } else {
        record_score(session, scores, ANONYMOUS);
        enter_high_scores(session);
    }
}

fn record_score(session: &mut GameSession, scores: &mut HighScoreTable, name: [u8; 3]) {
    let entry = HighScoreEntry::new(
        name,
        session.final_score,
        session.run.frames,
        session.run.kills,
        session.run.max_level,
    );
    session.last_rank = scores.insert(entry);
    session.emit(GameEvent::HighScoresChanged);
}

fn enter_high_scores(session: &mut GameSession) {
    session.state = GameState::HighScores;
    session.state_timer = HIGH_SCORES_DEBOUNCE_TICKS;
}

fn return_to_title(session: &mut GameSession) {
    session.state = GameState::Title;
    session.emit(GameEvent::Music(MusicCue::Silence));
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::audio::notation::NotationConfig;
    use crate::sim::state::Enemy;

    fn setup() -> (GameSession, LevelSet, HighScoreTable) {
        let levels = LevelSet::builtin(&NotationConfig::default()).unwrap();
        let session = GameSession::new(&levels);
        (session, levels, HighScoreTable::default())
    }

    fn press(
        session: &mut GameSession,
        levels: &LevelSet,
        scores: &mut HighScoreTable,
        input: TickInput,
    ) {
        tick(session, &input, levels, scores, &Tuning::default());
        tick(session, &TickInput::default(), levels, scores, &Tuning::default());
    }

    fn run_ticks(
        session: &mut GameSession,
        levels: &LevelSet,
        scores: &mut HighScoreTable,
        n: u32,
    ) {
        for _ in 0..n {
            tick(session, &TickInput::default(), levels, scores, &Tuning::default());
        }
    }

    fn confirm() -> TickInput {
        TickInput {
            confirm: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_title_to_playing() {
        let (mut session, levels, mut scores) = setup();
        press(&mut session, &levels, &mut scores, confirm());
        assert_eq!(session.state, GameState::LevelIntro);
        run_ticks(&mut session, &levels, &mut scores, LEVEL_INTRO_TICKS);
        assert_eq!(session.state, GameState::Playing);
    }

    #[test]
    fn test_held_confirm_does_not_repeat() {
        let (mut session, levels, mut scores) = setup();
        enter_high_scores(&mut session);
        for _ in 0..HIGH_SCORES_DEBOUNCE_TICKS + 5 {
            tick(&mut session, &confirm(), &levels, &mut scores, &Tuning::default());
        }
        assert_eq!(session.state, GameState::HighScores);
        run_ticks(&mut session, &levels, &mut scores, 1);
        session.drain_events();
        press(&mut session, &levels, &mut scores, confirm());
        assert_eq!(session.state, GameState::Title);
        assert!(session
            .drain_events()
            .contains(&GameEvent::Music(MusicCue::Silence)));
    }

    #[test]
    fn test_confirm_skips_level_complete_once_prompted() {
        let (mut session, levels, mut scores) = setup();
        session.state = GameState::LevelComplete;
        session.state_timer = LEVEL_COMPLETE_TICKS;
        press(&mut session, &levels, &mut scores, confirm());
        assert_eq!(session.state, GameState::LevelComplete);

        session.state_timer = LEVEL_COMPLETE_CONFIRM_AFTER;
        press(&mut session, &levels, &mut scores, confirm());
        assert_eq!(session.state, GameState::LevelIntro);
        assert_eq!(session.level_index, 1);
    }

    #[test]
    fn test_enemy_contact_on_last_life_ends_game() {
        let (mut session, levels, mut scores) = setup();
        session.state = GameState::Playing;
        session.player.lives = 1;
        session.player.invulnerable_frames = 0;
        let pos = session.player.pose.pos;
        session.enemies[0] = Enemy::spawn(pos + Vec2::new(0.1, 0.0));

        tick(&mut session, &TickInput::default(), &levels, &mut scores, &Tuning::default());
        assert_eq!(session.player.lives, 0);
        assert_eq!(session.state, GameState::GameOver);
        assert_eq!(session.state_timer, GAME_OVER_TICKS);
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::PlayerHit));
        assert!(events.contains(&GameEvent::Music(MusicCue::Dirge)));
    }

    #[test]
    fn test_kills_complete_level_and_accumulate() {
        let (mut session, levels, mut scores) = setup();
        session.state = GameState::Playing;
        session.player.kills = session.kills_required - 1;
        let pose = session.player.pose;
        session.enemies[0] = Enemy::spawn(pose.pos + heading(pose.angle) * 3.0);
        let fire_input = TickInput {
            fire: true,
            ..Default::default()
        };

        tick(&mut session, &fire_input, &levels, &mut scores, &Tuning::default());
        assert_eq!(session.state, GameState::LevelComplete);
        assert_eq!(session.run.kills, session.kills_required);
        assert_eq!(session.run.frames, 1);
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::Shot));
        assert!(events.contains(&GameEvent::LevelUp));

        run_ticks(&mut session, &levels, &mut scores, LEVEL_COMPLETE_TICKS);
        assert_eq!(session.state, GameState::LevelIntro);
        assert_eq!(session.level_index, 1);
    }

    #[test]
    fn test_fire_is_edge_triggered() {
        let (mut session, levels, mut scores) = setup();
        session.state = GameState::Playing;
        session.player.fire_latched = false;
        let fire_input = TickInput {
            fire: true,
            ..Default::default()
        };
        for _ in 0..5 {
            tick(&mut session, &fire_input, &levels, &mut scores, &Tuning::default());
        }
        let shots = session
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::Shot)
            .count();
        assert_eq!(shots, 1);
    }

    #[test]
    fn test_last_level_leads_to_victory_then_name_entry() {
        let (mut session, levels, mut scores) = setup();
        let last = levels.len() - 1;
        session.load_level(last, &levels.levels[last]);
        session.state = GameState::LevelComplete;
        session.state_timer = 1;
        session.run.kills = 15;
        session.run.frames = 3600;
        tick(&mut session, &TickInput::default(), &levels, &mut scores, &Tuning::default());
        assert_eq!(session.state, GameState::Victory);
        assert_eq!(session.final_score, calculate_score(15, 3600));

        press(&mut session, &levels, &mut scores, confirm());
        assert_eq!(session.state, GameState::NameEntry);

        let up = TickInput {
            forward: true,
            ..Default::default()
        };
        press(&mut session, &levels, &mut scores, up);
        press(&mut session, &levels, &mut scores, confirm());
        assert_eq!(session.state, GameState::HighScores);
        assert_eq!(session.last_rank, Some(1));
        assert_eq!(&scores.entries()[0].name, b"BAA");
    }

    #[test]
    fn test_game_over_without_qualifying_returns_to_title() {
        let (mut session, levels, mut scores) = setup();
        for _ in 0..scores.capacity() {
            scores.insert(HighScoreEntry::new(*b"TOP", u32::MAX, 0, 0, 1));
        }
        session.state = GameState::GameOver;
        session.state_timer = GAME_OVER_TICKS;
        session.final_score = 10;

        // Confirm is ignored early on
        press(&mut session, &levels, &mut scores, confirm());
        assert_eq!(session.state, GameState::GameOver);

        run_ticks(&mut session, &levels, &mut scores, GAME_OVER_TICKS);
        assert_eq!(session.state, GameState::Title);
        assert!(session
            .drain_events()
            .contains(&GameEvent::Music(MusicCue::Silence)));
    }

    #[test]
    fn test_disabled_name_entry_records_anonymous() {
        let (mut session, levels, mut scores) = setup();
        session.state = GameState::GameOver;
        session.state_timer = 1;
        session.final_score = 500;
        let tuning = Tuning {
            name_entry: false,
            ..Default::default()
        };
        tick(&mut session, &TickInput::default(), &levels, &mut scores, &tuning);
        assert_eq!(session.state, GameState::HighScores);
        assert_eq!(&scores.entries()[0].name, b"---");
    }

    #[test]
    fn test_movement_slides_and_turns() {
        let (mut session, levels, mut scores) = setup();
        session.state = GameState::Playing;
        session.enemies.clear();
        session.player.pose = crate::sim::state::Pose::new(1.5, 1.5, 0.0);
        let input = TickInput {
            forward: true,
            turn_right: true,
            ..Default::default()
        };
        tick(&mut session, &input, &levels, &mut scores, &Tuning::default());
        assert!((session.player.pose.angle - 0.05).abs() < 1e-6);
        assert!(session.player.pose.pos.x > 1.5);
    }
}
