//! Full-screen cards for every state except `Playing`
//!
//! These are flat fills, gradients and text only; none of them touch the
//! raycaster.

use super::compositor::theme_highlight;
use super::font::{draw_centered, draw_text, text_width};
use super::framebuffer::{Color, Framebuffer};
use crate::consts::*;
use crate::highscores::{HighScoreTable, format_time};
use crate::sim::level::Level;
use crate::sim::state::GameSession;

const VERSION: &str = concat!("V", env!("CARGO_PKG_VERSION"));

mod palette {
    use super::Color;

    pub const TITLE_RED: Color = Color::rgb(0xDD, 0x44, 0x22);
    pub const TITLE_SHADOW: Color = Color::rgb(0xBB, 0x33, 0x11);
    pub const TITLE_GOLD: Color = Color::rgb(0xFF, 0xCC, 0x33);
    pub const TITLE_GOLD_SHADOW: Color = Color::rgb(0xDD, 0xAA, 0x22);
    pub const TITLE_RULE: Color = Color::rgb(0x44, 0x22, 0x00);
    pub const DIM: Color = Color::rgb(0x55, 0x55, 0x55);
    pub const HINT: Color = Color::rgb(0x88, 0x88, 0x88);
    pub const PALE: Color = Color::rgb(0xFF, 0xEE, 0xDD);
    pub const LIGHT: Color = Color::rgb(0xDD, 0xDD, 0xDD);
    pub const BAR_BG: Color = Color::rgb(0x22, 0x22, 0x22);
    pub const BLOOD: Color = Color::rgb(0xFF, 0x22, 0x22);
    pub const BONE: Color = Color::rgb(0xCC, 0xCC, 0xCC);
    pub const GOLD: Color = Color::rgb(0xFF, 0xDD, 0x00);
    pub const AMBER: Color = Color::rgb(0xFF, 0xAA, 0x00);
    pub const GOLD_RULE: Color = Color::rgb(0xAA, 0x88, 0x00);
    pub const CURSOR: Color = Color::rgb(0xFF, 0xCC, 0x00);
}

/// On for `period` frames, off for `period` frames
#[inline]
fn blink(frame: u64, period: u64) -> bool {
    (frame / period) % 2 == 0
}

/// Fill each row with a colour chosen from its y coordinate
fn gradient(fb: &mut Framebuffer, mut shade: impl FnMut(i32) -> Color) {
    for y in 0..fb.height() {
        let color = shade(y as i32);
        if let Some(row) = fb.row_mut(y) {
            row.fill(color);
        }
    }
}

/// `level * theme / 255` per channel
fn theme_scaled(theme: [u8; 3], level: u32) -> Color {
    let ch = |t: u8| (level * t as u32 / 255) as u8;
    Color::rgb(ch(theme[0]), ch(theme[1]), ch(theme[2]))
}

fn theme_divided(theme: [u8; 3], div: u8) -> Color {
    Color::rgb(theme[0] / div, theme[1] / div, theme[2] / div)
}

/// Text drawn twice with a one-pixel offset highlight over a shadow
fn embossed(fb: &mut Framebuffer, y: i32, text: &str, main: Color, shadow: Color, scale: i32) {
    draw_centered(fb, y, text, shadow, scale);
    let x = (fb.width() as i32 - text_width(text, scale)) / 2;
    draw_text(fb, x + 1, y - 1, text, main, scale);
    draw_centered(fb, y, text, main, scale);
}

pub fn title(fb: &mut Framebuffer, frame: u64) {
    let h = fb.height() as i32;
    let w = fb.width() as i32;
    gradient(fb, |y| {
        let s = (8 + y * 20 / h) as u8;
        Color::rgb(s, s / 3, s / 4)
    });

    // Rolling scanlines
    let offset = (frame / 2) as usize;
    for y in (0..fb.height()).step_by(3) {
        if (y + offset) % 6 >= 2 {
            continue;
        }
        if let Some(row) = fb.row_mut(y) {
            row.iter_mut().for_each(|c| *c = c.half());
        }
    }

    embossed(fb, 40, "DEMON", palette::TITLE_RED, palette::TITLE_SHADOW, 3);
    embossed(fb, 68, "BLASTER", palette::TITLE_GOLD, palette::TITLE_GOLD_SHADOW, 3);
    draw_centered(fb, 96, VERSION, palette::DIM, 1);
    fb.hline(140, w - 140, 106, palette::TITLE_RULE);

    if blink(frame, 30) {
        draw_centered(fb, 130, "PRESS START", Color::WHITE, 2);
    }

    draw_centered(fb, 200, "ARROWS MOVE   SPACE FIRE", palette::HINT, 1);
    draw_centered(fb, 215, "Q E STRAFE   H SCORES", palette::HINT, 1);
    fb.fill_rect(0, h - 2, w, 2, palette::TITLE_RULE);
}

/// Level card; `timer` counts down from `LEVEL_INTRO_TICKS`
pub fn level_intro(fb: &mut Framebuffer, level_index: usize, level: &Level, timer: u32) {
    let h = fb.height() as i32;
    let w = fb.width() as i32;
    let theme = level.theme;
    let fade = LEVEL_INTRO_TICKS.saturating_sub(timer).min(30);
    let shade = fade * 255 / 30;

    gradient(fb, |y| theme_scaled(theme, (5 + y * 8 / h) as u32));
    let rule = theme_divided(theme, 4);
    fb.hline(60, w - 60, 70, rule);
    fb.hline(60, w - 60, 200, rule);

    let number = format!("LEVEL {:02}", level_index + 1);
    draw_centered(fb, 90, &number, theme_scaled(theme, shade), 3);
    let name = Color::rgb(
        (shade * 0xFF / 255) as u8,
        (shade * 0xEE / 255) as u8,
        (shade * 0xDD / 255) as u8,
    );
    draw_centered(fb, 125, &level.name, name, 2);

    if timer < 60 && blink(timer as u64, 10) {
        draw_centered(fb, 165, "GET READY", Color::from_array(theme), 2);
    }
}

/// Level-cleared card with campaign progress
pub fn level_complete(
    fb: &mut Framebuffer,
    session: &GameSession,
    level: &Level,
    total_levels: usize,
) {
    let h = fb.height() as i32;
    let w = fb.width() as i32;
    let theme = level.theme;
    let bright = theme_highlight(theme);
    let accent = Color::from_array(theme);

    gradient(fb, |y| theme_scaled(theme, (8 + y * 15 / h) as u32));
    draw_centered(fb, 30, "LEVEL COMPLETE", bright, 2);
    fb.hline(80, w - 80, 56, theme_divided(theme, 3));
    draw_centered(fb, 68, &level.name, palette::PALE, 1);

    let kills = format!(
        "KILLS {:02}/{:02}",
        session.player.kills, session.kills_required
    );
    draw_centered(fb, 100, &kills, accent, 2);
    let lives = format!("LIVES {}", session.player.lives);
    draw_centered(fb, 125, &lives, palette::LIGHT, 2);

    const BAR_W: i32 = 280;
    let bar_x = (w - BAR_W) / 2;
    let progress = (session.level_index as i32 + 1) * BAR_W / total_levels.max(1) as i32;
    fb.fill_rect(bar_x, 160, BAR_W, 10, palette::BAR_BG);
    fb.fill_rect(bar_x, 160, progress.min(BAR_W), 10, accent);
    fb.hline(bar_x, bar_x + BAR_W, 160, bright);

    let timer = session.state_timer;
    if timer < LEVEL_COMPLETE_CONFIRM_AFTER && blink(timer as u64, 15) {
        draw_centered(fb, 200, "PRESS START", Color::WHITE, 2);
    }
}

pub fn game_over(fb: &mut Framebuffer, timer: u32) {
    let h = fb.height() as i32;
    gradient(fb, |y| Color::rgb((20 + y * 15 / h) as u8, 0, 0));
    draw_centered(fb, 80, "GAME OVER", palette::BLOOD, 3);

    let skull_x = (fb.width() as i32 - 28) / 2;
    fb.fill_rect(skull_x, 112, 28, 22, palette::BONE);
    fb.fill_rect(skull_x + 5, 116, 5, 5, Color::BLACK);
    fb.fill_rect(skull_x + 18, 116, 5, 5, Color::BLACK);
    fb.fill_rect(skull_x + 10, 126, 8, 3, Color::BLACK);

    if timer < GAME_OVER_CONFIRM_AFTER && blink(timer as u64, 20) {
        draw_centered(fb, 160, "PRESS START TO RETRY", Color::WHITE, 1);
    }
}

pub fn victory(fb: &mut Framebuffer, total_levels: usize, frame: u64) {
    let h = fb.height() as i32;
    let w = fb.width() as i32;
    gradient(fb, |y| {
        let s = (15 + y * 20 / h) as u8;
        Color::rgb(s, s, s / 3)
    });

    draw_centered(fb, 55, "YOU SURVIVED", palette::GOLD, 2);
    let all = format!("ALL {total_levels} LEVELS");
    draw_centered(fb, 78, &all, palette::AMBER, 2);
    fb.hline(100, w - 100, 100, palette::GOLD_RULE);
    draw_centered(fb, 120, "CONGRATULATIONS", Color::WHITE, 2);

    if blink(frame, 30) {
        draw_centered(fb, 200, "PRESS START TO CONTINUE", palette::BONE, 1);
    }
}

/// Initials carousel for a qualifying score
pub fn name_entry(fb: &mut Framebuffer, session: &GameSession, frame: u64) {
    let h = fb.height() as i32;
    gradient(fb, |y| {
        let s = (10 + y * 16 / h) as u8;
        Color::rgb(s / 2, s / 3, s)
    });

    draw_centered(fb, 30, "NEW HIGH SCORE", palette::GOLD, 2);
    let score = format!("SCORE {}", session.final_score);
    draw_centered(fb, 60, &score, Color::WHITE, 2);

    const SCALE: i32 = 4;
    const SLOT: i32 = 40;
    let entry = &session.name_entry;
    let left = (fb.width() as i32 - SLOT * entry.letters.len() as i32) / 2;
    for (i, &letter) in entry.letters.iter().enumerate() {
        let x = left + i as i32 * SLOT + (SLOT - 5 * SCALE) / 2;
        let selected = i == entry.cursor;
        let color = if selected { palette::CURSOR } else { palette::LIGHT };
        draw_text(fb, x, 110, &(letter as char).to_string(), color, SCALE);
        if selected && blink(frame, 15) {
            fb.fill_rect(x, 110 + 8 * SCALE + 4, 5 * SCALE, 3, palette::CURSOR);
        }
    }

    draw_centered(fb, 200, "UP DOWN LETTER   LEFT RIGHT MOVE", palette::HINT, 1);
    draw_centered(fb, 215, "PRESS START TO SAVE", palette::HINT, 1);
}

/// Leaderboard; `highlight` is the 1-based rank to emphasise
pub fn high_scores(
    fb: &mut Framebuffer,
    table: &HighScoreTable,
    highlight: Option<usize>,
    frame: u64,
) {
    let h = fb.height() as i32;
    let w = fb.width() as i32;
    gradient(fb, |y| {
        let s = (8 + y * 18 / h) as u8;
        Color::rgb(s, s / 4, s / 4)
    });

    draw_centered(fb, 24, "HIGH SCORES", palette::TITLE_RED, 3);
    fb.hline(80, w - 80, 56, palette::TITLE_RULE);

    if table.is_empty() {
        draw_centered(fb, 110, "NO SCORES YET", palette::HINT, 2);
    } else {
        draw_text(fb, 72, 70, "RANK NAME   SCORE  TIME  KILLS LVL", palette::HINT, 1);
        for (i, entry) in table.entries().iter().enumerate() {
            let rank = i + 1;
            let line = format!(
                "{:>2}.  {:<3} {:>7} {:>6} {:>5} {:>3}",
                rank,
                entry.name_str(),
                entry.score,
                format_time(entry.time_frames),
                entry.kills,
                entry.max_level
            );
            let y = 90 + i as i32 * 18;
            let color = if highlight == Some(rank) {
                if blink(frame, 15) {
                    palette::GOLD
                } else {
                    palette::AMBER
                }
            } else {
                palette::LIGHT
            };
            draw_text(fb, 72, y, &line, color, 1);
        }
    }

    if blink(frame, 30) {
        draw_centered(fb, 220, "PRESS START", Color::WHITE, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::notation::NotationConfig;
    use crate::highscores::HighScoreEntry;
    use crate::sim::level::LevelSet;

    fn fb() -> Framebuffer {
        Framebuffer::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    fn count(fb: &Framebuffer, color: Color) -> usize {
        fb.pixels().iter().filter(|&&c| c == color).count()
    }

    #[test]
    fn test_title_prompt_blinks() {
        let mut on = fb();
        title(&mut on, 0);
        let mut off = fb();
        title(&mut off, 30);
        assert!(count(&on, Color::WHITE) > count(&off, Color::WHITE));
    }

    #[test]
    fn test_intro_fades_in() {
        let levels = LevelSet::builtin(&NotationConfig::default()).unwrap();
        let level = &levels.levels[0];
        let theme = theme_scaled(level.theme, 255);

        let mut start = fb();
        level_intro(&mut start, 0, level, LEVEL_INTRO_TICKS);
        assert_eq!(count(&start, theme), 0);

        let mut later = fb();
        level_intro(&mut later, 0, level, LEVEL_INTRO_TICKS - 40);
        assert!(count(&later, theme) > 0);
    }

    #[test]
    fn test_progress_bar_tracks_level() {
        let levels = LevelSet::builtin(&NotationConfig::default()).unwrap();
        let mut session = GameSession::new(&levels);
        session.level_index = 0;
        session.state_timer = LEVEL_COMPLETE_TICKS;
        let accent = Color::from_array(levels.levels[0].theme);

        let mut first = fb();
        level_complete(&mut first, &session, &levels.levels[0], 3);
        session.level_index = 2;
        let mut last = fb();
        level_complete(&mut last, &session, &levels.levels[0], 3);

        let bar_y = 165;
        let filled = |fb: &Framebuffer| {
            fb.row(bar_y).map_or(0, |r| r.iter().filter(|&&c| c == accent).count())
        };
        assert!(filled(&last) > filled(&first));
        assert_eq!(filled(&last), 280);
    }

    #[test]
    fn test_game_over_skull() {
        let mut f = fb();
        game_over(&mut f, GAME_OVER_TICKS);
        let cx = SCREEN_WIDTH as i32 / 2;
        assert_eq!(f.get(cx, 113), Some(palette::BONE));
        assert_eq!(f.get((SCREEN_WIDTH as i32 - 28) / 2 + 6, 117), Some(Color::BLACK));
    }

    #[test]
    fn test_high_scores_lists_entries() {
        let mut table = HighScoreTable::new();
        let mut empty = fb();
        high_scores(&mut empty, &table, None, 0);

        table.insert(HighScoreEntry::new(*b"ABC", 5000, 3600, 12, 2));
        let mut listed = fb();
        high_scores(&mut listed, &table, Some(1), 0);
        assert!(count(&listed, palette::GOLD) > 0);
        assert_ne!(empty.pixels(), listed.pixels());
    }

    #[test]
    fn test_name_entry_marks_cursor() {
        let levels = LevelSet::builtin(&NotationConfig::default()).unwrap();
        let mut session = GameSession::new(&levels);
        session.name_entry.cursor = 1;
        let mut f = fb();
        name_entry(&mut f, &session, 0);
        assert!(count(&f, palette::CURSOR) > 0);
    }
}
