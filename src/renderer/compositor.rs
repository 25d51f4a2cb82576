//! Raycast frame compositor
//!
//! Draw order per frame:
//! 1. Ceiling and floor fill (theme tinted)
//! 2. Wall columns, recording each column's depth
//! 3. Enemy sprites, far to near, depth-tested per column
//! 4. Crosshair, minimap, HUD bar, damage border

use super::font::draw_text;
use super::framebuffer::{Color, FP_ONE, Framebuffer};
use super::textures::{WallTexture, WallTextures, demon_texel};
use crate::consts::*;
use crate::highscores::format_time;
use crate::normalize_angle;
use crate::settings::{Settings, TextureDetail};
use crate::sim::level::Level;
use crate::sim::raycast::{Axis, RayTable};
use crate::sim::state::GameSession;

const HUD_HEIGHT: i32 = 24;
const MINIMAP_SCALE: i32 = 4;
const MINIMAP_MARGIN: i32 = 8;
/// Minimap opacity in 1/256 units
const MINIMAP_ALPHA: i32 = 204;
const CROSSHAIR_ARM: i32 = 6;
const DAMAGE_BORDER: i32 = 3;

mod palette {
    use super::Color;

    pub const MAP_WALL: Color = Color::rgb(0x55, 0x55, 0x55);
    pub const MAP_FLOOR: Color = Color::rgb(0x22, 0x22, 0x22);
    pub const HUD_BG: Color = Color::rgb(0x11, 0x11, 0x11);
    pub const HUD_RULE: Color = Color::rgb(0x66, 0x66, 0x66);
    pub const HUD_LABEL: Color = Color::rgb(0x88, 0x88, 0x88);
    pub const LIFE: Color = Color::rgb(0xFF, 0x44, 0x44);
    pub const KILLS: Color = Color::rgb(0xFF, 0xCC, 0x00);
    pub const TIMER: Color = Color::rgb(0xCC, 0xCC, 0xCC);
    pub const FPS: Color = Color::rgb(0x44, 0xFF, 0x44);
}

/// Fog multiplier for a distance, in 1/256 units
///
/// Fades linearly to the floor at `VISIBILITY_RANGE` and never below it.
pub fn fog_factor(distance: f32) -> i32 {
    (((1.0 - distance / VISIBILITY_RANGE) * FP_ONE as f32) as i32).clamp(MIN_FOG_FP, FP_ONE)
}

/// Blend each channel a quarter of the way toward the theme
fn tint(base: u8, theme: [u8; 3]) -> Color {
    let ch = |t: u8| ((base as u16 * 3 + t as u16) / 4) as u8;
    Color::rgb(ch(theme[0]), ch(theme[1]), ch(theme[2]))
}

/// Theme colour lifted halfway to white
pub fn theme_highlight(theme: [u8; 3]) -> Color {
    let ch = |t: u8| ((t as u16 + 255) / 2) as u8;
    Color::rgb(ch(theme[0]), ch(theme[1]), ch(theme[2]))
}

#[derive(Debug, Clone, Copy)]
struct Sprite {
    index: usize,
    /// Perpendicular distance, comparable with the depth buffer
    depth: f32,
    distance: f32,
    screen_x: i32,
}

/// Owns everything the raycast frame needs that outlives a frame
pub struct Compositor {
    width: i32,
    height: i32,
    rays: RayTable,
    textures: WallTextures,
    detail: TextureDetail,
    half_plane: f32,
    depth: Vec<f32>,
    sprites: Vec<Sprite>,
    half_resolution: bool,
    show_fps: bool,
    show_minimap: bool,
    show_timer: bool,
}

impl Compositor {
    pub fn new(width: usize, height: usize, settings: &Settings) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
            rays: RayTable::new(width, FOV),
            textures: WallTextures::generate(settings.texture_detail),
            detail: settings.texture_detail,
            half_plane: (FOV * 0.5).tan(),
            depth: vec![f32::INFINITY; width],
            sprites: Vec::with_capacity(MAX_ENEMIES),
            half_resolution: settings.half_resolution,
            show_fps: settings.show_fps,
            show_minimap: settings.show_minimap,
            show_timer: settings.show_timer,
        }
    }

    /// Per-column wall depth from the last frame
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    /// Compose the in-game frame
    pub fn render_playing(
        &mut self,
        fb: &mut Framebuffer,
        session: &GameSession,
        level: &Level,
        fps: u32,
    ) {
        self.draw_backdrop(fb, level.theme);
        self.draw_walls(fb, session);
        self.draw_sprites(fb, session);
        self.draw_crosshair(fb);
        if self.show_minimap {
            self.draw_minimap(fb, session);
        }
        self.draw_hud(fb, session, level, fps);
        if session.player.recently_hit() {
            fb.frame(DAMAGE_BORDER, Color::RED);
        }
    }

    fn draw_backdrop(&self, fb: &mut Framebuffer, theme: [u8; 3]) {
        let horizon = self.height / 2;
        fb.fill_rect(0, 0, self.width, horizon, tint(0x33, theme));
        fb.fill_rect(0, horizon, self.width, self.height - horizon, tint(0x66, theme));
    }

    fn draw_walls(&mut self, fb: &mut Framebuffer, session: &GameSession) {
        let origin = session.player.pose.pos;
        let view = session.player.pose.angle;
        let stride = if self.half_resolution { 2 } else { 1 };
        let columns = self.rays.columns();

        for x in (0..columns).step_by(stride) {
            let hit = self.rays.cast(&session.grid, origin, view, x);
            let depth = if hit.is_wall() {
                hit.distance
            } else {
                f32::INFINITY
            };
            let pair = (x + 1).min(columns - 1);
            self.depth[x] = depth;
            if stride == 2 {
                self.depth[pair] = depth;
            }
            if !hit.is_wall() || hit.distance <= 0.0 {
                continue;
            }

            let line_height = (self.height as f32 / hit.distance) as i32;
            if line_height <= 0 {
                continue;
            }
            let draw_start = self.height / 2 - line_height / 2;
            let draw_end = self.height / 2 + line_height / 2;
            let step = TEXTURE_SIZE as f32 / line_height as f32;
            let mut tex_pos = if draw_start < 0 {
                -draw_start as f32 * step
            } else {
                0.0
            };
            let tex_x = (hit.texture_u * TEXTURE_SIZE as f32) as usize % TEXTURE_SIZE;
            let kind = WallTexture::for_cell(session.level_index, hit.cell, self.detail);
            let fog = fog_factor(hit.distance);
            let far_face = hit.axis == Axis::Y;

            for y in draw_start.max(0)..=draw_end.min(self.height - 1) {
                let mut color = self.textures.sample(kind, tex_x, tex_pos as usize);
                tex_pos += step;
                if far_face {
                    color = color.half();
                }
                let color = color.scale_fp(fog);
                fb.set(x as i32, y, color);
                if stride == 2 {
                    fb.set(pair as i32, y, color);
                }
            }
        }
    }

    /// Project living enemies into screen space, farthest first
    fn collect_sprites(&mut self, session: &GameSession) {
        let player = session.player.pose;
        let half_fov = FOV * 0.5;
        self.sprites.clear();
        for (index, enemy) in session.enemies.iter().enumerate() {
            if !enemy.alive {
                continue;
            }
            let to_enemy = enemy.pos - player.pos;
            let distance = to_enemy.length();
            let angle = normalize_angle(to_enemy.y.atan2(to_enemy.x) - player.angle);
            if angle.abs() >= half_fov || distance <= MIN_SPRITE_DISTANCE {
                continue;
            }
            let center = self.width as f32 * 0.5;
            self.sprites.push(Sprite {
                index,
                depth: distance * angle.cos(),
                distance,
                screen_x: (center * (1.0 + angle.tan() / self.half_plane)) as i32,
            });
        }
        self.sprites.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    }

    fn draw_sprites(&mut self, fb: &mut Framebuffer, session: &GameSession) {
        self.collect_sprites(session);

        for sprite in &self.sprites {
            let enemy = &session.enemies[sprite.index];
            let sprite_h = (self.height as f32 / sprite.depth) as i32;
            if sprite_h <= 0 {
                continue;
            }
            let sprite_w = (sprite_h / 2).max(4);
            let top = (self.height - sprite_h) / 2;
            let left = sprite.screen_x - sprite_w / 2;
            let fog = fog_factor(sprite.distance);
            let dying = enemy.is_dying().then_some(enemy.death_frames);

            let x0 = left.max(0);
            let x1 = (sprite.screen_x + sprite_w / 2).min(self.width);
            let y0 = top.max(0);
            let y1 = (top + sprite_h).min(self.height - 1);

            for sx in x0..x1 {
                if self.depth[sx as usize] < sprite.depth {
                    continue;
                }
                let u = (sx - left) as f32 / sprite_w as f32;
                for sy in y0..=y1 {
                    let v = (sy - top) as f32 / sprite_h as f32;
                    if let Some(color) = demon_texel(u, v, dying) {
                        fb.set(sx, sy, color.scale_fp(fog));
                    }
                }
            }
        }
    }

    fn draw_crosshair(&self, fb: &mut Framebuffer) {
        let (cx, cy) = (self.width / 2, self.height / 2);
        fb.hline(cx - CROSSHAIR_ARM, cx + CROSSHAIR_ARM + 1, cy, Color::WHITE);
        fb.fill_rect(cx, cy - CROSSHAIR_ARM, 1, 2 * CROSSHAIR_ARM + 1, Color::WHITE);
    }

    fn draw_minimap(&self, fb: &mut Framebuffer, session: &GameSession) {
        let grid = &session.grid;
        let ox = self.width - grid.width() as i32 * MINIMAP_SCALE - MINIMAP_MARGIN;
        let oy = MINIMAP_MARGIN;

        for gy in 0..grid.height() as i32 {
            for gx in 0..grid.width() as i32 {
                let cell = if grid.is_wall(gx, gy) {
                    palette::MAP_WALL
                } else {
                    palette::MAP_FLOOR
                };
                for py in 0..MINIMAP_SCALE {
                    for px in 0..MINIMAP_SCALE {
                        let (sx, sy) = (ox + gx * MINIMAP_SCALE + px, oy + gy * MINIMAP_SCALE + py);
                        if let Some(under) = fb.get(sx, sy) {
                            fb.set(sx, sy, under.blend(cell, MINIMAP_ALPHA));
                        }
                    }
                }
            }
        }

        let to_map = |p: glam::Vec2| {
            (
                ox + (p.x * MINIMAP_SCALE as f32) as i32,
                oy + (p.y * MINIMAP_SCALE as f32) as i32,
            )
        };
        let pose = session.player.pose;
        let (px, py) = to_map(pose.pos);
        fb.fill_rect(px - 1, py - 1, 3, 3, Color::GREEN);
        let heading = crate::heading(pose.angle) * 5.0;
        fb.set(px + heading.x as i32, py + heading.y as i32, Color::GREEN);

        for enemy in session.enemies.iter().filter(|e| e.alive) {
            let (ex, ey) = to_map(enemy.pos);
            fb.set(ex, ey, Color::RED);
        }
    }

    fn draw_hud(&self, fb: &mut Framebuffer, session: &GameSession, level: &Level, fps: u32) {
        let top = self.height - HUD_HEIGHT;
        let text_y = self.height - 18;
        fb.fill_rect(0, top, self.width, HUD_HEIGHT, palette::HUD_BG);
        fb.hline(0, self.width, top, palette::HUD_RULE);

        draw_text(fb, 8, text_y, "LIVES", palette::HUD_LABEL, 1);
        for i in 0..session.player.lives as i32 {
            fb.fill_rect(48 + i * 12, text_y, 8, 10, palette::LIFE);
        }

        let kills = format!("KILLS {}/{:02}", session.player.kills, session.kills_required);
        draw_text(fb, 120, text_y, &kills, palette::KILLS, 1);

        if self.show_timer {
            let elapsed = format_time(session.run.frames + session.level_frames);
            draw_text(fb, 200, text_y, &elapsed, palette::TIMER, 1);
        }

        draw_text(fb, 280, text_y, &level.name, theme_highlight(level.theme), 1);

        if self.show_fps {
            let fps = format!("{:02}FPS", fps.min(99));
            draw_text(fb, self.width - 38, text_y, &fps, palette::FPS, 1);
        }
    }
}
