//! Procedural wall textures and the demon sprite
//!
//! All texels are generated at startup; nothing is loaded from disk.

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::framebuffer::Color;
use crate::consts::TEXTURE_SIZE;
use crate::settings::TextureDetail;

/// Fixed seed so every run builds identical texels
const GRAIN_SEED: u64 = 0x0DE3_0B1A_5E72;

const N: usize = TEXTURE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallTexture {
    Brick,
    Stone,
    Gold,
    Moss,
}

impl WallTexture {
    pub const ALL: [WallTexture; 4] = [
        WallTexture::Brick,
        WallTexture::Stone,
        WallTexture::Gold,
        WallTexture::Moss,
    ];

    fn from_index(i: usize) -> Self {
        Self::ALL[i & 3]
    }

    /// Texture for a wall cell on a given level
    ///
    /// Each level has a base texture; a hash of the cell picks out roughly
    /// a quarter of the walls to use the next texture as an accent.
    pub fn for_cell(level_index: usize, cell: IVec2, detail: TextureDetail) -> Self {
        if detail == TextureDetail::Low {
            return WallTexture::Brick;
        }
        let base = level_index & 3;
        let hash = (cell.x.wrapping_mul(7) + cell.y.wrapping_mul(13)) & 7;
        if hash < 2 {
            Self::from_index(base + 1)
        } else {
            Self::from_index(base)
        }
    }
}

/// Texel grid for each wall texture
#[derive(Debug, Clone)]
pub struct WallTextures {
    texels: [Vec<Color>; 4],
}

impl WallTextures {
    pub fn generate(detail: TextureDetail) -> Self {
        let mut rng = Pcg32::seed_from_u64(GRAIN_SEED);
        let grain = detail == TextureDetail::High;
        let texels = WallTexture::ALL.map(|kind| {
            let mut out = Vec::with_capacity(N * N);
            for row in 0..N {
                for col in 0..N {
                    let base = texel(kind, row, col);
                    // Mortar stays flat; faces get a little noise
                    let jitter = if grain && !is_joint(kind, row, col) {
                        rng.random_range(-6i32..=6)
                    } else {
                        0
                    };
                    out.push(shift(base, jitter));
                }
            }
            out
        });
        Self { texels }
    }

    /// Texel at column `x`, row `y` (wrapped to the texture size)
    #[inline]
    pub fn sample(&self, kind: WallTexture, x: usize, y: usize) -> Color {
        self.texels[kind as usize][(y % N) * N + (x % N)]
    }
}

fn shift(c: Color, delta: i32) -> Color {
    let ch = |v: u8| (v as i32 + delta).clamp(0, 255) as u8;
    Color::rgb(ch(c.r()), ch(c.g()), ch(c.b()))
}

/// Running-bond brick: 8-texel courses, 16-texel bricks, odd courses offset
fn brick_joint(row: usize, col: usize) -> bool {
    let course = row / 8;
    let x = if course % 2 == 1 { col + 16 } else { col };
    row % 8 == 0 || x % 16 == 0
}

/// Square 16-texel blocks
fn block_joint(row: usize, col: usize) -> bool {
    row % 16 == 0 || col % 16 == 0
}

fn is_joint(kind: WallTexture, row: usize, col: usize) -> bool {
    match kind {
        WallTexture::Brick | WallTexture::Gold => brick_joint(row, col),
        WallTexture::Stone | WallTexture::Moss => block_joint(row, col),
    }
}

fn texel(kind: WallTexture, row: usize, col: usize) -> Color {
    let course = row / 8;
    let brick = (if course % 2 == 1 { col + 16 } else { col }) / 16;
    let (block_row, block_col) = (row / 16, col / 16);
    match kind {
        WallTexture::Brick => {
            if brick_joint(row, col) {
                return Color::rgb(0x88, 0x88, 0x88);
            }
            let s = (0x88 + ((course * 37 + brick * 53) & 0x1F)).min(0xAA) as u8;
            Color::rgb(s, s >> 1, s >> 2)
        }
        WallTexture::Stone => {
            if block_joint(row, col) {
                return Color::rgb(0x55, 0x55, 0x55);
            }
            let mix = block_row * 47 + block_col * 31 + row * 3 + col * 7;
            let s = (0x77 + (mix & 0x1F)).min(0x99) as u8;
            Color::rgb(s, s, s)
        }
        WallTexture::Gold => {
            if brick_joint(row, col) {
                return Color::rgb(0x66, 0x66, 0x44);
            }
            let s = (0x99 + ((course * 41 + brick * 59 + col * 3) & 0x2F)).min(0xDD);
            Color::rgb(s as u8, ((s * 200) >> 8) as u8, (s >> 2) as u8)
        }
        WallTexture::Moss => {
            if block_joint(row, col) {
                return Color::rgb(0x44, 0x55, 0x44);
            }
            let s = (0x55 + ((block_row * 29 + block_col * 43 + row * 5) & 0x2F)).min(0x88);
            if (row * 7 + col * 13) & 7 < 3 {
                Color::rgb((s / 2) as u8, s as u8, (s / 3) as u8)
            } else {
                let warm = ((s * 3) >> 2) as u8;
                Color::rgb(warm, warm, (s / 2) as u8)
            }
        }
    }
}

/// Demon sprite palette
mod demon {
    use super::Color;

    pub const HEAD: Color = Color::rgb(0xEE, 0x33, 0x33);
    pub const HORN: Color = Color::rgb(0x88, 0x18, 0x18);
    pub const EYE: Color = Color::rgb(0xFF, 0xFF, 0x00);
    pub const TOOTH: Color = Color::rgb(0xEE, 0xEE, 0xDD);
    pub const MOUTH: Color = Color::rgb(0x44, 0x00, 0x00);
    pub const BODY: Color = Color::rgb(0xDD, 0x22, 0x22);
    pub const LEGS: Color = Color::rgb(0xAA, 0x18, 0x18);
    pub const FLASH_DARK: Color = Color::rgb(0xFF, 0x33, 0x33);
}

/// Colour of the demon sprite at a normalized point, or None if transparent
///
/// `x` and `y` run 0..1 across the sprite's screen rectangle, top-left
/// origin. A dying demon renders as a solid silhouette that alternates
/// white and red every two frames.
pub fn demon_texel(x: f32, y: f32, dying: Option<u32>) -> Option<Color> {
    let centered = (x - 0.5).abs() * 2.0;

    let base = if y < 0.22 {
        if centered > 0.6 {
            return None;
        }
        let head_y = (y / 0.22 * 100.0) as i32;
        let head_x = (centered / 0.6 * 100.0) as i32;
        if head_y < 15 && (60..95).contains(&head_x) {
            demon::HORN
        } else if (28..48).contains(&head_y) && (25..65).contains(&head_x) {
            demon::EYE
        } else if (72..92).contains(&head_y) && head_x < 65 {
            if ((x * 256.0) as i32 >> 4) & 1 == 1 {
                demon::TOOTH
            } else {
                demon::MOUTH
            }
        } else {
            demon::HEAD
        }
    } else if y < 0.65 {
        if centered > 0.8 {
            return None;
        }
        demon::BODY
    } else {
        // Gap between the legs
        if (centered > 0.4 && centered < 0.6) || centered > 0.9 {
            return None;
        }
        demon::LEGS
    };

    Some(match dying {
        Some(frame) if frame & 2 != 0 => Color::WHITE,
        Some(_) => demon::FLASH_DARK,
        None => base,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        let a = WallTextures::generate(TextureDetail::High);
        let b = WallTextures::generate(TextureDetail::High);
        for kind in WallTexture::ALL {
            for i in 0..N {
                assert_eq!(a.sample(kind, i, i * 3), b.sample(kind, i, i * 3));
            }
        }
    }

    #[test]
    fn test_brick_mortar_rows() {
        let tex = WallTextures::generate(TextureDetail::High);
        assert_eq!(tex.sample(WallTexture::Brick, 5, 0), Color::rgb(0x88, 0x88, 0x88));
        assert_eq!(tex.sample(WallTexture::Brick, 5, 8), Color::rgb(0x88, 0x88, 0x88));
        // Brick face is warm: red > green > blue
        let face = tex.sample(WallTexture::Brick, 5, 3);
        assert!(face.r() > face.g() && face.g() > face.b());
    }

    #[test]
    fn test_sample_wraps() {
        let tex = WallTextures::generate(TextureDetail::Low);
        assert_eq!(
            tex.sample(WallTexture::Stone, 3, 4),
            tex.sample(WallTexture::Stone, 3 + N, 4 + N)
        );
    }

    #[test]
    fn test_texture_selection() {
        assert_eq!(
            WallTexture::for_cell(2, IVec2::new(5, 9), TextureDetail::Low),
            WallTexture::Brick
        );
        // hash(0,0) = 0 picks the accent, hash(1,1) = 20 & 7 = 4 keeps the base
        assert_eq!(
            WallTexture::for_cell(0, IVec2::new(0, 0), TextureDetail::High),
            WallTexture::Stone
        );
        assert_eq!(
            WallTexture::for_cell(0, IVec2::new(1, 1), TextureDetail::High),
            WallTexture::Brick
        );
        assert_eq!(
            WallTexture::for_cell(3, IVec2::new(0, 0), TextureDetail::High),
            WallTexture::Brick
        );
    }

    #[test]
    fn test_demon_shape() {
        // Eye region: 0.1 off centre is 1/3 of the head half-width
        assert_eq!(demon_texel(0.4, 0.08, None), Some(demon::EYE));
        // Outside the head
        assert_eq!(demon_texel(0.02, 0.1, None), None);
        // Torso
        assert_eq!(demon_texel(0.5, 0.4, None), Some(demon::BODY));
        // Legs and the gap between them
        assert_eq!(demon_texel(0.5 + 0.35, 0.8, None), Some(demon::LEGS));
        assert_eq!(demon_texel(0.5 + 0.25, 0.8, None), None);
    }

    #[test]
    fn test_dying_flash_alternates() {
        assert_eq!(demon_texel(0.5, 0.4, Some(2)), Some(Color::WHITE));
        assert_eq!(demon_texel(0.5, 0.4, Some(1)), Some(demon::FLASH_DARK));
        assert_eq!(demon_texel(0.02, 0.1, Some(2)), None);
    }
}
