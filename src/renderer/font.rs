//! 5x8 bitmap font
//!
//! Glyphs are stored column-major, one byte per column, bit 0 at the top.
//! Each character advances six pixels (times the scale). Lowercase letters
//! render as uppercase; unknown characters leave a blank cell.

use super::framebuffer::{Color, Framebuffer};

pub const GLYPH_WIDTH: i32 = 5;
pub const GLYPH_HEIGHT: i32 = 8;
pub const ADVANCE: i32 = 6;

const DIGITS: [[u8; 5]; 10] = [
    [0x7C, 0x82, 0x82, 0x82, 0x7C],
    [0x00, 0x84, 0xFE, 0x80, 0x00],
    [0xC4, 0xA2, 0x92, 0x8A, 0x84],
    [0x44, 0x82, 0x92, 0x92, 0x6C],
    [0x30, 0x28, 0x24, 0xFE, 0x20],
    [0x4E, 0x8A, 0x8A, 0x8A, 0x72],
    [0x78, 0x94, 0x92, 0x92, 0x60],
    [0x02, 0xE2, 0x12, 0x0A, 0x06],
    [0x6C, 0x92, 0x92, 0x92, 0x6C],
    [0x0C, 0x92, 0x92, 0x52, 0x3C],
];

const LETTERS: [[u8; 5]; 26] = [
    [0x7C, 0x12, 0x12, 0x12, 0x7C], // A
    [0xFE, 0x92, 0x92, 0x92, 0x6C],
    [0x7C, 0x82, 0x82, 0x82, 0x44],
    [0xFE, 0x82, 0x82, 0x82, 0x7C],
    [0xFE, 0x92, 0x92, 0x92, 0x82],
    [0xFE, 0x12, 0x12, 0x12, 0x02],
    [0x7C, 0x82, 0x92, 0x92, 0x74],
    [0xFE, 0x10, 0x10, 0x10, 0xFE],
    [0x00, 0x82, 0xFE, 0x82, 0x00],
    [0x40, 0x80, 0x80, 0x80, 0x7E],
    [0xFE, 0x10, 0x28, 0x44, 0x82],
    [0xFE, 0x80, 0x80, 0x80, 0x80],
    [0xFE, 0x04, 0x08, 0x04, 0xFE], // M
    [0xFE, 0x04, 0x08, 0x10, 0xFE],
    [0x7C, 0x82, 0x82, 0x82, 0x7C],
    [0xFE, 0x12, 0x12, 0x12, 0x0C],
    [0x7C, 0x82, 0xA2, 0x42, 0xBC],
    [0xFE, 0x12, 0x32, 0x52, 0x8C],
    [0x4C, 0x92, 0x92, 0x92, 0x64],
    [0x02, 0x02, 0xFE, 0x02, 0x02],
    [0x7E, 0x80, 0x80, 0x80, 0x7E],
    [0x3E, 0x40, 0x80, 0x40, 0x3E],
    [0x7E, 0x80, 0x60, 0x80, 0x7E],
    [0xC6, 0x28, 0x10, 0x28, 0xC6],
    [0x06, 0x08, 0xF0, 0x08, 0x06],
    [0xC2, 0xA2, 0x92, 0x8A, 0x86], // Z
];

fn glyph(c: char) -> Option<[u8; 5]> {
    let c = c.to_ascii_uppercase();
    match c {
        '0'..='9' => Some(DIGITS[(c as u8 - b'0') as usize]),
        'A'..='Z' => Some(LETTERS[(c as u8 - b'A') as usize]),
        ':' => Some([0x60, 0x90, 0x90, 0x60, 0x00]),
        '/' => Some([0x60, 0x30, 0x18, 0x0C, 0x06]),
        '-' => Some([0x10, 0x10, 0x10, 0x10, 0x10]),
        '.' => Some([0x00, 0xC0, 0xC0, 0x00, 0x00]),
        '\'' => Some([0x00, 0x02, 0x06, 0x04, 0x00]),
        _ => None,
    }
}

/// Pixel width of `text` at `scale`
pub fn text_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * ADVANCE * scale
}

/// Draw one character with its top-left at (x, y)
pub fn draw_char(fb: &mut Framebuffer, x: i32, y: i32, c: char, color: Color, scale: i32) {
    let Some(columns) = glyph(c) else {
        return;
    };
    let scale = scale.max(1);
    for (col, bits) in columns.iter().enumerate() {
        for row in 0..GLYPH_HEIGHT {
            if bits & (1 << row) != 0 {
                fb.fill_rect(
                    x + col as i32 * scale,
                    y + row * scale,
                    scale,
                    scale,
                    color,
                );
            }
        }
    }
}

pub fn draw_text(fb: &mut Framebuffer, x: i32, y: i32, text: &str, color: Color, scale: i32) {
    let scale = scale.max(1);
    for (i, c) in text.chars().enumerate() {
        draw_char(fb, x + i as i32 * ADVANCE * scale, y, c, color, scale);
    }
}

/// Draw `text` horizontally centred on the framebuffer
pub fn draw_centered(fb: &mut Framebuffer, y: i32, text: &str, color: Color, scale: i32) {
    let x = (fb.width() as i32 - text_width(text, scale)) / 2;
    draw_text(fb, x, y, text, color, scale);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(fb: &Framebuffer) -> usize {
        fb.pixels().iter().filter(|&&c| c != Color::BLACK).count()
    }

    #[test]
    fn test_glyph_lookup() {
        assert_eq!(glyph('a'), glyph('A'));
        assert!(glyph('?').is_none());
        assert_eq!(glyph(' '), None);
        assert_eq!(glyph('1'), Some([0x00, 0x84, 0xFE, 0x80, 0x00]));
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("KILLS", 1), 30);
        assert_eq!(text_width("DEMON", 3), 90);
        assert_eq!(text_width("", 2), 0);
    }

    #[test]
    fn test_scaled_char_covers_scaled_area() {
        let mut one = Framebuffer::new(32, 32);
        draw_char(&mut one, 0, 0, 'H', Color::WHITE, 1);
        let mut two = Framebuffer::new(32, 32);
        draw_char(&mut two, 0, 0, 'H', Color::WHITE, 2);
        assert_eq!(lit(&two), lit(&one) * 4);
        // 'H' has a full-height left stroke (0xFE skips the top row)
        assert_eq!(one.get(0, 0), Some(Color::BLACK));
        assert_eq!(one.get(0, 1), Some(Color::WHITE));
    }

    #[test]
    fn test_clipped_text_does_not_panic() {
        let mut fb = Framebuffer::new(10, 10);
        draw_text(&mut fb, -4, -3, "ABC", Color::WHITE, 2);
        draw_centered(&mut fb, 8, "WIDER THAN THE SURFACE", Color::WHITE, 1);
        assert!(lit(&fb) > 0);
    }
}
