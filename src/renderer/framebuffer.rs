//! Software framebuffer with bounds-checked pixel access

use bytemuck::{Pod, Zeroable};

/// Fixed-point scale used by fog and blend factors
pub const FP_ONE: i32 = 256;

/// RGBA8 pixel
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const RED: Color = Color::rgb(0xFF, 0x00, 0x00);
    pub const GREEN: Color = Color::rgb(0x00, 0xFF, 0x00);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 0xFF])
    }

    #[inline]
    pub const fn from_array(rgb: [u8; 3]) -> Self {
        Self::rgb(rgb[0], rgb[1], rgb[2])
    }

    #[inline]
    pub fn r(self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub fn g(self) -> u8 {
        self.0[1]
    }

    #[inline]
    pub fn b(self) -> u8 {
        self.0[2]
    }

    /// Multiply each channel by `factor / 256`, clamped to 0..=256
    #[inline]
    pub fn scale_fp(self, factor: i32) -> Self {
        let f = factor.clamp(0, FP_ONE) as u32;
        let ch = |c: u8| ((c as u32 * f) >> 8) as u8;
        Self::rgb(ch(self.r()), ch(self.g()), ch(self.b()))
    }

    /// Halve every channel
    #[inline]
    pub fn half(self) -> Self {
        Self::rgb(self.r() >> 1, self.g() >> 1, self.b() >> 1)
    }

    /// Move `t / 256` of the way toward `other`
    pub fn blend(self, other: Color, t: i32) -> Self {
        let t = t.clamp(0, FP_ONE);
        let mix = |a: u8, b: u8| ((a as i32 * (FP_ONE - t) + b as i32 * t) >> 8) as u8;
        Self::rgb(
            mix(self.r(), other.r()),
            mix(self.g(), other.g()),
            mix(self.b(), other.b()),
        )
    }
}

/// A width x height pixel surface
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Write a pixel; writes outside the surface are dropped
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    pub fn row(&self, y: usize) -> Option<&[Color]> {
        (y < self.height).then(|| &self.pixels[y * self.width..(y + 1) * self.width])
    }

    pub fn row_mut(&mut self, y: usize) -> Option<&mut [Color]> {
        let width = self.width;
        (y < self.height).then(|| &mut self.pixels[y * width..(y + 1) * width])
    }

    /// Fill a rectangle, clipped to the surface
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        if x0 >= x1 {
            return;
        }
        for yy in y0..y1 {
            let start = yy as usize * self.width;
            self.pixels[start + x0 as usize..start + x1 as usize].fill(color);
        }
    }

    /// Horizontal line from `x0` to `x1` exclusive
    pub fn hline(&mut self, x0: i32, x1: i32, y: i32, color: Color) {
        self.fill_rect(x0, y, x1 - x0, 1, color);
    }

    /// Rectangle outline `thickness` pixels wide
    pub fn frame(&mut self, thickness: i32, color: Color) {
        let (w, h) = (self.width as i32, self.height as i32);
        self.fill_rect(0, 0, w, thickness, color);
        self.fill_rect(0, h - thickness, w, thickness, color);
        self.fill_rect(0, thickness, thickness, h - 2 * thickness, color);
        self.fill_rect(w - thickness, thickness, thickness, h - 2 * thickness, color);
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Raw RGBA bytes for texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_writes_are_dropped() {
        let mut fb = Framebuffer::new(4, 3);
        fb.set(-1, 0, Color::WHITE);
        fb.set(4, 0, Color::WHITE);
        fb.set(0, 3, Color::WHITE);
        assert!(fb.pixels().iter().all(|&c| c == Color::BLACK));
        assert_eq!(fb.get(4, 0), None);
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut fb = Framebuffer::new(4, 4);
        fb.fill_rect(-2, 2, 10, 10, Color::RED);
        assert_eq!(fb.get(0, 1), Some(Color::BLACK));
        assert_eq!(fb.get(3, 3), Some(Color::RED));
        assert_eq!(fb.row(2).map(|r| r.len()), Some(4));
        assert_eq!(fb.as_bytes().len(), 4 * 4 * 4);
    }

    #[test]
    fn test_fill_rect_right_of_surface_is_noop() {
        let mut fb = Framebuffer::new(10, 10);
        fb.fill_rect(12, 9, 2, 1, Color::RED);
        fb.fill_rect(10, 0, 5, 10, Color::RED);
        fb.fill_rect(3, 3, -2, 2, Color::RED);
        assert!(fb.pixels().iter().all(|&c| c == Color::BLACK));
    }

    #[test]
    fn test_frame_border() {
        let mut fb = Framebuffer::new(10, 8);
        fb.frame(2, Color::RED);
        assert_eq!(fb.get(0, 4), Some(Color::RED));
        assert_eq!(fb.get(9, 4), Some(Color::RED));
        assert_eq!(fb.get(5, 7), Some(Color::RED));
        assert_eq!(fb.get(5, 4), Some(Color::BLACK));
    }

    #[test]
    fn test_color_math() {
        let c = Color::rgb(200, 100, 50);
        assert_eq!(c.scale_fp(128), Color::rgb(100, 50, 25));
        assert_eq!(c.scale_fp(512), c);
        assert_eq!(c.half(), Color::rgb(100, 50, 25));
        assert_eq!(Color::BLACK.blend(Color::WHITE, 256), Color::WHITE);
        assert_eq!(Color::BLACK.blend(Color::WHITE, 0), Color::BLACK);
    }
}
