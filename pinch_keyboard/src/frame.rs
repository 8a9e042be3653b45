//! Software frame buffer and the drawing primitives the overlay needs.
//!
//! Pixels are packed `0xAARRGGBB`, row-major, which is exactly what
//! `minifb` displays, so a finished frame goes to the window without any
//! conversion.  All primitives take signed coordinates and clip silently to
//! the frame bounds.

use crate::error::{KeyboardError, Result};
use crate::font;

pub const WHITE:     u32 = 0xFFFFFFFF;
pub const BLACK:     u32 = 0xFF000000;
pub const GREEN:     u32 = 0xFF00FF00;
pub const DARK_GREY: u32 = 0xFF323232;

/// Pack an opaque RGB triple.
pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    0xFF000000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| {
        ((ca as f32 * (1.0 - t) + cb as f32 * t) + 0.5).min(255.0) as u32
    };
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Frame
// ════════════════════════════════════════════════════════════════════════════

/// One video frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width:  usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Frame {
    /// A frame filled with a single color.
    pub fn new(width: usize, height: usize, fill: u32) -> Self {
        Frame { width, height, pixels: vec![fill; width * height] }
    }

    /// Wrap an existing ARGB buffer.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u32>) -> Result<Self> {
        if pixels.len() != width * height {
            return Err(KeyboardError::Capture(format!(
                "expected {} pixels for {}x{}, got {}",
                width * height, width, height, pixels.len()
            )));
        }
        Ok(Frame { width, height, pixels })
    }

    /// Build a frame from tightly packed 8-bit RGB bytes.
    pub fn from_rgb(width: usize, height: usize, rgb_bytes: &[u8]) -> Result<Self> {
        if rgb_bytes.len() != width * height * 3 {
            return Err(KeyboardError::Capture(format!(
                "expected {} RGB bytes for {}x{}, got {}",
                width * height * 3, width, height, rgb_bytes.len()
            )));
        }
        let pixels = rgb_bytes
            .chunks_exact(3)
            .map(|p| rgb(p[0], p[1], p[2]))
            .collect();
        Ok(Frame { width, height, pixels })
    }

    /// Tightly packed 8-bit RGB bytes, the format the detector helper reads.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for &p in &self.pixels {
            out.push((p >> 16) as u8);
            out.push((p >> 8) as u8);
            out.push(p as u8);
        }
        out
    }

    pub fn width(&self)  -> usize  { self.width }
    pub fn height(&self) -> usize  { self.height }
    pub fn pixels(&self) -> &[u32] { &self.pixels }

    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 { return None; }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height { return None; }
        Some(y * self.width + x)
    }

    /// Clip a rectangle to the frame; returns `(x0, y0, x1, y1)` exclusive.
    fn clip(&self, x: i32, y: i32, w: i32, h: i32) -> Option<(usize, usize, usize, usize)> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(self.width as i32);
        let y1 = y.saturating_add(h).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 { return None; }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }

    // ── Whole-frame operations ────────────────────────────────────────────

    /// Flip left ↔ right so on-screen movement matches the user's hand.
    pub fn mirror_horizontal(&mut self) {
        for row in self.pixels.chunks_exact_mut(self.width.max(1)) {
            row.reverse();
        }
    }

    /// `self = overlay * alpha + self * (1 - alpha)`, pixel by pixel.
    ///
    /// Frames of different sizes are left untouched.
    pub fn blend_with(&mut self, overlay: &Frame, alpha: f32) {
        if overlay.width != self.width || overlay.height != self.height {
            return;
        }
        for (dst, &src) in self.pixels.iter_mut().zip(overlay.pixels.iter()) {
            *dst = blend(*dst, src, alpha);
        }
    }

    // ── Primitives ────────────────────────────────────────────────────────

    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) else { return };
        for row in y0..y1 {
            self.pixels[row * self.width + x0..row * self.width + x1].fill(color);
        }
    }

    /// Fill a rectangle with `color` at opacity `alpha` over what is there.
    pub fn blend_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32, alpha: f32) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) else { return };
        for row in y0..y1 {
            for p in &mut self.pixels[row * self.width + x0..row * self.width + x1] {
                *p = blend(*p, color, alpha);
            }
        }
    }

    /// Rectangle outline `thickness` pixels wide, drawn inside `w × h`.
    pub fn draw_border(&mut self, x: i32, y: i32, w: i32, h: i32, thickness: i32, color: u32) {
        let t = thickness.max(1).min(w).min(h);
        self.fill_rect(x,         y,         w, t, color);
        self.fill_rect(x,         y + h - t, w, t, color);
        self.fill_rect(x,         y,         t, h, color);
        self.fill_rect(x + w - t, y,         t, h, color);
    }

    /// Bresenham line with a square brush of `thickness` pixels.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, thickness: i32, color: u32) {
        let t = thickness.max(1);
        let half = t / 2;
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y) = (x0, y0);
        let mut err = dx + dy;
        loop {
            self.fill_rect(x - half, y - half, t, t, color);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    pub fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`, each font pixel
    /// scaled to a `scale × scale` block.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: i32, color: u32) {
        let s = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            if cx >= self.width as i32 { break; }
            let rows = font::glyph(ch);
            for (row, &bits) in rows.iter().enumerate() {
                for col in 0..font::GLYPH_W {
                    if bits & (1 << (font::GLYPH_W - 1 - col)) != 0 {
                        self.fill_rect(cx + col * s, y + row as i32 * s, s, s, color);
                    }
                }
            }
            cx += font::ADVANCE * s;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        let a = rgb(10, 20, 30);
        let b = rgb(200, 100, 50);
        assert_eq!(blend(a, b, 0.0), a);
        assert_eq!(blend(a, b, 1.0), b);
        assert_eq!(blend(BLACK, WHITE, 0.3), rgb(77, 77, 77));
    }

    #[test]
    fn mirror_flips_columns() {
        let mut f = Frame::from_pixels(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        f.mirror_horizontal();
        assert_eq!(f.pixels(), &[3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn fill_rect_clips() {
        let mut f = Frame::new(10, 10, BLACK);
        f.fill_rect(-5, -5, 8, 8, WHITE);
        assert_eq!(f.pixel(2, 2), Some(WHITE));
        assert_eq!(f.pixel(3, 3), Some(BLACK));
        f.fill_rect(100, 100, 5, 5, WHITE); // fully outside — no panic
    }

    #[test]
    fn border_leaves_interior() {
        let mut f = Frame::new(20, 20, BLACK);
        f.draw_border(2, 2, 10, 10, 2, WHITE);
        assert_eq!(f.pixel(2, 2), Some(WHITE));
        assert_eq!(f.pixel(3, 7), Some(WHITE));
        assert_eq!(f.pixel(11, 11), Some(WHITE));
        assert_eq!(f.pixel(6, 6), Some(BLACK));
        assert_eq!(f.pixel(12, 12), Some(BLACK));
    }

    #[test]
    fn blend_with_mismatched_size_is_noop() {
        let mut f = Frame::new(4, 4, BLACK);
        f.blend_with(&Frame::new(2, 2, WHITE), 0.5);
        assert!(f.pixels().iter().all(|&p| p == BLACK));
    }

    #[test]
    fn rgb_round_trip_preserves_pixels() {
        let f = Frame::from_pixels(2, 1, vec![rgb(1, 2, 3), rgb(250, 128, 0)]).unwrap();
        let bytes = f.to_rgb();
        assert_eq!(bytes, vec![1, 2, 3, 250, 128, 0]);
        assert_eq!(Frame::from_rgb(2, 1, &bytes).unwrap(), f);
    }

    #[test]
    fn from_rgb_rejects_short_buffer() {
        assert!(matches!(Frame::from_rgb(4, 4, &[0; 10]), Err(KeyboardError::Capture(_))));
    }

    #[test]
    fn draw_text_paints_glyph_blocks() {
        let mut f = Frame::new(40, 40, BLACK);
        // 'T' top row is fully set: 3 blocks of 4 px.
        f.draw_text("T", 0, 0, 4, WHITE);
        assert_eq!(f.pixel(0, 0), Some(WHITE));
        assert_eq!(f.pixel(11, 3), Some(WHITE));
        // Second row of 'T' only has the middle column.
        assert_eq!(f.pixel(0, 4), Some(BLACK));
        assert_eq!(f.pixel(5, 4), Some(WHITE));
    }

    #[test]
    fn line_reaches_both_ends() {
        let mut f = Frame::new(20, 20, BLACK);
        f.draw_line(1, 1, 15, 9, 1, WHITE);
        assert_eq!(f.pixel(1, 1), Some(WHITE));
        assert_eq!(f.pixel(15, 9), Some(WHITE));
    }
}
