//! A single on-screen key.

use crate::font;
use crate::frame::{Frame, GREEN, WHITE};

/// Opacity of the fill when a button draws itself standalone.
pub const FILL_ALPHA:       f32 = 0.3;
pub const BORDER_THICKNESS: i32 = 2;
/// Each font pixel becomes an 8×8 block: a 24×40 glyph inside an 85×85 key.
pub const LABEL_SCALE:      i32 = 8;

/// A positioned, sized, labeled rectangle.
///
/// Buttons are built once by the layout builder and never change; only how
/// they are drawn varies from frame to frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    pub x:     i32,
    pub y:     i32,
    pub w:     i32,
    pub h:     i32,
    pub label: String,
}

impl Button {
    pub fn new(x: i32, y: i32, w: i32, h: i32, label: impl Into<String>) -> Self {
        Button { x, y, w, h, label: label.into() }
    }

    /// True iff `(x, y)` lies strictly inside the rectangle.
    ///
    /// Points on any edge, including the top-left corner, are outside.
    pub fn is_hover(&self, x: i32, y: i32) -> bool {
        self.x < x && x < self.x + self.w && self.y < y && y < self.y + self.h
    }

    /// Top-left corner of the label so that it sits centred in the key.
    pub fn label_origin(&self) -> (i32, i32) {
        let tw = font::text_width(&self.label, LABEL_SCALE);
        let th = font::text_height(LABEL_SCALE);
        (self.x + (self.w - tw) / 2, self.y + (self.h - th) / 2)
    }

    /// Translucent white fill, opaque border, then the label.
    pub fn draw(&self, frame: &mut Frame) {
        frame.blend_rect(self.x, self.y, self.w, self.h, WHITE, FILL_ALPHA);
        self.draw_outline(frame);
    }

    /// Opaque fill only; the compositor blends a whole layer of these.
    pub fn draw_fill(&self, frame: &mut Frame, color: u32) {
        frame.fill_rect(self.x, self.y, self.w, self.h, color);
    }

    /// Border and label at full opacity.
    pub fn draw_outline(&self, frame: &mut Frame) {
        frame.draw_border(self.x, self.y, self.w, self.h, BORDER_THICKNESS, WHITE);
        self.draw_label(frame);
    }

    /// Green key with its label: the click acknowledgment.
    pub fn draw_pressed(&self, frame: &mut Frame) {
        frame.fill_rect(self.x, self.y, self.w, self.h, GREEN);
        self.draw_label(frame);
    }

    fn draw_label(&self, frame: &mut Frame) {
        let (lx, ly) = self.label_origin();
        frame.draw_text(&self.label, lx, ly, LABEL_SCALE, WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{blend, BLACK};

    fn q() -> Button { Button::new(100, 100, 85, 85, "Q") }

    #[test]
    fn hover_is_strict_on_every_edge() {
        let b = q();
        assert!(b.is_hover(101, 101));
        assert!(b.is_hover(184, 184));
        assert!(!b.is_hover(100, 100));
        assert!(!b.is_hover(185, 150));
        assert!(!b.is_hover(150, 185));
        assert!(!b.is_hover(100, 150));
        assert!(!b.is_hover(150, 100));
    }

    #[test]
    fn label_is_centred() {
        assert_eq!(q().label_origin(), (130, 122));
    }

    #[test]
    fn draw_blends_fill_and_keeps_border_opaque() {
        let mut f = Frame::new(300, 300, BLACK);
        q().draw(&mut f);
        // Inside the key, away from border and label.
        assert_eq!(f.pixel(110, 110), Some(blend(BLACK, WHITE, FILL_ALPHA)));
        assert_eq!(f.pixel(100, 100), Some(WHITE));
        assert_eq!(f.pixel(184, 184), Some(WHITE));
        // Outside the key is untouched.
        assert_eq!(f.pixel(50, 50), Some(BLACK));
    }

    #[test]
    fn pressed_is_green_with_label() {
        let mut f = Frame::new(300, 300, BLACK);
        let b = q();
        b.draw_pressed(&mut f);
        assert_eq!(f.pixel(105, 105), Some(GREEN));
        let (lx, ly) = b.label_origin();
        assert_eq!(f.pixel(lx, ly), Some(WHITE));
    }
}
