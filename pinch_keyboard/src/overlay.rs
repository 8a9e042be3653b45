//! Frame compositor: keyboard overlay, click acknowledgments, hand skeleton
//! and the typed-text bar.
//!
//! Layout (default 1280×720 camera):
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │    [Q][W][E][R][T][Y][U][I][O][P]                            │
//! │    [A][S][D][F][G][H][J][K][L]                               │
//! │    [Z][X][C][V][B][N][M]                                     │
//! │  ┌──────────────────────────────────────────────────────┐    │
//! │  │ TYPED TEXT                                            │    │
//! │  └──────────────────────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::button::Button;
use crate::font;
use crate::frame::{rgb, Frame, DARK_GREY, WHITE};
use crate::tracking::{Hand, HAND_CONNECTIONS};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

/// Opacity of the key fills when the whole keyboard is composited.
pub const KEYBOARD_ALPHA: f32 = 0.2;

pub const TEXT_BAR_X0:     i32 = 50;
pub const TEXT_BAR_Y0:     i32 = 400;
pub const TEXT_BAR_X1:     i32 = 1200;
pub const TEXT_BAR_Y1:     i32 = 500;
pub const TEXT_MARGIN:     i32 = 10;
pub const TEXT_SCALE:      i32 = 10;

const SKELETON_BONE:  u32 = rgb(0, 255, 0);
const SKELETON_JOINT: u32 = rgb(255, 0, 255);
const BONE_THICKNESS: i32 = 2;
const JOINT_RADIUS:   i32 = 5;

// ════════════════════════════════════════════════════════════════════════════
// Keyboard
// ════════════════════════════════════════════════════════════════════════════

/// Two-pass keyboard render.
///
/// The fills go onto a copy which is blended over the frame at
/// [`KEYBOARD_ALPHA`]; borders and labels go straight onto the frame so they
/// stay crisp.
pub fn draw_keyboard(frame: &mut Frame, buttons: &[Button]) {
    let mut fills = frame.clone();
    for b in buttons {
        b.draw_fill(&mut fills, WHITE);
    }
    frame.blend_with(&fills, KEYBOARD_ALPHA);
    for b in buttons {
        b.draw_outline(frame);
    }
}

/// Green acknowledgment over every key in `pressed`.
pub fn draw_pressed(frame: &mut Frame, buttons: &[Button], pressed: &[usize]) {
    for &i in pressed {
        if let Some(b) = buttons.get(i) {
            b.draw_pressed(frame);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Hands
// ════════════════════════════════════════════════════════════════════════════

/// Bones as lines, joints as dots, for every hand.
pub fn draw_hands(frame: &mut Frame, hands: &[Hand]) {
    for hand in hands {
        for &(a, b) in HAND_CONNECTIONS.iter() {
            let (x0, y0) = hand.landmarks[a].pixel();
            let (x1, y1) = hand.landmarks[b].pixel();
            frame.draw_line(x0, y0, x1, y1, BONE_THICKNESS, SKELETON_BONE);
        }
        for lm in hand.landmarks.iter() {
            let (x, y) = lm.pixel();
            frame.fill_circle(x, y, JOINT_RADIUS, SKELETON_JOINT);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Text bar
// ════════════════════════════════════════════════════════════════════════════

/// The longest suffix of `text` that fits in `max_width` pixels at `scale`.
///
/// When the typed text outgrows the bar the newest characters stay
/// visible; the buffer itself is never shortened.
pub fn visible_tail(text: &str, max_width: i32, scale: i32) -> &str {
    // n glyphs take n * ADVANCE * scale - scale pixels.
    let step = font::ADVANCE * scale;
    if step <= 0 {
        return text;
    }
    let fit = ((max_width + scale) / step).max(0) as usize;
    if fit == 0 {
        return "";
    }
    match text.char_indices().rev().nth(fit - 1) {
        Some((i, _)) => &text[i..],
        None         => text,
    }
}

/// Dark band near the bottom with the typed text left-aligned inside.
pub fn draw_text_bar(frame: &mut Frame, text: &str) {
    frame.fill_rect(
        TEXT_BAR_X0, TEXT_BAR_Y0,
        TEXT_BAR_X1 - TEXT_BAR_X0, TEXT_BAR_Y1 - TEXT_BAR_Y0,
        DARK_GREY,
    );
    let inner = TEXT_BAR_X1 - TEXT_BAR_X0 - 2 * TEXT_MARGIN;
    let shown = visible_tail(text, inner, TEXT_SCALE);
    let y = TEXT_BAR_Y0 + (TEXT_BAR_Y1 - TEXT_BAR_Y0 - font::text_height(TEXT_SCALE)) / 2;
    frame.draw_text(shown, TEXT_BAR_X0 + TEXT_MARGIN, y, TEXT_SCALE, WHITE);
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{blend, BLACK, GREEN};
    use crate::layout::{build_layout, LayoutConfig};
    use crate::tracking::simulated_hand;

    #[test]
    fn keyboard_fill_is_translucent_and_border_crisp() {
        let buttons = build_layout(&LayoutConfig::default());
        let mut f = Frame::new(1280, 720, BLACK);
        draw_keyboard(&mut f, &buttons);
        assert_eq!(f.pixel(110, 110), Some(blend(BLACK, WHITE, KEYBOARD_ALPHA)));
        assert_eq!(f.pixel(100, 100), Some(WHITE));
        assert_eq!(f.pixel(187, 150), Some(BLACK)); // gap between Q and W
        assert_eq!(f.pixel(20, 20), Some(BLACK));
    }

    #[test]
    fn pressed_keys_turn_green() {
        let buttons = build_layout(&LayoutConfig::default());
        let mut f = Frame::new(1280, 720, BLACK);
        draw_pressed(&mut f, &buttons, &[1, 99]);
        assert_eq!(f.pixel(195, 105), Some(GREEN)); // W
        assert_eq!(f.pixel(105, 105), Some(BLACK)); // Q untouched
    }

    #[test]
    fn text_bar_draws_band_and_text() {
        let mut f = Frame::new(1280, 720, BLACK);
        draw_text_bar(&mut f, "T");
        assert_eq!(f.pixel(55, 405), Some(DARK_GREY));
        assert_eq!(f.pixel(1199, 499), Some(DARK_GREY));
        assert_eq!(f.pixel(1200, 450), Some(BLACK));
        // 'T' top bar starts at the margin, vertically centred.
        assert_eq!(f.pixel(60, 425), Some(WHITE));
    }

    #[test]
    fn visible_tail_keeps_newest_characters() {
        // Each character advances 40 px at scale 10; 3 chars need 110 px.
        assert_eq!(visible_tail("ABCDE", 110, 10), "CDE");
        assert_eq!(visible_tail("AB", 1000, 10), "AB");
        assert_eq!(visible_tail("", 10, 10), "");
        assert_eq!(visible_tail("ABC", 5, 10), "");
    }

    #[test]
    fn visible_tail_of_huge_buffer_is_one_pass() {
        let mut text = "A".repeat(200_000);
        text.push_str("XYZ");
        let inner = TEXT_BAR_X1 - TEXT_BAR_X0 - 2 * TEXT_MARGIN;
        let shown = visible_tail(&text, inner, TEXT_SCALE);
        // 1130 px at 40 px per glyph: 28 glyphs fit.
        assert_eq!(shown.chars().count(), 28);
        assert!(shown.ends_with("AXYZ"));
        assert!(font::text_width(shown, TEXT_SCALE) <= inner);
        assert!(font::text_width(&text[text.len() - 29..], TEXT_SCALE) > inner);
    }

    #[test]
    fn long_text_stays_inside_bar() {
        let mut f = Frame::new(1280, 720, BLACK);
        let long = "QWERTY".repeat(20);
        draw_text_bar(&mut f, &long);
        for x in TEXT_BAR_X1..1280 {
            assert_eq!(f.pixel(x, 430), Some(BLACK));
        }
    }

    #[test]
    fn hands_are_drawn_at_landmarks() {
        let mut f = Frame::new(640, 480, BLACK);
        draw_hands(&mut f, &[simulated_hand(300.0, 200.0, false)]);
        assert_eq!(f.pixel(300, 200), Some(SKELETON_JOINT));
        assert_eq!(f.pixel(320, 400), Some(SKELETON_JOINT)); // wrist
    }
}
