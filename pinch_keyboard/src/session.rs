//! Typing session: hover resolution, pinch gate, per-key cooldown, and the
//! typed-text buffer.
//!
//! `TypingSession` is the only mutable interaction state.  The loop calls
//! [`TypingSession::update`] once per frame with that frame's hands and the
//! current time; everything else is read-only.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::button::Button;
use crate::tracking::Hand;

/// Index ↔ middle fingertip distance below which a pinch is a click.
pub const DEFAULT_CLICK_THRESHOLD: f32 = 30.0;
/// How long a key ignores further pinches after it registered one.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(300);

// ════════════════════════════════════════════════════════════════════════════
// KeyState
// ════════════════════════════════════════════════════════════════════════════

/// Interaction state after a frame.  Button indices refer to layout order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// No hand, or the fingertip is not over any key.
    Idle,
    /// Fingertip over a key, no click registered this frame.
    Hovering(usize),
    /// A click registered on this key this frame.
    Clicked(usize),
}

/// First button, in layout order, that contains `(x, y)`.
pub fn hovered_button(buttons: &[Button], x: i32, y: i32) -> Option<usize> {
    buttons.iter().position(|b| b.is_hover(x, y))
}

// ════════════════════════════════════════════════════════════════════════════
// TypingSession
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct TypingSession {
    text:            String,
    state:           KeyState,
    /// When each button last registered a click.
    last_click:      Vec<Option<Instant>>,
    click_threshold: f32,
    cooldown:        Duration,
}

impl TypingSession {
    pub fn new(button_count: usize, click_threshold: f32, cooldown: Duration) -> Self {
        TypingSession {
            text: String::new(),
            state: KeyState::Idle,
            last_click: vec![None; button_count],
            click_threshold,
            cooldown,
        }
    }

    pub fn text(&self)  -> &str     { &self.text }
    pub fn state(&self) -> KeyState { self.state }

    /// Is `button` still inside its post-click cooldown at `now`?
    pub fn is_cooling(&self, button: usize, now: Instant) -> bool {
        match self.last_click.get(button).copied().flatten() {
            Some(t) => now.saturating_duration_since(t) < self.cooldown,
            None    => false,
        }
    }

    /// Buttons currently cooling down, in layout order.
    pub fn cooling_buttons(&self, now: Instant) -> Vec<usize> {
        (0..self.last_click.len()).filter(|&i| self.is_cooling(i, now)).collect()
    }

    /// Advance one frame.
    ///
    /// Only the first hand is consulted.  Its index fingertip selects the
    /// first button in layout order that contains it; a pinch tighter than
    /// the click threshold on a button that is not cooling down appends the
    /// button's label and starts that button's cooldown.
    pub fn update(&mut self, hands: &[Hand], buttons: &[Button], now: Instant) -> KeyState {
        let next = match hands.first() {
            None       => KeyState::Idle,
            Some(hand) => self.resolve(hand, buttons, now),
        };

        if next != self.state {
            debug!(from = ?self.state, to = ?next, "key state");
        }
        self.state = next;
        next
    }

    fn resolve(&mut self, hand: &Hand, buttons: &[Button], now: Instant) -> KeyState {
        let (x, y) = hand.index_tip().pixel();
        let Some(idx) = hovered_button(buttons, x, y) else {
            return KeyState::Idle;
        };

        let distance = hand.pinch_distance();
        if distance >= self.click_threshold || self.is_cooling(idx, now) {
            return KeyState::Hovering(idx);
        }

        if idx >= self.last_click.len() {
            self.last_click.resize(idx + 1, None);
        }
        self.last_click[idx] = Some(now);
        self.text.push_str(&buttons[idx].label);
        info!(key = %buttons[idx].label, distance, typed = %self.text, "key typed");
        KeyState::Clicked(idx)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{build_layout, LayoutConfig};
    use crate::tracking::{landmarks, Landmark, LANDMARK_COUNT};

    fn hand(index: (f32, f32), middle: (f32, f32)) -> Hand {
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        points[landmarks::INDEX_FINGER_TIP]  = Landmark::new(index.0, index.1, 0.0);
        points[landmarks::MIDDLE_FINGER_TIP] = Landmark::new(middle.0, middle.1, 0.0);
        Hand::from_landmarks(points, "Right", 1.0)
    }

    fn setup() -> (Vec<Button>, TypingSession) {
        let buttons = build_layout(&LayoutConfig::default());
        let session = TypingSession::new(buttons.len(), DEFAULT_CLICK_THRESHOLD, DEFAULT_COOLDOWN);
        (buttons, session)
    }

    #[test]
    fn pinch_on_q_types_q() {
        let (buttons, mut s) = setup();
        let st = s.update(&[hand((105.0, 105.0), (110.0, 108.0))], &buttons, Instant::now());
        assert_eq!(st, KeyState::Clicked(0));
        assert_eq!(s.text(), "Q");
    }

    #[test]
    fn pinch_threshold_is_strict() {
        let (buttons, mut s) = setup();
        let t0 = Instant::now();
        // ≈ 56.6 apart: hover only.
        let st = s.update(&[hand((500.0, 150.0), (540.0, 190.0))], &buttons, t0);
        assert_eq!(st, KeyState::Hovering(4)); // T
        // Exactly 30 apart: still not a click.
        let st = s.update(&[hand((500.0, 150.0), (530.0, 150.0))], &buttons, t0);
        assert_eq!(st, KeyState::Hovering(4));
        // ≈ 12.8 apart: click.
        let st = s.update(&[hand((500.0, 150.0), (510.0, 158.0))], &buttons, t0);
        assert_eq!(st, KeyState::Clicked(4));
        assert_eq!(s.text(), "T");
    }

    #[test]
    fn cooldown_blocks_repeat_until_elapsed() {
        let (buttons, mut s) = setup();
        let pinch = [hand((105.0, 105.0), (110.0, 108.0))];
        let t0 = Instant::now();

        s.update(&pinch, &buttons, t0);
        let st = s.update(&pinch, &buttons, t0 + Duration::from_millis(33));
        assert_eq!(st, KeyState::Hovering(0));
        assert_eq!(s.text(), "Q");
        assert!(s.is_cooling(0, t0 + Duration::from_millis(299)));

        let st = s.update(&pinch, &buttons, t0 + Duration::from_millis(300));
        assert_eq!(st, KeyState::Clicked(0));
        assert_eq!(s.text(), "QQ");
    }

    #[test]
    fn cooldown_is_per_button() {
        let (buttons, mut s) = setup();
        let t0 = Instant::now();
        s.update(&[hand((105.0, 105.0), (110.0, 108.0))], &buttons, t0);
        // W starts at x=190; pinch there right away.
        let st = s.update(&[hand((200.0, 120.0), (205.0, 125.0))], &buttons, t0 + Duration::from_millis(10));
        assert_eq!(st, KeyState::Clicked(1));
        assert_eq!(s.text(), "QW");
        assert_eq!(s.cooling_buttons(t0 + Duration::from_millis(10)), vec![0, 1]);
    }

    #[test]
    fn no_hand_leaves_text_unchanged() {
        let (buttons, mut s) = setup();
        let t0 = Instant::now();
        s.update(&[hand((105.0, 105.0), (110.0, 108.0))], &buttons, t0);
        let st = s.update(&[], &buttons, t0 + Duration::from_secs(1));
        assert_eq!(st, KeyState::Idle);
        assert_eq!(s.text(), "Q");
    }

    #[test]
    fn edges_and_gaps_are_idle() {
        let (buttons, mut s) = setup();
        let t0 = Instant::now();
        // On Q's top-left corner.
        assert_eq!(s.update(&[hand((100.0, 100.0), (101.0, 101.0))], &buttons, t0), KeyState::Idle);
        // In the 5 px gap between Q and W.
        assert_eq!(s.update(&[hand((187.0, 150.0), (188.0, 150.0))], &buttons, t0), KeyState::Idle);
        assert_eq!(s.text(), "");
    }

    #[test]
    fn only_first_hand_types() {
        let (buttons, mut s) = setup();
        let open_elsewhere = hand((20.0, 600.0), (90.0, 600.0));
        let pinch_on_q = hand((105.0, 105.0), (110.0, 108.0));
        let st = s.update(&[open_elsewhere, pinch_on_q], &buttons, Instant::now());
        assert_eq!(st, KeyState::Idle);
        assert_eq!(s.text(), "");
    }

    #[test]
    fn first_match_in_layout_order_wins() {
        let buttons = vec![
            Button::new(0, 0, 100, 100, "A"),
            Button::new(50, 50, 100, 100, "B"),
        ];
        assert_eq!(hovered_button(&buttons, 75, 75), Some(0));
        assert_eq!(hovered_button(&buttons, 120, 120), Some(1));
        assert_eq!(hovered_button(&buttons, 500, 500), None);
    }

    #[test]
    fn text_only_grows() {
        let (buttons, mut s) = setup();
        let mut t = Instant::now();
        let mut last_len = 0;
        let frames = [
            vec![hand((105.0, 105.0), (110.0, 108.0))],
            vec![],
            vec![hand((200.0, 120.0), (260.0, 120.0))],
            vec![hand((200.0, 120.0), (205.0, 120.0))],
            vec![hand((105.0, 205.0), (106.0, 206.0))],
        ];
        for hands in frames.iter() {
            t += Duration::from_millis(400);
            s.update(hands, &buttons, t);
            assert!(s.text().len() >= last_len);
            last_len = s.text().len();
        }
        assert_eq!(s.text(), "QWA");
    }
}
