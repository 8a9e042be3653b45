//! # pinch_keyboard
//!
//! A virtual QWERTY keyboard drawn over a mirrored camera feed.  Hover the
//! index fingertip over a key and pinch index and middle fingertips together
//! to type it.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Hand | Action |
//! |---|---|---|
//! | Index fingertip inside a key | First detected | Key is hovered |
//! | Index ↔ middle tip < 30 px while hovering | First detected | Key label appended to the typed text |
//! | Pinch held on the same key | First detected | Ignored for 300 ms (per-key cooldown), then repeats |
//!
//! ## Per-frame pipeline
//!
//! capture → mirror → keyboard overlay → detect hands → hover / pinch →
//! click acknowledgment + hand skeleton + text bar → window.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: a synthetic frame source, and the mouse
//!   stands in for the hand.
//! * `camera` — **Hardware capture**: frames from a webcam via `nokhwa`.
//!
//! Hand landmarks come either from the mouse simulator or from a MediaPipe
//! helper process (`--detector mediapipe`), independent of the frame source.
//!
//! ### Simulation controls
//!
//! | Input | Gesture |
//! |---|---|
//! | Mouse position | Index fingertip |
//! | Left button / `Space` held | Pinch |
//! | `Q` | Quit |

pub mod error;
pub mod font;
pub mod frame;
pub mod button;
pub mod layout;
pub mod tracking;
pub mod capture;
pub mod session;
pub mod overlay;
pub mod visualizer;
pub mod app;

pub use error::{KeyboardError, Result};
