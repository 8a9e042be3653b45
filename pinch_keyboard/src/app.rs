//! Top-level interaction loop.
//!
//! `Pipeline` owns the buttons and the `TypingSession` and turns one raw
//! camera frame into one composited frame.  `run` wires a frame source, a
//! hand detector and the window around it.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::button::Button;
use crate::capture::{FrameSource, SyntheticSource};
use crate::error::Result;
use crate::frame::Frame;
use crate::layout::{build_layout, LayoutConfig};
use crate::overlay;
use crate::session::{KeyState, TypingSession, DEFAULT_CLICK_THRESHOLD, DEFAULT_COOLDOWN};
use crate::tracking::{HandDetector, MediaPipeConfig, MediaPipeDetector, SimHandDetector, SimPointer};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind { Synthetic, Camera }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorKind { Simulated, MediaPipe }

/// Configuration for the full application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source:          SourceKind,
    pub camera_index:    u32,
    /// Requested capture size; also the initial window size.
    pub frame_width:     usize,
    pub frame_height:    usize,
    pub detector:        DetectorKind,
    pub mediapipe:       MediaPipeConfig,
    pub layout:          LayoutConfig,
    pub click_threshold: f32,
    pub cooldown:        Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            source:          if cfg!(feature = "camera") { SourceKind::Camera } else { SourceKind::Synthetic },
            camera_index:    0,
            frame_width:     1280,
            frame_height:    720,
            detector:        DetectorKind::Simulated,
            mediapipe:       MediaPipeConfig::default(),
            layout:          LayoutConfig::default(),
            click_threshold: DEFAULT_CLICK_THRESHOLD,
            cooldown:        DEFAULT_COOLDOWN,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pipeline — one frame in, one composited frame out
// ════════════════════════════════════════════════════════════════════════════

pub struct Pipeline {
    buttons: Vec<Button>,
    session: TypingSession,
}

impl Pipeline {
    pub fn new(cfg: &AppConfig) -> Result<Self> {
        cfg.layout.validate()?;
        let buttons = build_layout(&cfg.layout);
        let session = TypingSession::new(buttons.len(), cfg.click_threshold, cfg.cooldown);
        Ok(Pipeline { buttons, session })
    }

    pub fn text(&self) -> &str { self.session.text() }

    /// Mirror, overlay, detect, type, and draw.
    ///
    /// A detector error is logged and the frame is treated as having no
    /// hands.
    pub fn process_frame(
        &mut self,
        mut frame: Frame,
        detector: &mut dyn HandDetector,
        now: Instant,
    ) -> (Frame, KeyState) {
        frame.mirror_horizontal();
        overlay::draw_keyboard(&mut frame, &self.buttons);

        let hands = match detector.detect(&frame) {
            Ok(h)  => h,
            Err(e) => {
                warn!(error = %e, "hand detection failed, skipping frame");
                Vec::new()
            }
        };

        let state = self.session.update(&hands, &self.buttons, now);

        overlay::draw_hands(&mut frame, &hands);
        overlay::draw_pressed(&mut frame, &self.buttons, &self.session.cooling_buttons(now));
        overlay::draw_text_bar(&mut frame, self.session.text());
        (frame, state)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

fn open_source(cfg: &AppConfig) -> Result<Box<dyn FrameSource>> {
    match cfg.source {
        SourceKind::Synthetic => Ok(Box::new(SyntheticSource::new(cfg.frame_width, cfg.frame_height))),
        #[cfg(feature = "camera")]
        SourceKind::Camera => Ok(Box::new(crate::capture::CameraSource::open(
            cfg.camera_index, cfg.frame_width as u32, cfg.frame_height as u32,
        )?)),
        #[cfg(not(feature = "camera"))]
        SourceKind::Camera => Err(crate::error::KeyboardError::Capture(
            "built without the `camera` feature".to_string(),
        )),
    }
}

fn open_detector(cfg: &AppConfig, sim_rx: mpsc::Receiver<SimPointer>) -> Result<Box<dyn HandDetector>> {
    match cfg.detector {
        DetectorKind::Simulated => Ok(Box::new(SimHandDetector::new(sim_rx))),
        DetectorKind::MediaPipe => Ok(Box::new(MediaPipeDetector::spawn(&cfg.mediapipe)?)),
    }
}

/// Run the full application until `q`, window close, or capture failure.
///
/// Returns the typed text.
pub fn run(cfg: AppConfig) -> Result<String> {
    let mut pipeline = Pipeline::new(&cfg)?;

    // ── Sim pointer channel (window → simulated detector) ────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimPointer>();
    let mut detector = open_detector(&cfg, sim_rx)?;
    let mut source = open_source(&cfg)?;
    let mut vis = Visualizer::new(cfg.frame_width, cfg.frame_height, sim_tx)?;

    info!(source = ?cfg.source, detector = ?cfg.detector, "keyboard running, press q to quit");

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        if !vis.poll_input() { break; }

        // A failed read ends the session; there is no retry.
        let frame = source.next_frame()?;
        let (out, _) = pipeline.process_frame(frame, detector.as_mut(), Instant::now());
        vis.present(&out)?;
    }

    info!(typed = %pipeline.text(), "keyboard closed");
    Ok(pipeline.text().to_string())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
