//! Hand tracking — both from a MediaPipe helper process and mouse simulation.
//!
//! The public interface is the [`HandDetector`] trait: given a frame, return
//! zero or more [`Hand`]s with 21 landmarks in frame-pixel coordinates.
//! The interaction loop doesn't need to know whether the hands came from a
//! real model or from the mouse.

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::mpsc::{Receiver, TryRecvError};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{KeyboardError, Result};
use crate::frame::Frame;

/// Hand landmark indices (MediaPipe hand model convention).
pub mod landmarks {
    pub const WRIST:             usize = 0;
    pub const THUMB_CMC:         usize = 1;
    pub const THUMB_MCP:         usize = 2;
    pub const THUMB_IP:          usize = 3;
    pub const THUMB_TIP:         usize = 4;
    pub const INDEX_FINGER_MCP:  usize = 5;
    pub const INDEX_FINGER_PIP:  usize = 6;
    pub const INDEX_FINGER_DIP:  usize = 7;
    pub const INDEX_FINGER_TIP:  usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP:   usize = 13;
    pub const RING_FINGER_PIP:   usize = 14;
    pub const RING_FINGER_DIP:   usize = 15;
    pub const RING_FINGER_TIP:   usize = 16;
    pub const PINKY_MCP:         usize = 17;
    pub const PINKY_PIP:         usize = 18;
    pub const PINKY_DIP:         usize = 19;
    pub const PINKY_TIP:         usize = 20;
}

pub const LANDMARK_COUNT: usize = 21;

/// Bones of the hand skeleton, as landmark index pairs.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (0, 17), (17, 18), (18, 19), (19, 20),
];

// ════════════════════════════════════════════════════════════════════════════
// Landmark / Hand
// ════════════════════════════════════════════════════════════════════════════

/// One keypoint in frame pixels; `z` is the detector's relative depth.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self { Landmark { x, y, z } }

    /// Integer pixel position (truncated, like the detector's own pixel list).
    pub fn pixel(&self) -> (i32, i32) { (self.x as i32, self.y as i32) }

    /// Distance in the image plane; depth is ignored.
    pub fn distance_2d(&self, other: &Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// One detected hand.
#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    pub landmarks:  [Landmark; LANDMARK_COUNT],
    /// "Left" / "Right" as reported by the detector.
    pub handedness: String,
    pub score:      f32,
}

impl Hand {
    pub fn from_landmarks(landmarks: [Landmark; LANDMARK_COUNT], handedness: &str, score: f32) -> Self {
        Hand { landmarks, handedness: handedness.to_string(), score }
    }

    pub fn index_tip(&self)  -> Landmark { self.landmarks[landmarks::INDEX_FINGER_TIP] }
    pub fn middle_tip(&self) -> Landmark { self.landmarks[landmarks::MIDDLE_FINGER_TIP] }

    /// Index ↔ middle fingertip distance — the pinch measure.
    pub fn pinch_distance(&self) -> f32 {
        self.index_tip().distance_2d(&self.middle_tip())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandDetector trait — unified interface for the model and the simulator
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can find hands in a frame.
pub trait HandDetector {
    /// Hands in `frame`, best first.  An empty vector is a normal outcome.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Hand>>;
}

// ════════════════════════════════════════════════════════════════════════════
// MediaPipeDetector — helper process speaking a line protocol
// ════════════════════════════════════════════════════════════════════════════

/// How to launch the MediaPipe helper.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaPipeConfig {
    pub program: String,
    pub script:  PathBuf,
    pub min_detection_confidence: f32,
    pub max_hands: u32,
}

impl Default for MediaPipeConfig {
    fn default() -> Self {
        MediaPipeConfig {
            program: "python3".to_string(),
            script:  PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/scripts/hand_detect.py")),
            min_detection_confidence: 0.9,
            max_hands: 2,
        }
    }
}

/// Hand detector backed by a MediaPipe helper process.
///
/// # Protocol
///
/// After start-up the helper prints `READY`.  Then, per frame, we write a
/// 12-byte header (`width`, `height`, `channels` as little-endian `u32`)
/// followed by raw RGB bytes, and read back exactly one JSON line:
///
/// ```text
/// {"hands":[{"handedness":"Right","score":0.97,"landmarks":[{"x":0.41,"y":0.22,"z":-0.01}, …]}],"error":null}
/// ```
///
/// `x` and `y` are normalised to the frame size; they are scaled to pixels
/// here.  `z` is scaled by the width, matching the usual pixel-list
/// convention.
pub struct MediaPipeDetector {
    process: Child,
    stdin:   ChildStdin,
    stdout:  BufReader<ChildStdout>,
    min_confidence: f32,
    /// Set once the helper stops answering; later frames see no hands.
    exited:  bool,
}

impl MediaPipeDetector {
    pub fn spawn(cfg: &MediaPipeConfig) -> Result<Self> {
        if !cfg.script.exists() {
            return Err(KeyboardError::Detector(format!(
                "helper script not found at {}", cfg.script.display()
            )));
        }

        info!(program = %cfg.program, script = %cfg.script.display(), "starting MediaPipe helper");

        let mut process = Command::new(&cfg.program)
            .arg(&cfg.script)
            .arg("--min-detection-confidence").arg(cfg.min_detection_confidence.to_string())
            .arg("--max-hands").arg(cfg.max_hands.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let stdin = process.stdin.take()
            .ok_or_else(|| KeyboardError::Detector("helper stdin unavailable".into()))?;
        let stdout = process.stdout.take()
            .ok_or_else(|| KeyboardError::Detector("helper stdout unavailable".into()))?;
        let mut stdout = BufReader::new(stdout);

        let mut ready = String::new();
        stdout.read_line(&mut ready)?;
        if ready.trim() != "READY" {
            let _ = process.kill();
            return Err(KeyboardError::Detector(format!(
                "helper did not signal ready, got {:?}", ready.trim()
            )));
        }

        info!("MediaPipe helper ready");
        Ok(MediaPipeDetector {
            process,
            stdin,
            stdout,
            min_confidence: cfg.min_detection_confidence,
            exited:  false,
        })
    }

    /// Send one frame, return the raw reply line.
    fn exchange(&mut self, frame: &Frame) -> Result<String> {
        let (w, h) = (frame.width() as u32, frame.height() as u32);
        self.stdin.write_all(&w.to_le_bytes())?;
        self.stdin.write_all(&h.to_le_bytes())?;
        self.stdin.write_all(&3u32.to_le_bytes())?;
        self.stdin.write_all(&frame.to_rgb())?;
        self.stdin.flush()?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(KeyboardError::Detector("helper closed its output".into()));
        }
        Ok(line)
    }
}

impl HandDetector for MediaPipeDetector {
    /// A broken pipe or EOF is reported once; after that the helper is
    /// considered gone and every frame has no hands.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Hand>> {
        if self.exited {
            return Ok(Vec::new());
        }
        let line = match self.exchange(frame) {
            Ok(line) => line,
            Err(e) => {
                self.exited = true;
                return Err(KeyboardError::Detector(format!(
                    "helper stopped responding, hand tracking disabled: {}", e
                )));
            }
        };
        parse_detection(&line, frame.width() as f32, frame.height() as f32, self.min_confidence)
    }
}

impl Drop for MediaPipeDetector {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f32,
    y: f32,
    #[serde(default)]
    z: f32,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default)]
    handedness: String,
    score: f32,
    landmarks: Vec<LandmarkJson>,
}

#[derive(Deserialize, Debug)]
struct DetectionJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Turn one helper response line into pixel-space hands.
///
/// Hands below `min_confidence` or without exactly 21 landmarks are
/// dropped.  A reported `error` yields no hands.
pub fn parse_detection(line: &str, width: f32, height: f32, min_confidence: f32) -> Result<Vec<Hand>> {
    let result: DetectionJson = serde_json::from_str(line.trim())?;

    if let Some(error) = result.error {
        warn!(%error, "hand detector reported an error");
        return Ok(Vec::new());
    }

    let mut hands = Vec::with_capacity(result.hands.len());
    for hand in result.hands {
        if hand.score < min_confidence {
            continue;
        }
        if hand.landmarks.len() != LANDMARK_COUNT {
            warn!(got = hand.landmarks.len(), "expected 21 landmarks, dropping hand");
            continue;
        }
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        for (p, lm) in points.iter_mut().zip(&hand.landmarks) {
            *p = Landmark::new(lm.x * width, lm.y * height, lm.z * width);
        }
        hands.push(Hand::from_landmarks(points, &hand.handedness, hand.score));
    }
    Ok(hands)
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandDetector — mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw pointer state from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimPointer {
    /// Mouse position in frame pixels; `None` when outside the window.
    pub position: Option<(f32, f32)>,
    /// Left button or Space held — fingers pinched.
    pub pinched:  bool,
}

/// Middle fingertip offset from the index tip, fingers apart.
pub const SIM_OPEN_OFFSET:    (f32, f32) = (50.0, -10.0);
/// Middle fingertip offset from the index tip, fingers pinched.
pub const SIM_PINCHED_OFFSET: (f32, f32) = (10.0, -4.0);

/// A right hand pointing up, relative to the index fingertip.  The middle
/// finger (9–12) is filled in from the pinch state.
const SIM_TEMPLATE: [(f32, f32); LANDMARK_COUNT] = [
    (20.0, 200.0),                                               // wrist
    (-20.0, 180.0), (-50.0, 155.0), (-70.0, 130.0), (-85.0, 105.0), // thumb
    (-5.0, 110.0), (-3.0, 70.0), (-1.0, 35.0), (0.0, 0.0),        // index
    (25.0, 105.0), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0),            // middle
    (50.0, 110.0), (55.0, 75.0), (58.0, 50.0), (60.0, 28.0),      // ring
    (72.0, 120.0), (80.0, 95.0), (85.0, 78.0), (88.0, 62.0),      // pinky
];

/// Synthesize a full hand whose index fingertip sits at `(x, y)`.
pub fn simulated_hand(x: f32, y: f32, pinched: bool) -> Hand {
    use landmarks::*;

    let mut points = [Landmark::default(); LANDMARK_COUNT];
    for (p, &(dx, dy)) in points.iter_mut().zip(SIM_TEMPLATE.iter()) {
        *p = Landmark::new(x + dx, y + dy, 0.0);
    }

    let (mx, my) = if pinched { SIM_PINCHED_OFFSET } else { SIM_OPEN_OFFSET };
    let mcp = points[MIDDLE_FINGER_MCP];
    let tip = Landmark::new(x + mx, y + my, 0.0);
    let lerp = |t: f32| Landmark::new(mcp.x + (tip.x - mcp.x) * t, mcp.y + (tip.y - mcp.y) * t, 0.0);
    points[MIDDLE_FINGER_PIP] = lerp(0.4);
    points[MIDDLE_FINGER_DIP] = lerp(0.7);
    points[MIDDLE_FINGER_TIP] = tip;

    Hand::from_landmarks(points, "Right", 1.0)
}

/// Hand detector driven by [`SimPointer`] updates from the window.
///
/// The visualizer sends pointer state here over a channel; only the latest
/// state matters, so everything queued since the last frame is drained.
pub struct SimHandDetector {
    rx:     Receiver<SimPointer>,
    latest: Option<SimPointer>,
}

impl SimHandDetector {
    pub fn new(rx: Receiver<SimPointer>) -> Self {
        SimHandDetector { rx, latest: None }
    }
}

impl HandDetector for SimHandDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Hand>> {
        loop {
            match self.rx.try_recv() {
                Ok(p) => self.latest = Some(p),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        let Some(SimPointer { position: Some((x, y)), pinched }) = self.latest else {
            return Ok(Vec::new());
        };
        if x < 0.0 || y < 0.0 || x >= frame.width() as f32 || y >= frame.height() as f32 {
            return Ok(Vec::new());
        }
        debug!(x, y, pinched, "simulated hand");
        Ok(vec![simulated_hand(x, y, pinched)])
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
