//! Frame sources — a webcam (feature `camera`) or a synthetic test card.
//!
//! A failed read is fatal: the interaction loop stops on the first
//! [`KeyboardError::Capture`].

use crate::error::{KeyboardError, Result};
use crate::frame::{rgb, Frame};

/// Anything that can hand the loop its next frame.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Frame>;
}

// ════════════════════════════════════════════════════════════════════════════
// SyntheticSource — no hardware needed
// ════════════════════════════════════════════════════════════════════════════

/// Slowly drifting colour gradient standing in for the camera image.
///
/// The gradient is not symmetric, so mirroring is visible on screen.
pub struct SyntheticSource {
    width:  usize,
    height: usize,
    tick:   u32,
    /// Stop after this many frames; `None` runs forever.
    limit:  Option<u32>,
}

impl SyntheticSource {
    pub fn new(width: usize, height: usize) -> Self {
        SyntheticSource { width, height, tick: 0, limit: None }
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Frame> {
        if let Some(limit) = self.limit {
            if self.tick >= limit {
                return Err(KeyboardError::Capture(format!("synthetic source ended after {} frames", limit)));
            }
        }
        let phase = (self.tick % 256) as usize;
        self.tick = self.tick.wrapping_add(1);

        let (w, h) = (self.width.max(1), self.height.max(1));
        let mut pixels = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let r = (x * 160 / w) as u8;
                let g = (y * 120 / h) as u8;
                let b = ((x + phase) % 256 / 2) as u8 + 40;
                pixels.push(rgb(r, g, b));
            }
        }
        Frame::from_pixels(self.width, self.height, pixels)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CameraSource — real webcam (feature = "camera")
// ════════════════════════════════════════════════════════════════════════════

/// Webcam capture via `nokhwa`.
///
/// The requested resolution is a hint; frames come back at whatever size
/// the device honours.
#[cfg(feature = "camera")]
pub struct CameraSource {
    camera: nokhwa::Camera,
}

#[cfg(feature = "camera")]
impl CameraSource {
    pub fn open(index: u32, width: u32, height: u32) -> Result<Self> {
        use nokhwa::pixel_format::RgbFormat;
        use nokhwa::utils::{
            CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
        };

        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(Resolution::new(width, height), FrameFormat::MJPEG, 30),
        ));
        let mut camera = nokhwa::Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| KeyboardError::Capture(e.to_string()))?;
        camera.open_stream().map_err(|e| KeyboardError::Capture(e.to_string()))?;

        let res = camera.resolution();
        tracing::info!(index, width = res.width(), height = res.height(), "camera opened");
        Ok(CameraSource { camera })
    }
}

#[cfg(feature = "camera")]
impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<Frame> {
        use nokhwa::pixel_format::RgbFormat;

        let buffer = self.camera.frame().map_err(|e| KeyboardError::Capture(e.to_string()))?;
        let image = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| KeyboardError::Capture(e.to_string()))?;
        let (w, h) = (image.width() as usize, image.height() as usize);
        Frame::from_rgb(w, h, image.as_raw())
    }
}

#[cfg(feature = "camera")]
impl Drop for CameraSource {
    fn drop(&mut self) {
        let _ = self.camera.stop_stream();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
