//! QWERTY layout → ordered list of [`Button`]s.

use crate::button::Button;
use crate::error::{KeyboardError, Result};

/// The three letter rows, top to bottom.
pub const KEY_ROWS: [&str; 3] = ["QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];

/// Where and how big the keys are.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutConfig {
    pub origin_x: i32,
    pub origin_y: i32,
    /// Horizontal distance between the left edges of adjacent keys.
    pub step_x:   i32,
    /// Vertical distance between the top edges of adjacent rows.
    pub step_y:   i32,
    pub key_w:    i32,
    pub key_h:    i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            origin_x: 100,
            origin_y: 100,
            step_x:   90,
            step_y:   100,
            key_w:    85,
            key_h:    85,
        }
    }
}

impl LayoutConfig {
    /// Keys must have a positive size and must not overlap their neighbours.
    pub fn validate(&self) -> Result<()> {
        if self.key_w <= 0 || self.key_h <= 0 {
            return Err(KeyboardError::InvalidLayout(format!(
                "key size must be positive, got {}x{}", self.key_w, self.key_h
            )));
        }
        if self.step_x < self.key_w || self.step_y < self.key_h {
            return Err(KeyboardError::InvalidLayout(format!(
                "step {}x{} is smaller than key {}x{}",
                self.step_x, self.step_y, self.key_w, self.key_h
            )));
        }
        Ok(())
    }
}

/// Build every key in row-major order: Q…P, A…L, Z…M.
pub fn build_layout(cfg: &LayoutConfig) -> Vec<Button> {
    KEY_ROWS
        .iter()
        .enumerate()
        .flat_map(|(row, keys)| {
            keys.chars().enumerate().map(move |(col, key)| {
                Button::new(
                    cfg.origin_x + col as i32 * cfg.step_x,
                    cfg.origin_y + row as i32 * cfg.step_y,
                    cfg.key_w,
                    cfg.key_h,
                    key.to_string(),
                )
            })
        })
        .collect()
}
