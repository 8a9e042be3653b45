//! Error type shared by every module of the crate.

use thiserror::Error;

/// Everything that can go wrong while running the keyboard.
///
/// Only [`KeyboardError::Capture`] and [`KeyboardError::Window`] end the
/// interaction loop; detector errors are logged and the frame is treated as
/// having no hands.
#[derive(Error, Debug)]
pub enum KeyboardError {
    // ===== Fatal =====
    #[error("frame capture failed: {0}")]
    Capture(String),

    #[error("display window error: {0}")]
    Window(String),

    #[error("invalid keyboard layout: {0}")]
    InvalidLayout(String),

    // ===== Per-frame, recoverable =====
    #[error("hand detector error: {0}")]
    Detector(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed detector output: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KeyboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_part() {
        assert_eq!(
            KeyboardError::Capture("no device".into()).to_string(),
            "frame capture failed: no device"
        );
        assert_eq!(
            KeyboardError::Detector("helper exited".into()).to_string(),
            "hand detector error: helper exited"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: KeyboardError = io.into();
        assert!(matches!(err, KeyboardError::Io(_)));
        assert!(err.to_string().contains("pipe"));
    }
}
