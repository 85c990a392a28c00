//! Common API types

use std::fmt;

/// Per-annotation output of one frame tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Id of the annotation this placement belongs to
    pub annotation_id: u32,
    /// Overlay-space x of the view's left edge
    pub x: f64,
    /// Screen-space y of the view
    pub y: f64,
    /// Stacking tier the collision pass settled on
    pub vertical_level: u32,
    /// Whether the view should be attached this frame; the presentation
    /// layer diffs this against the previous frame to attach/detach
    pub visible: bool,
}

/// Why camera capture-session setup failed.
///
/// The capture session itself lives in the host; this reason code is the
/// one explicit failure result it surfaces. Tracking and layout keep
/// operating on location/heading alone when capture is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSetupError {
    /// No rear capture device present
    NoCaptureDevice,
    /// The device exists but an input could not be created from it
    InputCreationFailed,
    /// The session refused the created input
    InputRejected,
}

impl fmt::Display for CaptureSetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureSetupError::NoCaptureDevice => write!(f, "no rear capture device available"),
            CaptureSetupError::InputCreationFailed => {
                write!(f, "could not create input from capture device")
            }
            CaptureSetupError::InputRejected => {
                write!(f, "capture session rejected the device input")
            }
        }
    }
}

impl std::error::Error for CaptureSetupError {}
