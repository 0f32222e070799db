//! Capture trait definitions
//!
//! Platform-agnostic device descriptions and the source trait that capture
//! workers pull from.

use crate::recorder::channel::RecordingResult;
use serde::{Deserialize, Serialize};

/// Information about a display/screen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    /// Unique display ID
    pub id: u32,

    /// Display name
    pub name: String,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Scale factor (e.g., 2.0 for Retina)
    pub scale_factor: f64,

    /// Whether this is the primary display
    pub is_primary: bool,

    /// Refresh rate in Hz (if available)
    pub refresh_rate: Option<u32>,
}

/// Information about an audio device
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioDeviceInfo {
    /// Unique device ID
    pub id: String,

    /// Device name
    pub name: String,

    /// Whether this is the default device
    pub is_default: bool,
}

/// Information about a camera/webcam
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraInfo {
    /// Device index or path
    pub id: String,

    /// Device name
    pub name: String,
}

/// Video resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// A device that yields one unit (frame, audio chunk) at a time.
///
/// Sources are opened and used on the capture worker's thread, so they do
/// not need to be `Send`.
pub trait CaptureSource {
    type Unit: Send + 'static;

    /// Wait a bounded time for the next unit.
    ///
    /// `Ok(None)` means nothing arrived in time; the worker re-checks its
    /// recording flag and calls again. An error ends the capture loop.
    fn acquire(&mut self) -> RecordingResult<Option<Self::Unit>>;
}
