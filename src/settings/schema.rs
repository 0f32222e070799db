//! Settings schema
//!
//! Every field has a default, so a partial or older `settings.json` still
//! loads.

use crate::capture::Resolution;
use crate::drawing::{Color, StrokeStyle, WhiteboardLayout};
use crate::export::{AudioOutput, VideoOutput};
use crate::gesture::DEFAULT_PINCH_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub camera: CameraSettings,
    pub gesture: GestureSettings,
    pub overlay: OverlaySettings,
    pub whiteboard: WhiteboardSettings,
    pub recording: RecordingSettings,
}

impl Settings {
    /// Reject values the render loop or recorder cannot run with
    pub fn validate(&self) -> Result<(), String> {
        if !(self.gesture.pinch_threshold > 0.0) {
            return Err("Pinch threshold must be positive".to_string());
        }
        if self.gesture.tick_interval_ms == 0 {
            return Err("Tick interval must be at least 1ms".to_string());
        }
        if self.whiteboard.width == 0 || self.whiteboard.height == 0 {
            return Err("Whiteboard size must be non-zero".to_string());
        }
        if self.whiteboard.save_file_name.trim().is_empty() {
            return Err("Whiteboard file name must not be empty".to_string());
        }
        if self.recording.video.fps == 0 {
            return Err("Recording frame rate must be at least 1".to_string());
        }
        if self.recording.audio.channels == 0 || self.recording.audio.sample_rate == 0 {
            return Err("Audio channels and sample rate must be non-zero".to_string());
        }
        if self.recording.audio.chunk_frames == 0 {
            return Err("Audio chunk size must be non-zero".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Camera
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraSettings {
    /// Camera device index
    pub index: u32,
    /// Preferred resolution, highest available when unset
    pub resolution: Option<Resolution>,
    /// Mirror the feed so it behaves like a mirror
    pub mirror: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            index: 0,
            resolution: None,
            mirror: true,
        }
    }
}

// =============================================================================
// Gesture
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GestureSettings {
    /// Thumb-to-index distance in pixels below which the pen is down
    pub pinch_threshold: f64,
    /// Render loop period
    pub tick_interval_ms: u64,
    /// Hand landmark detector program and arguments; empty disables detection
    pub detector_command: Vec<String>,
    /// Draw detected landmarks on the preview
    pub show_landmarks: bool,
}

impl GestureSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
            tick_interval_ms: 10,
            detector_command: Vec::new(),
            show_landmarks: true,
        }
    }
}

// =============================================================================
// Drawing
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlaySettings {
    pub pen: StrokeStyle,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            pen: StrokeStyle::new(Color::BLUE, 10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WhiteboardSettings {
    pub width: u32,
    pub height: u32,
    pub pen: StrokeStyle,
    /// File written into the output directory by a plain save
    pub save_file_name: String,
}

impl WhiteboardSettings {
    pub fn layout(&self) -> WhiteboardLayout {
        WhiteboardLayout {
            width: self.width,
            height: self.height,
            pen: self.pen,
        }
    }
}

impl Default for WhiteboardSettings {
    fn default() -> Self {
        let layout = WhiteboardLayout::default();
        Self {
            width: layout.width,
            height: layout.height,
            pen: layout.pen,
            save_file_name: "drawing.png".to_string(),
        }
    }
}

// =============================================================================
// Recording
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordingSettings {
    /// Where session directories and whiteboard images go. Defaults to the
    /// user's video directory.
    pub output_dir: Option<String>,
    /// Display to capture, primary when unset
    pub display_id: Option<u32>,
    /// Microphone to capture, system default when unset
    pub microphone_id: Option<String>,
    pub video: VideoOutput,
    pub audio: AudioOutput,
    pub video_file_name: String,
    pub audio_file_name: String,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            output_dir: None,
            display_id: None,
            microphone_id: None,
            video: VideoOutput::default(),
            audio: AudioOutput::default(),
            video_file_name: "recording.avi".to_string(),
            audio_file_name: "recording.wav".to_string(),
        }
    }
}
