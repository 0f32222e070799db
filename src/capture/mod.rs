//! Device capture
//!
//! Webcam frames for the drawing view, and the screen and microphone
//! channels used by session recording.

pub mod audio;
pub mod frame;
pub mod screen;
pub mod traits;
pub mod webcam;
pub mod worker;

pub use audio::{get_audio_input_devices, MicrophoneCaptureChannel};
pub use frame::{AudioChunk, VideoFrame};
pub use screen::{get_displays, ScreenCaptureChannel};
pub use traits::{AudioDeviceInfo, CameraInfo, CaptureSource, DisplayInfo, Resolution};
pub use webcam::{get_cameras, Webcam, WebcamError};
pub use worker::CaptureWorker;
