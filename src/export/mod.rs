//! File output
//!
//! Writers for the session recording (video + WAV) and for whiteboard
//! images.

pub mod audio;
pub mod image;
pub mod types;
pub mod video;

pub use audio::write_wav;
pub use image::{encode_png, write_png};
pub use types::{AudioOutput, ExportError, VideoOutput, WrittenFile};
pub use video::{ffmpeg_available, write_video};
