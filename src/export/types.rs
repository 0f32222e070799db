//! Export types and configuration
//!
//! Settings and errors shared by the file writers used when a recording
//! session is flushed or the whiteboard is saved.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How captured screen frames are encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoOutput {
    /// Playback frame rate of the written file
    pub fps: u32,
    /// FFmpeg video codec
    pub codec: String,
    /// FourCC tag written into the container
    pub fourcc: Option<String>,
}

impl Default for VideoOutput {
    fn default() -> Self {
        // MPEG-4 Part 2 with an XVID tag plays nearly everywhere in AVI
        Self {
            fps: 8,
            codec: "mpeg4".to_string(),
            fourcc: Some("xvid".to_string()),
        }
    }
}

/// PCM layout of captured audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioOutput {
    pub sample_rate: u32,
    pub channels: u16,
    /// Frames per captured chunk
    pub chunk_frames: u32,
}

impl AudioOutput {
    /// Interleaved samples in one chunk
    pub fn chunk_samples(&self) -> usize {
        self.chunk_frames as usize * self.channels as usize
    }
}

impl Default for AudioOutput {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 2,
            chunk_frames: 1024,
        }
    }
}

/// Summary of a written file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrittenFile {
    pub path: String,
    /// Frames (video) or chunks (audio) written
    pub units: u64,
    pub duration_ms: f64,
}

/// Export error types
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("PNG error: {0}")]
    Png(#[from] png::EncodingError),
}

impl From<ExportError> for String {
    fn from(e: ExportError) -> String {
        e.to_string()
    }
}
