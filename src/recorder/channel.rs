//! Recording channel abstraction
//!
//! A channel is one capture source (screen, microphone) that buffers while
//! recording and writes its file when stopped.

use crate::export::ExportError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Recording errors
#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("Already recording")]
    AlreadyRecording,

    #[error("Not recording")]
    NotRecording,

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Capture error: {0}")]
    CaptureError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Encoding(#[from] ExportError),
}

pub type RecordingResult<T> = Result<T, RecordingError>;

/// Kind of source behind a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChannelType {
    Display,
    Microphone,
}

#[async_trait]
pub trait RecordingChannel: Send {
    /// Stable identifier, used in logs and events
    fn id(&self) -> &str;

    fn channel_type(&self) -> ChannelType;

    /// Prepare to write into `output_dir`. Called before every `start`.
    async fn initialize(&mut self, output_dir: &Path) -> RecordingResult<()>;

    /// Open the device and begin buffering
    async fn start(&mut self) -> RecordingResult<()>;

    /// Stop buffering and write the output file
    async fn stop(&mut self) -> RecordingResult<()>;

    /// Stop buffering and drop what was captured without writing anything
    fn abort(&mut self) -> RecordingResult<()>;

    fn is_recording(&self) -> bool;

    /// Files written by the last `stop`
    fn output_files(&self) -> Vec<String>;
}
