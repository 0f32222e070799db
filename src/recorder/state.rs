//! Recording state management
//!
//! Defines the recording state machine and session tracking.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Current state of the session recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    #[default]
    Idle,
    /// Screen and microphone are being captured
    Recording,
}

/// Information about one start/stop cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSession {
    pub id: Uuid,

    /// Directory the session's files are written into
    pub directory: String,

    pub started_at: DateTime<Utc>,

    pub stopped_at: Option<DateTime<Utc>>,
}

impl RecordingSession {
    /// Create a session starting now, in a timestamped directory under `output_dir`
    pub fn new(output_dir: &Path) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            directory: session_directory(output_dir, now.with_timezone(&Local))
                .to_string_lossy()
                .to_string(),
            started_at: now,
            stopped_at: None,
        }
    }

    pub fn end(&mut self) {
        self.stopped_at = Some(Utc::now());
    }

    /// Elapsed time, up to now while the session is still running
    pub fn duration_ms(&self) -> f64 {
        let end = self.stopped_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds().max(0) as f64
    }
}

/// `<output_dir>/session-YYYYMMDD-HHMMSS`
pub fn session_directory(output_dir: &Path, at: DateTime<Local>) -> PathBuf {
    output_dir.join(format!("session-{}", at.format("%Y%m%d-%H%M%S")))
}

/// Result of a completed recording
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingOutput {
    pub session_id: Uuid,

    /// Directory holding the session's files
    pub directory: String,

    pub duration_ms: f64,

    /// Files written by the channels
    pub output_files: Vec<String>,
}

/// Snapshot of the recorder for the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingStatus {
    pub state: RecordingState,
    pub session: Option<RecordingSession>,
    pub duration_ms: f64,
}
