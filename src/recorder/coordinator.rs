//! Session recorder
//!
//! Drives the screen and microphone channels through a recording session and
//! broadcasts lifecycle events.

use super::channel::{RecordingChannel, RecordingError, RecordingResult};
use super::state::{RecordingOutput, RecordingSession, RecordingState, RecordingStatus};
use parking_lot::RwLock;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events emitted during recording
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RecordingEvent {
    #[serde(rename_all = "camelCase")]
    Started { session_id: Uuid, directory: String },
    Stopped(RecordingOutput),
    Error { message: String },
}

/// Manages the recording channels of one session at a time
pub struct SessionRecorder {
    state: Arc<RwLock<RecordingState>>,

    channels: Vec<Box<dyn RecordingChannel>>,

    session: Option<RecordingSession>,

    event_tx: broadcast::Sender<RecordingEvent>,
}

impl SessionRecorder {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(RecordingState::Idle)),
            channels: Vec::new(),
            session: None,
            event_tx,
        }
    }

    /// Replace the channels used by the next session
    pub fn set_channels(&mut self, channels: Vec<Box<dyn RecordingChannel>>) -> RecordingResult<()> {
        if self.state() == RecordingState::Recording {
            return Err(RecordingError::AlreadyRecording);
        }
        for channel in &channels {
            tracing::info!("Adding channel: {}", channel.id());
        }
        self.channels = channels;
        Ok(())
    }

    pub fn state(&self) -> RecordingState {
        *self.state.read()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RecordingEvent> {
        self.event_tx.subscribe()
    }

    pub fn status(&self) -> RecordingStatus {
        RecordingStatus {
            state: self.state(),
            session: self.session.clone(),
            duration_ms: self.session.as_ref().map(|s| s.duration_ms()).unwrap_or(0.0),
        }
    }

    fn emit(&self, event: RecordingEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    /// Start a session in a new timestamped directory under `output_dir`
    pub async fn start(&mut self, output_dir: &Path) -> RecordingResult<RecordingSession> {
        if self.state() != RecordingState::Idle {
            return Err(RecordingError::AlreadyRecording);
        }
        if self.channels.is_empty() {
            return Err(RecordingError::ConfigurationError("No recording channels configured".to_string()));
        }

        let session = RecordingSession::new(output_dir);
        let directory = PathBuf::from(&session.directory);
        std::fs::create_dir_all(&directory)?;

        tracing::info!("Starting recording session {} in {}", session.id, session.directory);

        let mut started = 0;
        let mut failure = None;
        for channel in &mut self.channels {
            let result = match channel.initialize(&directory).await {
                Ok(()) => channel.start().await,
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => started += 1,
                Err(e) => {
                    tracing::error!("Channel {} failed to start: {}", channel.id(), e);
                    failure = Some(e);
                    break;
                }
            }
        }

        if let Some(e) = failure {
            // Roll back the channels that did start; their buffers are discarded
            for channel in self.channels.iter_mut().take(started) {
                if let Err(abort_err) = channel.abort() {
                    tracing::warn!("Channel {} failed to abort during rollback: {}", channel.id(), abort_err);
                }
            }
            if let Err(remove_err) = std::fs::remove_dir(&directory) {
                tracing::warn!("Failed to remove session directory {:?}: {}", directory, remove_err);
            }
            self.emit(RecordingEvent::Error { message: e.to_string() });
            return Err(e);
        }

        *self.state.write() = RecordingState::Recording;
        self.session = Some(session.clone());
        self.emit(RecordingEvent::Started {
            session_id: session.id,
            directory: session.directory.clone(),
        });

        tracing::info!("Recording started");
        Ok(session)
    }

    /// Stop every channel and flush its file.
    ///
    /// All channels are stopped even when one fails; the first error is
    /// returned and the recorder is idle afterwards either way.
    pub async fn stop(&mut self) -> RecordingResult<RecordingOutput> {
        if self.state() != RecordingState::Recording {
            return Err(RecordingError::NotRecording);
        }
        let mut session = self.session.take().ok_or(RecordingError::NotRecording)?;

        tracing::info!("Stopping recording session {}", session.id);
        session.end();

        let mut first_error = None;
        for channel in &mut self.channels {
            if let Err(e) = channel.stop().await {
                tracing::error!("Channel {} failed to stop: {}", channel.id(), e);
                first_error.get_or_insert(e);
            }
        }

        *self.state.write() = RecordingState::Idle;

        if let Some(e) = first_error {
            self.emit(RecordingEvent::Error { message: e.to_string() });
            return Err(e);
        }

        let output = RecordingOutput {
            session_id: session.id,
            directory: session.directory.clone(),
            duration_ms: session.duration_ms(),
            output_files: self.channels.iter().flat_map(|c| c.output_files()).collect(),
        };

        self.emit(RecordingEvent::Stopped(output.clone()));
        tracing::info!("Recording stopped. Duration: {}ms", output.duration_ms);
        Ok(output)
    }
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new()
    }
}
