//! Session recording
//!
//! - RecordingChannel trait for the capture sources
//! - SessionRecorder to run them together as one session

pub mod channel;
pub mod coordinator;
pub mod state;

pub use channel::{ChannelType, RecordingChannel, RecordingError, RecordingResult};
pub use coordinator::{RecordingEvent, SessionRecorder};
pub use state::{RecordingOutput, RecordingSession, RecordingState, RecordingStatus};
