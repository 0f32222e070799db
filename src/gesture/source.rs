//! Landmark sources
//!
//! Hand-landmark inference runs outside this process. A detector program is
//! spawned once and fed frames over stdin; it answers each frame with one line
//! of JSON on stdout.
//!
//! Request per frame: a header line `{"width":W,"height":H}` followed by
//! `W * H * 4` bytes of RGBA pixels.
//!
//! Reply per frame: `{"hands":[{"landmarks":[{"x":..,"y":..,"z":..}, ...]}]}`
//! with coordinates normalized to the frame.

use super::landmarks::Hand;
use crate::capture::VideoFrame;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use thiserror::Error;

/// Landmark detection errors
#[derive(Error, Debug)]
pub enum LandmarkError {
    #[error("Failed to start landmark detector '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Landmark detector IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Landmark detector closed its output")]
    Closed,

    #[error("Invalid landmark detector reply: {0}")]
    Protocol(#[from] serde_json::Error),
}

/// Anything that can find hands in a frame
pub trait LandmarkSource: Send {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Detect hands in an RGBA frame. An empty vector means no hand.
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<Hand>, LandmarkError>;
}

/// Source used when no detector is configured; never sees a hand
#[derive(Debug, Default)]
pub struct NoLandmarks;

impl LandmarkSource for NoLandmarks {
    fn name(&self) -> &str {
        "none"
    }

    fn detect(&mut self, _frame: &VideoFrame) -> Result<Vec<Hand>, LandmarkError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Serialize)]
struct FrameHeader {
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct DetectionReply {
    #[serde(default)]
    hands: Vec<Hand>,
}

/// Parse one reply line from the detector
pub fn parse_reply(line: &str) -> Result<Vec<Hand>, LandmarkError> {
    let reply: DetectionReply = serde_json::from_str(line.trim())?;
    Ok(reply.hands)
}

/// Landmark detector running as a child process
pub struct ProcessLandmarkSource {
    command: String,
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    line: String,
}

impl ProcessLandmarkSource {
    /// Spawn the detector. `command[0]` is the program, the rest its arguments.
    pub fn spawn(command: &[String]) -> Result<Self, LandmarkError> {
        let display = command.join(" ");
        let (program, args) = command.split_first().ok_or_else(|| LandmarkError::Spawn {
            command: display.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        })?;

        let mut process = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| LandmarkError::Spawn {
                command: display.clone(),
                source,
            })?;

        let stdin = process.stdin.take().ok_or(LandmarkError::Closed)?;
        let stdout = process.stdout.take().ok_or(LandmarkError::Closed)?;

        tracing::info!("Started landmark detector: {}", display);

        Ok(Self {
            command: display,
            process,
            stdin,
            stdout: BufReader::new(stdout),
            line: String::new(),
        })
    }
}

impl LandmarkSource for ProcessLandmarkSource {
    fn name(&self) -> &str {
        &self.command
    }

    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<Hand>, LandmarkError> {
        let header = serde_json::to_string(&FrameHeader {
            width: frame.width(),
            height: frame.height(),
        })?;
        self.stdin.write_all(header.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.write_all(frame.as_bytes())?;
        self.stdin.flush()?;

        self.line.clear();
        if self.stdout.read_line(&mut self.line)? == 0 {
            return Err(LandmarkError::Closed);
        }

        parse_reply(&self.line)
    }
}

impl Drop for ProcessLandmarkSource {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}
