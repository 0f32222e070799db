//! Screen capture using xcap
//!
//! Screenshots of one display are taken at the output frame rate and kept
//! in memory until the session stops, then encoded in one pass.

use super::frame::VideoFrame;
use super::traits::{CaptureSource, DisplayInfo};
use super::worker::CaptureWorker;
use crate::export::{self, VideoOutput};
use crate::recorder::channel::{ChannelType, RecordingChannel, RecordingError, RecordingResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use xcap::Monitor;

/// Get list of available displays
pub fn get_displays() -> Vec<DisplayInfo> {
    match Monitor::all() {
        Ok(monitors) => monitors
            .iter()
            .map(|monitor| {
                let refresh = monitor.frequency().round() as u32;
                DisplayInfo {
                    id: monitor.id(),
                    name: monitor.name().to_string(),
                    width: monitor.width(),
                    height: monitor.height(),
                    scale_factor: monitor.scale_factor() as f64,
                    is_primary: monitor.is_primary(),
                    refresh_rate: Some(refresh).filter(|&r| r > 0),
                }
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate displays: {}", e);
            Vec::new()
        }
    }
}

/// Pick the requested display, or the primary one
fn find_monitor(display_id: Option<u32>) -> RecordingResult<Monitor> {
    let monitors = Monitor::all()
        .map_err(|e| RecordingError::DeviceNotFound(format!("Failed to enumerate displays: {}", e)))?;

    let found = match display_id {
        Some(id) => monitors.into_iter().find(|m| m.id() == id),
        None => {
            let mut monitors = monitors;
            let primary = monitors.iter().position(|m| m.is_primary()).unwrap_or(0);
            (!monitors.is_empty()).then(|| monitors.swap_remove(primary))
        }
    };

    found.ok_or_else(|| match display_id {
        Some(id) => RecordingError::DeviceNotFound(format!("Display {} not found", id)),
        None => RecordingError::DeviceNotFound("No display found".to_string()),
    })
}

/// Sleeps between captures so frames arrive at the output rate
#[derive(Debug)]
pub struct FramePacer {
    interval: Duration,
    last: Option<Instant>,
}

impl FramePacer {
    pub fn new(fps: u32) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block until one interval has passed since the previous call
    pub fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// One display as a capture source
pub struct ScreenSource {
    monitor: Monitor,
    pacer: FramePacer,
}

impl ScreenSource {
    pub fn open(display_id: Option<u32>, fps: u32) -> RecordingResult<Self> {
        let monitor = find_monitor(display_id)?;
        tracing::info!(
            "Capturing display {} '{}' ({}x{}) at {}fps",
            monitor.id(),
            monitor.name(),
            monitor.width(),
            monitor.height(),
            fps
        );
        Ok(Self {
            monitor,
            pacer: FramePacer::new(fps),
        })
    }
}

impl CaptureSource for ScreenSource {
    type Unit = VideoFrame;

    fn acquire(&mut self) -> RecordingResult<Option<VideoFrame>> {
        self.pacer.wait();
        let image = self
            .monitor
            .capture_image()
            .map_err(|e| RecordingError::CaptureError(format!("Screenshot failed: {}", e)))?;

        Ok(Some(VideoFrame::from_image(image)))
    }
}

/// Screen recording channel
pub struct ScreenCaptureChannel {
    id: String,
    display_id: Option<u32>,
    output: VideoOutput,
    file_name: String,
    output_dir: Option<PathBuf>,
    output_files: Arc<Mutex<Vec<String>>>,
    worker: CaptureWorker<VideoFrame>,
}

impl ScreenCaptureChannel {
    pub fn new(display_id: Option<u32>, output: VideoOutput, file_name: impl Into<String>) -> Self {
        Self {
            id: match display_id {
                Some(id) => format!("display-{}", id),
                None => "display-primary".to_string(),
            },
            display_id,
            output,
            file_name: file_name.into(),
            output_dir: None,
            output_files: Arc::new(Mutex::new(Vec::new())),
            worker: CaptureWorker::new("screen"),
        }
    }
}

#[async_trait]
impl RecordingChannel for ScreenCaptureChannel {
    fn id(&self) -> &str {
        &self.id
    }

    fn channel_type(&self) -> ChannelType {
        ChannelType::Display
    }

    async fn initialize(&mut self, output_dir: &Path) -> RecordingResult<()> {
        if !export::ffmpeg_available() {
            return Err(RecordingError::ConfigurationError(
                "FFmpeg not found. Please install FFmpeg and make sure it is on PATH".to_string(),
            ));
        }

        self.output_dir = Some(output_dir.to_path_buf());
        self.output_files.lock().clear();

        tracing::info!("Screen capture channel initialized ({})", self.id);
        Ok(())
    }

    async fn start(&mut self) -> RecordingResult<()> {
        if self.output_dir.is_none() {
            return Err(RecordingError::ConfigurationError("Output directory not set".to_string()));
        }

        let display_id = self.display_id;
        let fps = self.output.fps;
        self.worker.start(move || ScreenSource::open(display_id, fps))
    }

    async fn stop(&mut self) -> RecordingResult<()> {
        let frames = self.worker.stop()?;

        let output_dir = self
            .output_dir
            .clone()
            .ok_or_else(|| RecordingError::ConfigurationError("Output directory not set".to_string()))?;
        let path = output_dir.join(&self.file_name);
        let output = self.output.clone();

        let written = tokio::task::spawn_blocking(move || export::write_video(&path, &output, &frames))
            .await
            .map_err(|e| RecordingError::CaptureError(format!("Video encoder task failed: {}", e)))??;

        if let Some(file) = written {
            self.output_files.lock().push(file.path);
        }
        Ok(())
    }

    fn abort(&mut self) -> RecordingResult<()> {
        let frames = self.worker.stop()?;
        tracing::info!("Discarded {} screen frames", frames.len());
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.worker.is_recording()
    }

    fn output_files(&self) -> Vec<String> {
        self.output_files.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pacer_interval_from_fps() {
        assert_eq!(FramePacer::new(8).interval(), Duration::from_millis(125));
        assert_eq!(FramePacer::new(0).interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_pacer_spaces_calls() {
        let mut pacer = FramePacer::new(50);
        let start = Instant::now();
        pacer.wait();
        pacer.wait();
        pacer.wait();
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_channel_id_names_display() {
        let channel = ScreenCaptureChannel::new(Some(3), VideoOutput::default(), "recording.avi");
        assert_eq!(channel.id(), "display-3");
        assert_eq!(channel.channel_type(), ChannelType::Display);
        assert!(!channel.is_recording());
    }

    #[test]
    fn test_abort_without_start_is_not_recording() {
        let mut channel = ScreenCaptureChannel::new(None, VideoOutput::default(), "recording.avi");
        assert!(matches!(channel.abort(), Err(RecordingError::NotRecording)));
        assert!(channel.output_files().is_empty());
    }
}
