//! Webcam capture using nokhwa
//!
//! The camera is opened and read on the render loop thread; frames are
//! decoded to RGBA for mirroring, detection and blending.

use super::frame::VideoFrame;
use super::traits::{CameraInfo, Resolution};
use nokhwa::pixel_format::RgbAFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebcamError {
    #[error("Failed to open camera {index}: {message}")]
    Open { index: u32, message: String },

    #[error("Failed to read camera frame: {0}")]
    Frame(String),
}

/// Get list of available cameras
pub fn get_cameras() -> Vec<CameraInfo> {
    match nokhwa::query(ApiBackend::Auto) {
        Ok(cameras) => cameras
            .into_iter()
            .map(|info| {
                let id = match info.index() {
                    CameraIndex::Index(i) => i.to_string(),
                    CameraIndex::String(s) => s.to_string(),
                };
                CameraInfo {
                    id,
                    name: info.human_name().to_string(),
                }
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate cameras: {:?}", e);
            Vec::new()
        }
    }
}

/// An open camera stream yielding RGBA frames
pub struct Webcam {
    camera: Camera,
}

impl Webcam {
    /// Open camera `index`, preferring `resolution` when given
    pub fn open(index: u32, resolution: Option<Resolution>) -> Result<Self, WebcamError> {
        let requested = match resolution {
            Some(r) => RequestedFormatType::HighestResolution(nokhwa::utils::Resolution::new(
                r.width, r.height,
            )),
            None => RequestedFormatType::AbsoluteHighestResolution,
        };
        let format = RequestedFormat::new::<RgbAFormat>(requested);

        let open_err = |e: nokhwa::NokhwaError| WebcamError::Open {
            index,
            message: e.to_string(),
        };

        let mut camera = Camera::new(CameraIndex::Index(index), format).map_err(open_err)?;
        camera.open_stream().map_err(open_err)?;

        let actual = camera.camera_format();
        tracing::info!(
            "Camera {} '{}' opened at {}x{} @ {}fps ({:?})",
            index,
            camera.info().human_name(),
            actual.resolution().width(),
            actual.resolution().height(),
            actual.frame_rate(),
            actual.format()
        );

        Ok(Self { camera })
    }

    /// Block for the next frame and decode it to RGBA
    pub fn frame(&mut self) -> Result<VideoFrame, WebcamError> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| WebcamError::Frame(e.to_string()))?;
        let image = buffer
            .decode_image::<RgbAFormat>()
            .map_err(|e| WebcamError::Frame(e.to_string()))?;

        Ok(VideoFrame::from_image(image))
    }
}

impl Drop for Webcam {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            tracing::warn!("Failed to stop camera stream: {}", e);
        }
    }
}
