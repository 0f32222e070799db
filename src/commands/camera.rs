//! Camera commands

use crate::camera::{PreviewSlot, RenderLoop};
use crate::capture::{self, CameraInfo};
use parking_lot::Mutex;
use tauri::ipc::Response;
use tauri::State;

/// The running render loop and its preview output
#[derive(Default)]
pub struct CameraState {
    pub preview: PreviewSlot,
    pub render_loop: Mutex<Option<RenderLoop>>,
}

impl CameraState {
    pub fn stop(&self) {
        if let Some(mut render_loop) = self.render_loop.lock().take() {
            render_loop.stop();
        }
    }
}

/// Latest composited camera frame as PNG bytes; empty before the first frame
#[tauri::command]
pub async fn get_camera_frame(state: State<'_, CameraState>) -> Result<Response, String> {
    let png = state.preview.latest().map(|p| p.png).unwrap_or_default();
    Ok(Response::new(png))
}

/// Get list of available cameras/webcams
#[tauri::command]
pub async fn get_cameras() -> Result<Vec<CameraInfo>, String> {
    Ok(capture::get_cameras())
}
