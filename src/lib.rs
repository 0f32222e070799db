//! Airboard - draw in the air over your webcam.
//!
//! Pinch thumb and index finger to draw over the live camera feed or on a
//! whiteboard, and record the screen and microphone while you do.

pub mod camera;
pub mod capture;
pub mod commands;
pub mod drawing;
pub mod export;
pub mod gesture;
pub mod recorder;
pub mod settings;
pub mod utils;

use anyhow::Context;
use camera::{FrameProcessor, RenderLoop};
use commands::camera::CameraState;
use commands::recording::{RecorderState, RECORDING_EVENT};
use commands::settings::SettingsState;
use drawing::DrawingBoard;
use gesture::{LandmarkSource, NoLandmarks, PinchClassifier, ProcessLandmarkSource};
use parking_lot::Mutex;
use settings::Settings;
use std::sync::Arc;
use tauri::{Emitter, Manager};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Landmark source for the configured detector, or none
fn landmark_source(settings: &Settings) -> Box<dyn LandmarkSource> {
    let command = &settings.gesture.detector_command;
    if command.is_empty() {
        tracing::warn!("No hand detector configured; gestures are disabled");
        return Box::new(NoLandmarks);
    }
    match ProcessLandmarkSource::spawn(command) {
        Ok(source) => Box::new(source),
        Err(e) => {
            tracing::error!("{}; gestures are disabled", e);
            Box::new(NoLandmarks)
        }
    }
}

/// Open the camera and start the render loop
fn start_camera(app: &tauri::AppHandle, settings: &Settings) -> anyhow::Result<()> {
    let processor = FrameProcessor::new(
        PinchClassifier::new(settings.gesture.pinch_threshold),
        landmark_source(settings),
        settings.camera.mirror,
        settings.gesture.show_landmarks,
    );

    let board = app.state::<Arc<Mutex<DrawingBoard>>>().inner().clone();
    let camera_state = app.state::<CameraState>();
    let ops_app = app.clone();

    let index = settings.camera.index;
    let resolution = settings.camera.resolution;
    let render_loop = RenderLoop::spawn(
        move || capture::Webcam::open(index, resolution),
        processor,
        board,
        camera_state.preview.clone(),
        Box::new(move |ops| commands::drawing::emit_whiteboard_ops(&ops_app, ops)),
        settings.gesture.tick_interval(),
    )
    .with_context(|| format!("Failed to start camera {}", index))?;

    *camera_state.render_loop.lock() = Some(render_loop);
    Ok(())
}

/// Forward recorder lifecycle events to every window
fn forward_recording_events(app: &tauri::AppHandle) {
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        let mut events = {
            let state = app.state::<RecorderState>();
            let recorder = state.recorder.lock().await;
            recorder.subscribe()
        };
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(e) = app.emit(RECORDING_EVENT, &event) {
                        tracing::warn!("Failed to emit recording event: {}", e);
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!("Dropped {} recording events", missed);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Initialize the application
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airboard=debug,tauri=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Airboard v{}", env!("CARGO_PKG_VERSION"));

    let result = tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(CameraState::default())
        .manage(RecorderState::default())
        .invoke_handler(tauri::generate_handler![
            // Camera commands
            commands::camera::get_camera_frame,
            commands::camera::get_cameras,
            // Drawing commands
            commands::drawing::get_draw_target,
            commands::drawing::set_draw_target,
            commands::drawing::pen_command,
            commands::drawing::get_pen_style,
            commands::drawing::open_whiteboard,
            commands::drawing::close_whiteboard,
            commands::drawing::get_whiteboard,
            commands::drawing::whiteboard_pointer_move,
            commands::drawing::whiteboard_pointer_up,
            commands::drawing::save_whiteboard,
            // Recording commands
            commands::recording::get_displays,
            commands::recording::get_audio_devices,
            commands::recording::start_recording,
            commands::recording::stop_recording,
            commands::recording::get_recording_status,
            // Settings commands
            commands::settings::get_settings,
            commands::settings::update_settings,
        ])
        .setup(|app| {
            let config_dir = app
                .path()
                .app_config_dir()
                .context("Failed to resolve the app config directory")?;
            let settings_state = SettingsState::load(config_dir);
            let settings = settings_state.get();

            app.manage(settings_state);
            app.manage(Arc::new(Mutex::new(DrawingBoard::new(
                settings.overlay.pen,
                settings.whiteboard.layout(),
            ))));

            // Without a camera there is nothing to draw on
            start_camera(app.handle(), &settings)?;
            forward_recording_events(app.handle());
            Ok(())
        })
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::Destroyed = event {
                match window.label() {
                    commands::drawing::WHITEBOARD_LABEL => {
                        window
                            .state::<Arc<Mutex<DrawingBoard>>>()
                            .lock()
                            .close_whiteboard();
                    }
                    "main" => window.state::<CameraState>().stop(),
                    _ => {}
                }
            }
        })
        .run(tauri::generate_context!());

    if let Err(e) = result {
        tracing::error!("Error while running Airboard: {}", e);
        std::process::exit(1);
    }
}
