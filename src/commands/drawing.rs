//! Drawing commands: target selection, pen, whiteboard window

use super::settings::SettingsState;
use crate::drawing::{CanvasOp, DrawTarget, DrawingBoard, PenCommand, Point, StrokeStyle, WhiteboardSnapshot};
use crate::utils::AppError;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tauri::{AppHandle, Emitter, Manager, State, WebviewUrl, WebviewWindowBuilder};

pub const WHITEBOARD_LABEL: &str = "whiteboard";

/// Event carrying queued [`CanvasOp`]s to the whiteboard window
pub const WHITEBOARD_OPS_EVENT: &str = "whiteboard://ops";

/// Send canvas operations to the whiteboard window
pub fn emit_whiteboard_ops(app: &AppHandle, ops: Vec<CanvasOp>) {
    if ops.is_empty() {
        return;
    }
    if let Err(e) = app.emit_to(WHITEBOARD_LABEL, WHITEBOARD_OPS_EVENT, ops) {
        tracing::warn!("Failed to send whiteboard ops: {}", e);
    }
}

fn flush_whiteboard(app: &AppHandle, board: &mut DrawingBoard) {
    emit_whiteboard_ops(app, board.drain_whiteboard_ops());
}

#[tauri::command]
pub async fn get_draw_target(board: State<'_, Arc<Mutex<DrawingBoard>>>) -> Result<DrawTarget, String> {
    Ok(board.lock().target())
}

#[tauri::command]
pub async fn set_draw_target(
    board: State<'_, Arc<Mutex<DrawingBoard>>>,
    target: DrawTarget,
) -> Result<(), String> {
    board.lock().set_target(target);
    Ok(())
}

/// Apply a pen command to the selected target.
///
/// Returns the pen style afterwards, or `None` if nothing is selected.
#[tauri::command]
pub async fn pen_command(
    app: AppHandle,
    board: State<'_, Arc<Mutex<DrawingBoard>>>,
    command: PenCommand,
) -> Result<Option<StrokeStyle>, String> {
    let mut board = board.lock();
    let style = board.pen_command(command);
    if style.is_none() {
        tracing::debug!("Ignoring {:?}, no drawing target", command);
    }
    flush_whiteboard(&app, &mut board);
    Ok(style)
}

#[tauri::command]
pub async fn get_pen_style(board: State<'_, Arc<Mutex<DrawingBoard>>>) -> Result<Option<StrokeStyle>, String> {
    Ok(board.lock().pen_style())
}

/// Open the whiteboard window, or focus it if it is already open
#[tauri::command]
pub async fn open_whiteboard(app: AppHandle, board: State<'_, Arc<Mutex<DrawingBoard>>>) -> Result<(), String> {
    let (created, snapshot) = {
        let mut board = board.lock();
        let created = board.open_whiteboard();
        (created, board.whiteboard_snapshot())
    };

    if let Some(window) = app.get_webview_window(WHITEBOARD_LABEL) {
        return window.set_focus().map_err(|e| e.to_string());
    }

    let (width, height) = snapshot
        .map(|s| (s.width, s.height))
        .ok_or_else(|| AppError::Window("Whiteboard missing after open".to_string()).to_string())?;

    let built = WebviewWindowBuilder::new(&app, WHITEBOARD_LABEL, WebviewUrl::App("whiteboard.html".into()))
        .title("Whiteboard")
        .inner_size(width as f64, height as f64)
        .resizable(false)
        .build();

    match built {
        Ok(_) => {
            tracing::info!("Whiteboard window opened (new board: {})", created);
            Ok(())
        }
        Err(e) => {
            // No window to draw in, so drop the board again
            board.lock().close_whiteboard();
            Err(AppError::Window(format!("Failed to open whiteboard: {}", e)).to_string())
        }
    }
}

/// Close the whiteboard window. Its drawing is discarded.
#[tauri::command]
pub async fn close_whiteboard(app: AppHandle, board: State<'_, Arc<Mutex<DrawingBoard>>>) -> Result<(), String> {
    board.lock().close_whiteboard();
    if let Some(window) = app.get_webview_window(WHITEBOARD_LABEL) {
        window.close().map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Full whiteboard contents, for (re)drawing the canvas from scratch
#[tauri::command]
pub async fn get_whiteboard(
    board: State<'_, Arc<Mutex<DrawingBoard>>>,
) -> Result<Option<WhiteboardSnapshot>, String> {
    let mut board = board.lock();
    // The snapshot already contains anything still queued
    board.drain_whiteboard_ops();
    Ok(board.whiteboard_snapshot())
}

/// Mouse drag on the whiteboard
#[tauri::command]
pub async fn whiteboard_pointer_move(
    app: AppHandle,
    board: State<'_, Arc<Mutex<DrawingBoard>>>,
    x: f64,
    y: f64,
) -> Result<(), String> {
    let mut board = board.lock();
    board.pointer_move(Point::new(x, y));
    flush_whiteboard(&app, &mut board);
    Ok(())
}

/// Mouse button released on the whiteboard
#[tauri::command]
pub async fn whiteboard_pointer_up(board: State<'_, Arc<Mutex<DrawingBoard>>>) -> Result<(), String> {
    board.lock().pointer_up();
    Ok(())
}

/// Save the whiteboard as PNG.
///
/// Without a path the image goes to the configured file name in the output
/// directory. Returns the written path.
#[tauri::command]
pub async fn save_whiteboard(
    app: AppHandle,
    board: State<'_, Arc<Mutex<DrawingBoard>>>,
    settings: State<'_, SettingsState>,
    path: Option<String>,
) -> Result<String, String> {
    let path = match path {
        Some(path) => PathBuf::from(path),
        None => {
            let file_name = settings.get().whiteboard.save_file_name;
            settings.output_dir(&app).map_err(|e| e.to_string())?.join(file_name)
        }
    };

    let board = board.lock();
    let whiteboard = board
        .whiteboard()
        .ok_or_else(|| AppError::Drawing("Whiteboard is not open".to_string()).to_string())?;
    whiteboard
        .save_png(&path)
        .map_err(|e| AppError::from(e).to_string())?;

    Ok(path.to_string_lossy().to_string())
}
