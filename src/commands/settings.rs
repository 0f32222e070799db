//! Settings commands

use crate::drawing::DrawingBoard;
use crate::settings::{self, Settings};
use crate::utils::{AppError, AppResult};
use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;
use std::sync::Arc;
use tauri::{AppHandle, Manager, State};

/// Loaded settings and where they are saved
pub struct SettingsState {
    pub config_dir: PathBuf,
    pub settings: RwLock<Settings>,
}

impl SettingsState {
    /// Load settings from `config_dir`, falling back to defaults if the file
    /// cannot be read
    pub fn load(config_dir: PathBuf) -> Self {
        let settings = settings::load_settings(&config_dir).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable settings: {}", e);
            Settings::default()
        });
        Self {
            config_dir,
            settings: RwLock::new(settings),
        }
    }

    pub fn get(&self) -> Settings {
        self.settings.read().clone()
    }

    /// Validate, persist and adopt new settings
    pub fn update(&self, settings: Settings) -> AppResult<()> {
        settings::save_settings(&settings, &self.config_dir)?;
        *self.settings.write() = settings;
        Ok(())
    }

    /// Directory for session recordings and whiteboard images
    pub fn output_dir(&self, app: &AppHandle) -> AppResult<PathBuf> {
        if let Some(dir) = self.settings.read().recording.output_dir.as_ref() {
            return Ok(PathBuf::from(dir));
        }
        app.path()
            .video_dir()
            .or_else(|_| app.path().home_dir())
            .map(|dir| dir.join("Airboard"))
            .map_err(|e| AppError::Settings(settings::SettingsError::Invalid(format!(
                "No output directory available: {}",
                e
            ))))
    }
}

/// Get current settings
#[tauri::command]
pub async fn get_settings(state: State<'_, SettingsState>) -> Result<Settings, String> {
    Ok(state.get())
}

/// Replace settings and save them.
///
/// Whiteboard size and pen apply to the next whiteboard opened; camera and
/// gesture settings apply on the next launch.
#[tauri::command]
pub async fn update_settings(
    state: State<'_, SettingsState>,
    board: State<'_, Arc<Mutex<DrawingBoard>>>,
    settings: Settings,
) -> Result<(), String> {
    let layout = settings.whiteboard.layout();
    state.update(settings).map_err(|e| e.to_string())?;
    board.lock().set_layout(layout);

    tracing::info!("Settings updated");
    Ok(())
}
