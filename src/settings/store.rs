//! Settings persistence
//!
//! Settings live in `settings.json` inside the app config directory.

use super::schema::Settings;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Read settings from `config_dir`, or defaults when none were saved yet
pub fn load_settings(config_dir: &Path) -> Result<Settings, SettingsError> {
    let path = config_dir.join(SETTINGS_FILE);
    if !path.exists() {
        tracing::debug!("No settings at {:?}, using defaults", path);
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(&path)?;
    let settings: Settings = serde_json::from_str(&content)?;
    settings.validate().map_err(SettingsError::Invalid)?;

    tracing::debug!("Loaded settings from {:?}", path);
    Ok(settings)
}

/// Validate and write settings to `config_dir`
pub fn save_settings(settings: &Settings, config_dir: &Path) -> Result<(), SettingsError> {
    settings.validate().map_err(SettingsError::Invalid)?;

    fs::create_dir_all(config_dir)?;
    let content = serde_json::to_string_pretty(settings)?;
    fs::write(config_dir.join(SETTINGS_FILE), content)?;

    tracing::debug!("Saved settings to {:?}", config_dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(settings.gesture.pinch_threshold, 70.0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let config_dir = dir.path().join("nested");

        let mut settings = Settings::default();
        settings.camera.index = 2;
        settings.gesture.detector_command = vec!["python3".to_string(), "hands.py".to_string()];
        settings.recording.display_id = Some(7);
        save_settings(&settings, &config_dir).unwrap();

        let loaded = load_settings(&config_dir).unwrap();
        assert_eq!(loaded.camera.index, 2);
        assert_eq!(loaded.gesture.detector_command, settings.gesture.detector_command);
        assert_eq!(loaded.recording.display_id, Some(7));
    }

    #[test]
    fn test_invalid_settings_are_not_saved() {
        let dir = tempdir().unwrap();
        let mut settings = Settings::default();
        settings.gesture.tick_interval_ms = 0;

        assert!(matches!(save_settings(&settings, dir.path()), Err(SettingsError::Invalid(_))));
        assert!(!dir.path().join(SETTINGS_FILE).exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "{not json").unwrap();
        assert!(matches!(load_settings(dir.path()), Err(SettingsError::Json(_))));
    }
}
