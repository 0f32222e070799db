//! User settings
//!
//! - schema: settings types and defaults
//! - store: settings.json read/write

pub mod schema;
pub mod store;

pub use schema::{
    CameraSettings, GestureSettings, OverlaySettings, RecordingSettings, Settings,
    WhiteboardSettings,
};
pub use store::{load_settings, save_settings, SettingsError, SETTINGS_FILE};
