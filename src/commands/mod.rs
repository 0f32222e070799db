//! Tauri command handlers
//!
//! IPC commands called from the frontend windows via Tauri's invoke system.

pub mod camera;
pub mod drawing;
pub mod recording;
pub mod settings;
