//! Error types and handling
//!
//! Common error types used across the application.

use crate::export::ExportError;
use crate::settings::SettingsError;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Drawing error: {0}")]
    Drawing(String),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Window error: {0}")]
    Window(String),
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let error = AppError::Drawing("no whiteboard open".to_string());
        assert_eq!(error.to_string(), "Drawing error: no whiteboard open");

        let error: AppError = SettingsError::Invalid("width must be positive".to_string()).into();
        assert!(error.to_string().starts_with("Settings error: "));
        assert!(error.to_string().contains("width must be positive"));
    }
}
