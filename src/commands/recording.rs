//! Session recording commands

use super::settings::SettingsState;
use crate::capture::{
    get_audio_input_devices, get_displays as list_displays, AudioDeviceInfo, DisplayInfo,
    MicrophoneCaptureChannel, ScreenCaptureChannel,
};
use crate::recorder::{RecordingChannel, RecordingOutput, RecordingSession, RecordingStatus, SessionRecorder};
use crate::settings::RecordingSettings;
use std::sync::Arc;
use tauri::{AppHandle, State};
use tokio::sync::Mutex;

/// Event carrying [`crate::recorder::RecordingEvent`]s to every window
pub const RECORDING_EVENT: &str = "recording://event";

/// Application state for recording
pub struct RecorderState {
    pub recorder: Arc<Mutex<SessionRecorder>>,
}

impl Default for RecorderState {
    fn default() -> Self {
        Self {
            recorder: Arc::new(Mutex::new(SessionRecorder::new())),
        }
    }
}

/// Screen and microphone channels for one session
pub fn session_channels(settings: &RecordingSettings) -> Vec<Box<dyn RecordingChannel>> {
    vec![
        Box::new(ScreenCaptureChannel::new(
            settings.display_id,
            settings.video.clone(),
            settings.video_file_name.clone(),
        )),
        Box::new(MicrophoneCaptureChannel::new(
            settings.microphone_id.clone(),
            settings.audio,
            settings.audio_file_name.clone(),
        )),
    ]
}

/// Get list of available displays
#[tauri::command]
pub async fn get_displays() -> Result<Vec<DisplayInfo>, String> {
    Ok(list_displays())
}

/// Get list of available audio input devices (microphones)
#[tauri::command]
pub async fn get_audio_devices() -> Result<Vec<AudioDeviceInfo>, String> {
    Ok(get_audio_input_devices())
}

/// Start recording screen and microphone into a new session directory
#[tauri::command]
pub async fn start_recording(
    app: AppHandle,
    state: State<'_, RecorderState>,
    settings: State<'_, SettingsState>,
) -> Result<RecordingSession, String> {
    let output_dir = settings.output_dir(&app).map_err(|e| e.to_string())?;
    let recording = settings.get().recording;

    let mut recorder = state.recorder.lock().await;
    recorder
        .set_channels(session_channels(&recording))
        .map_err(|e| e.to_string())?;
    recorder.start(&output_dir).await.map_err(|e| e.to_string())
}

/// Stop recording and write the session's files
#[tauri::command]
pub async fn stop_recording(state: State<'_, RecorderState>) -> Result<RecordingOutput, String> {
    let mut recorder = state.recorder.lock().await;
    recorder.stop().await.map_err(|e| e.to_string())
}

/// Get current recording state and elapsed time
#[tauri::command]
pub async fn get_recording_status(state: State<'_, RecorderState>) -> Result<RecordingStatus, String> {
    let recorder = state.recorder.lock().await;
    Ok(recorder.status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::ChannelType;

    #[test]
    fn test_session_channels_follow_settings() {
        let mut settings = RecordingSettings::default();
        settings.display_id = Some(2);

        let channels = session_channels(&settings);
        let kinds: Vec<_> = channels.iter().map(|c| c.channel_type()).collect();
        assert_eq!(kinds, vec![ChannelType::Display, ChannelType::Microphone]);
        assert_eq!(channels[0].id(), "display-2");
    }
}
