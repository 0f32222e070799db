//! Microphone capture using cpal
//!
//! The cpal callback forwards samples over a channel; the capture worker
//! assembles them into fixed-size chunks and buffers them until the session
//! stops, when they are written out as WAV.

use super::frame::AudioChunk;
use super::traits::{AudioDeviceInfo, CaptureSource};
use super::worker::CaptureWorker;
use crate::export::{self, AudioOutput};
use crate::recorder::channel::{ChannelType, RecordingChannel, RecordingError, RecordingResult};
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, StreamConfig};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on a single wait for audio data
const ACQUIRE_TIMEOUT: Duration = Duration::from_millis(100);

/// Get list of available audio input devices (microphones)
pub fn get_audio_input_devices() -> Vec<AudioDeviceInfo> {
    let host = cpal::default_host();
    let default_name = host
        .default_input_device()
        .and_then(|d| d.name().ok())
        .unwrap_or_default();

    match host.input_devices() {
        Ok(devices) => devices
            .filter_map(|device| {
                let name = device.name().ok()?;
                Some(AudioDeviceInfo {
                    id: name.clone(),
                    is_default: name == default_name,
                    name,
                })
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate audio input devices: {}", e);
            Vec::new()
        }
    }
}

fn find_input_device(device_id: Option<&str>) -> RecordingResult<Device> {
    let host = cpal::default_host();
    match device_id {
        Some(id) => host
            .input_devices()
            .map_err(|e| RecordingError::DeviceNotFound(format!("Failed to enumerate audio inputs: {}", e)))?
            .find(|d| d.name().map(|n| n == id).unwrap_or(false))
            .ok_or_else(|| RecordingError::DeviceNotFound(format!("Audio input '{}' not found", id))),
        None => host
            .default_input_device()
            .ok_or_else(|| RecordingError::DeviceNotFound("No default audio input device".to_string())),
    }
}

/// Convert a float sample in -1.0..=1.0 to 16-bit PCM
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

/// Splits a stream of interleaved samples into fixed-size chunks
#[derive(Debug)]
pub struct ChunkAssembler {
    chunk_samples: usize,
    pending: Vec<i16>,
}

impl ChunkAssembler {
    pub fn new(chunk_samples: usize) -> Self {
        Self {
            chunk_samples: chunk_samples.max(1),
            pending: Vec::new(),
        }
    }

    pub fn push(&mut self, samples: &[i16]) {
        self.pending.extend_from_slice(samples);
    }

    /// Take the next complete chunk, if one is buffered
    pub fn next_chunk(&mut self) -> Option<AudioChunk> {
        if self.pending.len() < self.chunk_samples {
            return None;
        }
        let samples: Vec<i16> = self.pending.drain(..self.chunk_samples).collect();
        Some(AudioChunk { samples })
    }
}

/// Default microphone as a capture source
pub struct MicrophoneSource {
    // Dropping the stream stops the device callback
    _stream: cpal::Stream,
    samples: Receiver<Vec<i16>>,
    assembler: ChunkAssembler,
}

impl MicrophoneSource {
    pub fn open(device_id: Option<&str>, output: AudioOutput) -> RecordingResult<Self> {
        let device = find_input_device(device_id)?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let sample_format = device
            .default_input_config()
            .map_err(|e| RecordingError::ConfigurationError(format!("Failed to get audio config: {}", e)))?
            .sample_format();

        let config = StreamConfig {
            channels: output.channels,
            sample_rate: cpal::SampleRate(output.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(output.chunk_frames),
        };

        let (tx, rx) = mpsc::channel();
        let stream = build_stream(&device, &config, sample_format, tx.clone()).or_else(|e| {
            // Not every backend honours a fixed buffer size
            tracing::debug!("Retrying audio stream with default buffer size: {}", e);
            let config = StreamConfig {
                buffer_size: cpal::BufferSize::Default,
                ..config.clone()
            };
            build_stream(&device, &config, sample_format, tx)
        })?;

        stream
            .play()
            .map_err(|e| RecordingError::CaptureError(format!("Failed to start audio stream: {}", e)))?;

        tracing::info!(
            "Microphone '{}' opened ({}Hz, {}ch, {:?}, {} frames per chunk)",
            device_name,
            output.sample_rate,
            output.channels,
            sample_format,
            output.chunk_frames
        );

        Ok(Self {
            _stream: stream,
            samples: rx,
            assembler: ChunkAssembler::new(output.chunk_samples()),
        })
    }
}

fn build_stream(
    device: &Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
    tx: Sender<Vec<i16>>,
) -> RecordingResult<cpal::Stream> {
    let err_fn = |err| tracing::error!("Audio stream error: {}", err);

    let stream = match sample_format {
        SampleFormat::I16 => device.build_input_stream(
            config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let _ = tx.send(data.to_vec());
            },
            err_fn,
            None,
        ),
        SampleFormat::F32 => device.build_input_stream(
            config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let _ = tx.send(data.iter().map(|&s| f32_to_i16(s)).collect());
            },
            err_fn,
            None,
        ),
        SampleFormat::U16 => device.build_input_stream(
            config,
            move |data: &[u16], _: &cpal::InputCallbackInfo| {
                let _ = tx.send(data.iter().map(|&s| (s as i32 - 32_768) as i16).collect());
            },
            err_fn,
            None,
        ),
        other => {
            return Err(RecordingError::ConfigurationError(format!(
                "Unsupported sample format: {:?}",
                other
            )))
        }
    };

    stream.map_err(|e| RecordingError::ConfigurationError(format!("Failed to build audio stream: {}", e)))
}

impl CaptureSource for MicrophoneSource {
    type Unit = AudioChunk;

    fn acquire(&mut self) -> RecordingResult<Option<AudioChunk>> {
        loop {
            if let Some(chunk) = self.assembler.next_chunk() {
                return Ok(Some(chunk));
            }
            match self.samples.recv_timeout(ACQUIRE_TIMEOUT) {
                Ok(samples) => self.assembler.push(&samples),
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(RecordingError::CaptureError("Audio stream closed".to_string()))
                }
            }
        }
    }
}

/// Microphone recording channel
pub struct MicrophoneCaptureChannel {
    id: String,
    device_id: Option<String>,
    output: AudioOutput,
    file_name: String,
    output_dir: Option<PathBuf>,
    output_files: Arc<Mutex<Vec<String>>>,
    worker: CaptureWorker<AudioChunk>,
}

impl MicrophoneCaptureChannel {
    pub fn new(device_id: Option<String>, output: AudioOutput, file_name: impl Into<String>) -> Self {
        Self {
            id: "microphone".to_string(),
            device_id,
            output,
            file_name: file_name.into(),
            output_dir: None,
            output_files: Arc::new(Mutex::new(Vec::new())),
            worker: CaptureWorker::new("microphone"),
        }
    }
}

#[async_trait]
impl RecordingChannel for MicrophoneCaptureChannel {
    fn id(&self) -> &str {
        &self.id
    }

    fn channel_type(&self) -> ChannelType {
        ChannelType::Microphone
    }

    async fn initialize(&mut self, output_dir: &Path) -> RecordingResult<()> {
        // Fail early rather than when the worker opens the stream
        find_input_device(self.device_id.as_deref())?;

        self.output_dir = Some(output_dir.to_path_buf());
        self.output_files.lock().clear();

        tracing::info!("Microphone channel initialized");
        Ok(())
    }

    async fn start(&mut self) -> RecordingResult<()> {
        if self.output_dir.is_none() {
            return Err(RecordingError::ConfigurationError("Output directory not set".to_string()));
        }

        let device_id = self.device_id.clone();
        let output = self.output;
        self.worker
            .start(move || MicrophoneSource::open(device_id.as_deref(), output))
    }

    async fn stop(&mut self) -> RecordingResult<()> {
        let chunks = self.worker.stop()?;

        let output_dir = self
            .output_dir
            .clone()
            .ok_or_else(|| RecordingError::ConfigurationError("Output directory not set".to_string()))?;
        let path = output_dir.join(&self.file_name);
        let output = self.output;

        let written = tokio::task::spawn_blocking(move || export::write_wav(&path, &output, &chunks))
            .await
            .map_err(|e| RecordingError::CaptureError(format!("WAV writer task failed: {}", e)))??;

        self.output_files.lock().push(written.path);
        Ok(())
    }

    fn abort(&mut self) -> RecordingResult<()> {
        let chunks = self.worker.stop()?;
        tracing::info!("Discarded {} audio chunks", chunks.len());
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.worker.is_recording()
    }

    fn output_files(&self) -> Vec<String> {
        self.output_files.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_assembler_emits_fixed_chunks() {
        let mut assembler = ChunkAssembler::new(4);
        assembler.push(&[1, 2, 3]);
        assert!(assembler.next_chunk().is_none());

        assembler.push(&[4, 5, 6, 7, 8, 9]);
        assert_eq!(assembler.next_chunk().unwrap().samples, vec![1, 2, 3, 4]);
        assert_eq!(assembler.next_chunk().unwrap().samples, vec![5, 6, 7, 8]);
        assert!(assembler.next_chunk().is_none());
    }

    #[test]
    fn test_f32_to_i16_clamps() {
        assert_eq!(f32_to_i16(0.0), 0);
        assert_eq!(f32_to_i16(1.0), i16::MAX);
        assert_eq!(f32_to_i16(2.0), i16::MAX);
        assert_eq!(f32_to_i16(-1.0), -i16::MAX);
        assert_eq!(f32_to_i16(0.5), 16384);
    }

    #[test]
    fn test_channel_defaults() {
        let channel = MicrophoneCaptureChannel::new(None, AudioOutput::default(), "recording.wav");
        assert_eq!(channel.id(), "microphone");
        assert_eq!(channel.channel_type(), ChannelType::Microphone);
        assert!(channel.output_files().is_empty());
    }
}
