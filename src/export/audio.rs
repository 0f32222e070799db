//! Microphone recording writer
//!
//! Captured chunks are written as uncompressed 16-bit PCM WAV.

use super::types::{AudioOutput, ExportError, WrittenFile};
use crate::capture::AudioChunk;
use std::path::Path;

/// Write interleaved 16-bit chunks to a WAV file
pub fn write_wav(path: &Path, output: &AudioOutput, chunks: &[AudioChunk]) -> Result<WrittenFile, ExportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let spec = hound::WavSpec {
        channels: output.channels,
        sample_rate: output.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    let mut samples = 0u64;
    for chunk in chunks {
        for &sample in &chunk.samples {
            writer.write_sample(sample)?;
        }
        samples += chunk.samples.len() as u64;
    }
    writer.finalize()?;

    let frames = samples / output.channels.max(1) as u64;
    let duration_ms = if output.sample_rate > 0 {
        frames as f64 * 1000.0 / output.sample_rate as f64
    } else {
        0.0
    };

    tracing::info!(
        "Wrote {} audio chunks ({:.0}ms, {}Hz, {}ch) to {:?}",
        chunks.len(),
        duration_ms,
        output.sample_rate,
        output.channels,
        path
    );

    Ok(WrittenFile {
        path: path.to_string_lossy().to_string(),
        units: chunks.len() as u64,
        duration_ms,
    })
}
