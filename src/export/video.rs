//! Screen recording video writer
//!
//! Buffered RGBA frames are piped into FFmpeg, which encodes them into the
//! output container.

use super::types::{ExportError, VideoOutput, WrittenFile};
use crate::capture::VideoFrame;
use std::io::Write;
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Output, Stdio};

/// Check whether an `ffmpeg` binary can be executed
pub fn ffmpeg_available() -> bool {
    Command::new("ffmpeg").arg("-version").output().is_ok()
}

/// Build the FFmpeg argument list for a raw RGBA stdin input
pub fn encoder_args(width: u32, height: u32, output: &VideoOutput, path: &Path) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "rgba".to_string(),
        "-s".to_string(),
        format!("{}x{}", width, height),
        "-r".to_string(),
        output.fps.to_string(),
        "-i".to_string(),
        "-".to_string(),
        // 4:2:0 chroma needs even dimensions
        "-vf".to_string(),
        "pad=ceil(iw/2)*2:ceil(ih/2)*2".to_string(),
        "-c:v".to_string(),
        output.codec.clone(),
        "-q:v".to_string(),
        "3".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
    ];

    if let Some(ref fourcc) = output.fourcc {
        args.extend(["-vtag".to_string(), fourcc.clone()]);
    }

    args.push(path.to_string_lossy().to_string());
    args
}

/// Encode `frames` into a video file.
///
/// The first frame fixes the output size; frames of any other size are
/// skipped. Returns `None` when there is nothing to write.
pub fn write_video(
    path: &Path,
    output: &VideoOutput,
    frames: &[VideoFrame],
) -> Result<Option<WrittenFile>, ExportError> {
    let Some(first) = frames.first() else {
        tracing::warn!("No screen frames captured, skipping {:?}", path);
        return Ok(None);
    };
    let (width, height) = (first.width(), first.height());

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let args = encoder_args(width, height, output, path);
    tracing::info!("Starting FFmpeg encoder: {:?}", args);

    let mut encoder = EncoderProcess::spawn("ffmpeg", &args)?;
    let mut stdin = encoder.take_stdin()?;

    let mut written = 0u64;
    let mut skipped = 0u64;
    for frame in frames {
        if frame.width() != width || frame.height() != height {
            skipped += 1;
            continue;
        }
        // On error the encoder is dropped, which kills FFmpeg
        stdin
            .write_all(frame.as_bytes())
            .map_err(|e| ExportError::Encoding(format!("Failed to write frame {}: {}", written, e)))?;
        written += 1;
    }

    // EOF tells FFmpeg to finish the file
    drop(stdin);

    let result = encoder.finish()?;
    if !result.status.success() {
        return Err(ExportError::Ffmpeg(format!(
            "FFmpeg exited with {}: {}",
            result.status,
            String::from_utf8_lossy(&result.stderr).trim()
        )));
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} frames that did not match {}x{}", skipped, width, height);
    }

    let duration_ms = if output.fps > 0 {
        written as f64 * 1000.0 / output.fps as f64
    } else {
        0.0
    };

    tracing::info!(
        "Wrote {} frames ({}x{} @ {}fps) to {:?}",
        written,
        width,
        height,
        output.fps,
        path
    );

    Ok(Some(WrittenFile {
        path: path.to_string_lossy().to_string(),
        units: written,
        duration_ms,
    }))
}

/// A spawned encoder process, killed if dropped before [`finish`](Self::finish)
struct EncoderProcess {
    process: Option<Child>,
}

impl EncoderProcess {
    fn spawn(program: &str, args: &[String]) -> Result<Self, ExportError> {
        let process = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExportError::Ffmpeg(format!("Failed to start FFmpeg encoder: {}", e)))?;
        Ok(Self {
            process: Some(process),
        })
    }

    fn take_stdin(&mut self) -> Result<ChildStdin, ExportError> {
        self.process
            .as_mut()
            .and_then(|p| p.stdin.take())
            .ok_or_else(|| ExportError::Ffmpeg("Failed to capture FFmpeg stdin".to_string()))
    }

    /// Wait for the encoder to exit on its own
    fn finish(mut self) -> Result<Output, ExportError> {
        let process = self
            .process
            .take()
            .ok_or_else(|| ExportError::Ffmpeg("FFmpeg encoder already finished".to_string()))?;
        Ok(process.wait_with_output()?)
    }
}

impl Drop for EncoderProcess {
    fn drop(&mut self) {
        if let Some(mut process) = self.process.take() {
            let _ = process.kill();
            let _ = process.wait();
        }
    }
}
