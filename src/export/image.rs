//! PNG encoding for whiteboard saves and preview frames

use super::types::ExportError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn encode<W: Write>(writer: W, width: u32, height: u32, rgba: &[u8], fast: bool) -> Result<(), ExportError> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(ExportError::Encoding(format!(
            "Expected {} bytes for a {}x{} RGBA image, got {}",
            expected,
            width,
            height,
            rgba.len()
        )));
    }

    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    if fast {
        encoder.set_compression(png::Compression::Fast);
    }

    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgba)?;
    writer.finish()?;
    Ok(())
}

/// Write an RGBA buffer to a PNG file
pub fn write_png(path: &Path, width: u32, height: u32, rgba: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    encode(BufWriter::new(file), width, height, rgba, false)
}

/// Encode an RGBA buffer to PNG bytes, favouring speed over size
pub fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    encode(&mut bytes, width, height, rgba, true)?;
    Ok(bytes)
}
