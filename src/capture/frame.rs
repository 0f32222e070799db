//! Captured media units

use image::{imageops, RgbaImage};

/// An RGBA video frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    image: RgbaImage,
}

impl VideoFrame {
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Wrap row-major RGBA bytes. `None` unless `data` holds exactly
    /// `width * height` pixels.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, data).map(Self::from_image)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Raw RGBA bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Flip left-to-right in place
    pub fn mirror(&mut self) {
        imageops::flip_horizontal_in_place(&mut self.image);
    }
}

/// A fixed-size block of interleaved 16-bit audio samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    pub samples: Vec<i16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_rejects_short_buffers() {
        assert!(VideoFrame::from_raw(4, 4, vec![0; 10]).is_none());
        let frame = VideoFrame::from_raw(2, 1, vec![0; 8]).unwrap();
        assert_eq!((frame.width(), frame.height()), (2, 1));
    }

    #[test]
    fn test_mirror_flips_each_row() {
        let mut frame = VideoFrame::from_raw(
            3,
            2,
            vec![
                1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, //
                4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6,
            ],
        )
        .unwrap();
        frame.mirror();
        assert_eq!(
            frame.as_bytes(),
            &[
                3, 3, 3, 3, 2, 2, 2, 2, 1, 1, 1, 1, //
                6, 6, 6, 6, 5, 5, 5, 5, 4, 4, 4, 4,
            ]
        );
    }
}
