//! In-memory RGBA raster canvas
//!
//! Used for the camera overlay (blended over every webcam frame) and for
//! rasterizing the whiteboard when it is saved.

use super::stroke::{Color, Point, StrokeSegment, StrokeStyle};
use super::surface::StrokeSurface;

const BYTES_PER_PIXEL: usize = 4;

/// A fixed-size RGBA pixel buffer
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    width: u32,
    height: u32,
    background: Color,
    pixels: Vec<u8>,
}

impl RasterCanvas {
    /// Create a canvas filled with `background`
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        let mut canvas = Self {
            width,
            height,
            background,
            pixels: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
        };
        canvas.fill(background);
        canvas
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA value at (x, y), if inside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        Some(rgba)
    }

    /// Overwrite every pixel with `color`
    pub fn fill(&mut self, color: Color) {
        let rgba = color.to_rgba();
        for pixel in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&rgba);
        }
    }

    /// Draw a thick line with round caps
    pub fn draw_line(&mut self, from: Point, to: Point, style: StrokeStyle) {
        paint_segment(&mut self.pixels, self.width, self.height, from, to, style);
    }

    /// Blend this canvas over an RGBA frame with equal weights.
    ///
    /// Each colour channel becomes `frame * 0.5 + canvas * 0.5`; alpha is
    /// forced opaque. Frames of a different size are left untouched and
    /// `false` is returned.
    pub fn blend_into(&self, frame: &mut [u8], width: u32, height: u32) -> bool {
        if width != self.width || height != self.height || frame.len() != self.pixels.len() {
            return false;
        }

        for (dst, src) in frame
            .chunks_exact_mut(BYTES_PER_PIXEL)
            .zip(self.pixels.chunks_exact(BYTES_PER_PIXEL))
        {
            for channel in 0..3 {
                dst[channel] = ((dst[channel] as u16 + src[channel] as u16 + 1) / 2) as u8;
            }
            dst[3] = 255;
        }
        true
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }
}

impl StrokeSurface for RasterCanvas {
    fn background(&self) -> Color {
        self.background
    }

    fn draw_segment(&mut self, segment: &StrokeSegment) {
        self.draw_line(segment.from, segment.to, segment.style);
    }

    fn erase_segment(&mut self, _segment: &StrokeSegment, remaining: &[StrokeSegment]) {
        // Pixels do not remember which stroke covered them; repaint the rest
        self.fill(self.background);
        for segment in remaining {
            self.draw_segment(segment);
        }
    }

    fn clear(&mut self) {
        self.fill(self.background);
    }
}

/// Paint a thick round-capped segment into an RGBA buffer.
///
/// Every pixel whose centre lies within `width / 2` of the segment is
/// painted, so a zero-length segment renders as a dot.
pub fn paint_segment(
    pixels: &mut [u8],
    width: u32,
    height: u32,
    from: Point,
    to: Point,
    style: StrokeStyle,
) {
    if width == 0 || height == 0 || pixels.len() < width as usize * height as usize * BYTES_PER_PIXEL {
        return;
    }

    let radius = style.width as f64 / 2.0;
    let rgba = style.color.to_rgba();

    let min_x = (from.x.min(to.x) - radius).floor() as i64;
    let max_x = (from.x.max(to.x) + radius).ceil() as i64;
    let min_y = (from.y.min(to.y) - radius).floor() as i64;
    let max_y = (from.y.max(to.y) + radius).ceil() as i64;

    let max_col = width as i64 - 1;
    let max_row = height as i64 - 1;
    if max_x < 0 || max_y < 0 || min_x > max_col || min_y > max_row {
        return;
    }

    for y in min_y.max(0)..=max_y.min(max_row) {
        for x in min_x.max(0)..=max_x.min(max_col) {
            let centre = Point::new(x as f64, y as f64);
            if distance_to_segment(centre, from, to) <= radius {
                let offset = (y as usize * width as usize + x as usize) * BYTES_PER_PIXEL;
                pixels[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgba);
            }
        }
    }
}

/// Shortest distance from `p` to the segment `a`-`b`
fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return p.distance_to(a);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    p.distance_to(Point::new(a.x + t * dx, a.y + t * dy))
}
