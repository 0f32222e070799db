//! Whiteboard canvas
//!
//! A white vector canvas with its own pen and history. The frontend renders
//! the queued [`CanvasOp`]s; saving rasterizes the history to a PNG.

use super::raster::RasterCanvas;
use super::recorder::{PenControl, StrokeRecorder};
use super::stroke::{Color, StrokeSegment, StrokeStyle};
use super::surface::{CanvasOp, VectorCanvas};
use crate::export::{self, ExportError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full whiteboard contents, used when the window (re)loads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteboardSnapshot {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub pen: StrokeStyle,
    pub segments: Vec<StrokeSegment>,
}

/// A whiteboard window's drawing state
#[derive(Debug)]
pub struct Whiteboard {
    width: u32,
    height: u32,
    recorder: StrokeRecorder<VectorCanvas>,
}

impl Whiteboard {
    pub fn new(width: u32, height: u32, pen: StrokeStyle) -> Self {
        Self {
            width,
            height,
            recorder: StrokeRecorder::new(VectorCanvas::new(Color::WHITE), pen),
        }
    }

    pub fn recorder(&self) -> &StrokeRecorder<VectorCanvas> {
        &self.recorder
    }

    pub fn recorder_mut(&mut self) -> &mut StrokeRecorder<VectorCanvas> {
        &mut self.recorder
    }

    /// Operations the frontend has not seen yet
    pub fn drain_ops(&mut self) -> Vec<CanvasOp> {
        self.recorder.surface_mut().drain_ops()
    }

    pub fn snapshot(&self) -> WhiteboardSnapshot {
        WhiteboardSnapshot {
            width: self.width,
            height: self.height,
            background: Color::WHITE,
            pen: self.recorder.style(),
            segments: self.recorder.history().to_vec(),
        }
    }

    /// Rasterize the current drawing onto a white background
    pub fn rasterize(&self) -> RasterCanvas {
        let mut canvas = RasterCanvas::new(self.width, self.height, Color::WHITE);
        for segment in self.recorder.history() {
            canvas.draw_line(segment.from, segment.to, segment.style);
        }
        canvas
    }

    /// Save the drawing as a PNG image
    pub fn save_png(&self, path: &Path) -> Result<(), ExportError> {
        let canvas = self.rasterize();
        export::write_png(path, canvas.width(), canvas.height(), canvas.pixels())?;
        tracing::info!(
            "Saved whiteboard ({} segments) to {:?}",
            self.recorder.history().len(),
            path
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::stroke::Point;
    use tempfile::tempdir;

    fn board() -> Whiteboard {
        Whiteboard::new(40, 30, StrokeStyle::new(Color::BLACK, 5))
    }

    #[test]
    fn test_rasterize_draws_history_only() {
        let mut wb = board();
        let pen = wb.recorder_mut();
        pen.begin_or_continue(Point::new(5.0, 5.0));
        pen.begin_or_continue(Point::new(30.0, 5.0));
        pen.release();
        pen.begin_or_continue(Point::new(5.0, 25.0));
        pen.begin_or_continue(Point::new(30.0, 25.0));
        pen.undo();

        let canvas = wb.rasterize();
        assert_eq!(canvas.pixel(15, 5), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(15, 25), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_snapshot_reports_pen_and_segments() {
        let mut wb = board();
        wb.recorder_mut().set_color(Color::RED);
        wb.recorder_mut().begin_or_continue(Point::new(1.0, 1.0));
        wb.recorder_mut().begin_or_continue(Point::new(2.0, 2.0));

        let snapshot = wb.snapshot();
        assert_eq!(snapshot.width, 40);
        assert_eq!(snapshot.pen.color, Color::RED);
        assert_eq!(snapshot.segments.len(), 1);
    }

    #[test]
    fn test_save_png_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("drawing.png");

        let mut wb = board();
        wb.recorder_mut().begin_or_continue(Point::new(1.0, 1.0));
        wb.recorder_mut().begin_or_continue(Point::new(20.0, 20.0));
        wb.save_png(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }
}
