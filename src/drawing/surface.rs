//! Rendering targets for strokes
//!
//! A [`StrokeSurface`] is where a recorder's segments become visible. The
//! camera overlay paints pixels ([`RasterCanvas`](super::raster::RasterCanvas)),
//! the whiteboard keeps vector operations for the frontend ([`VectorCanvas`]).

use super::stroke::{Color, StrokeSegment};
use serde::{Deserialize, Serialize};

/// Something segments can be drawn onto and removed from
pub trait StrokeSurface {
    /// Colour the surface shows where nothing is drawn
    fn background(&self) -> Color;

    /// Render one segment on top of everything drawn so far
    fn draw_segment(&mut self, segment: &StrokeSegment);

    /// Remove a segment's rendering. `remaining` is the history left after
    /// the removal, in drawing order.
    fn erase_segment(&mut self, segment: &StrokeSegment, remaining: &[StrokeSegment]);

    /// Remove every rendering
    fn clear(&mut self);
}

/// A vector drawing operation for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum CanvasOp {
    /// Draw a new line
    Draw { segment: StrokeSegment },
    /// Delete the line with this id
    Erase { id: u64 },
    /// Delete every line
    Clear,
}

/// Vector canvas that queues operations until the frontend collects them
#[derive(Debug)]
pub struct VectorCanvas {
    background: Color,
    pending: Vec<CanvasOp>,
}

impl VectorCanvas {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            pending: Vec::new(),
        }
    }

    /// Take every operation queued since the last call
    pub fn drain_ops(&mut self) -> Vec<CanvasOp> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl StrokeSurface for VectorCanvas {
    fn background(&self) -> Color {
        self.background
    }

    fn draw_segment(&mut self, segment: &StrokeSegment) {
        self.pending.push(CanvasOp::Draw { segment: *segment });
    }

    fn erase_segment(&mut self, segment: &StrokeSegment, _remaining: &[StrokeSegment]) {
        self.pending.push(CanvasOp::Erase { id: segment.id });
    }

    fn clear(&mut self) {
        // Anything still queued is superseded by the clear
        self.pending.clear();
        self.pending.push(CanvasOp::Clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::stroke::{Point, StrokeStyle};

    fn segment(id: u64) -> StrokeSegment {
        StrokeSegment {
            id,
            from: Point::new(0.0, 0.0),
            to: Point::new(1.0, 1.0),
            style: StrokeStyle::new(Color::BLACK, 5),
        }
    }

    #[test]
    fn test_vector_canvas_queues_ops_in_order() {
        let mut canvas = VectorCanvas::new(Color::WHITE);
        canvas.draw_segment(&segment(1));
        canvas.draw_segment(&segment(2));
        canvas.erase_segment(&segment(2), &[segment(1)]);

        let ops = canvas.drain_ops();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[2], CanvasOp::Erase { id: 2 });
        assert!(!canvas.has_pending());
    }

    #[test]
    fn test_vector_canvas_clear_supersedes_pending() {
        let mut canvas = VectorCanvas::new(Color::WHITE);
        canvas.draw_segment(&segment(1));
        canvas.clear();

        assert_eq!(canvas.drain_ops(), vec![CanvasOp::Clear]);
    }

    #[test]
    fn test_canvas_op_json_shape() {
        let json = serde_json::to_value(CanvasOp::Erase { id: 7 }).unwrap();
        assert_eq!(json, serde_json::json!({ "op": "erase", "id": 7 }));
    }
}
