//! Stroke recorder
//!
//! Turns a stream of pen samples into line segments, keeps the undo history
//! and the redo pool, and mirrors every change onto a [`StrokeSurface`].

use super::stroke::{clamp_width, Color, Point, StrokeSegment, StrokeStyle};
use super::surface::StrokeSurface;

/// Pen operations shared by every recorder regardless of its surface
pub trait PenControl {
    /// Extend the current stroke to `point`, or start a new one
    fn begin_or_continue(&mut self, point: Point);
    /// End the current stroke
    fn release(&mut self);
    fn undo(&mut self);
    fn redo(&mut self);
    fn clear(&mut self);
    fn set_color(&mut self, color: Color);
    fn set_width(&mut self, width: u32);
    /// Paint with the surface background colour
    fn use_eraser(&mut self);
    fn style(&self) -> StrokeStyle;
}

/// Records strokes onto a surface with undo/redo
#[derive(Debug)]
pub struct StrokeRecorder<S: StrokeSurface> {
    surface: S,
    history: Vec<StrokeSegment>,
    redo_pool: Vec<StrokeSegment>,
    style: StrokeStyle,
    last_point: Option<Point>,
    next_id: u64,
}

impl<S: StrokeSurface> StrokeRecorder<S> {
    pub fn new(surface: S, style: StrokeStyle) -> Self {
        Self {
            surface,
            history: Vec::new(),
            redo_pool: Vec::new(),
            style,
            last_point: None,
            next_id: 1,
        }
    }

    /// Segments currently drawn, oldest first
    pub fn history(&self) -> &[StrokeSegment] {
        &self.history
    }

    /// Undone segments, most recently undone last
    pub fn redo_pool(&self) -> &[StrokeSegment] {
        &self.redo_pool
    }

    /// Whether a stroke is in progress
    pub fn is_drawing(&self) -> bool {
        self.last_point.is_some()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Swap in a new surface and repaint the history onto it
    pub fn replace_surface(&mut self, surface: S) {
        self.surface = surface;
        for segment in &self.history {
            self.surface.draw_segment(segment);
        }
    }
}

impl<S: StrokeSurface> PenControl for StrokeRecorder<S> {
    fn begin_or_continue(&mut self, point: Point) {
        if let Some(from) = self.last_point {
            let segment = StrokeSegment {
                id: self.next_id,
                from,
                to: point,
                style: self.style,
            };
            self.next_id += 1;

            self.surface.draw_segment(&segment);
            self.history.push(segment);
            self.redo_pool.clear();
        }
        self.last_point = Some(point);
    }

    fn release(&mut self) {
        self.last_point = None;
    }

    fn undo(&mut self) {
        let Some(segment) = self.history.pop() else {
            return;
        };
        self.surface.erase_segment(&segment, &self.history);
        self.redo_pool.push(segment);
    }

    fn redo(&mut self) {
        let Some(segment) = self.redo_pool.pop() else {
            return;
        };
        self.surface.draw_segment(&segment);
        self.history.push(segment);
    }

    fn clear(&mut self) {
        self.history.clear();
        self.redo_pool.clear();
        self.surface.clear();
    }

    fn set_color(&mut self, color: Color) {
        self.style.color = color;
    }

    fn set_width(&mut self, width: u32) {
        self.style.width = clamp_width(width);
    }

    fn use_eraser(&mut self) {
        self.style.color = self.surface.background();
    }

    fn style(&self) -> StrokeStyle {
        self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::surface::{CanvasOp, VectorCanvas};

    fn recorder() -> StrokeRecorder<VectorCanvas> {
        StrokeRecorder::new(
            VectorCanvas::new(Color::WHITE),
            StrokeStyle::new(Color::BLACK, 5),
        )
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn endpoints(segments: &[StrokeSegment]) -> Vec<(Point, Point)> {
        segments.iter().map(|s| (s.from, s.to)).collect()
    }

    #[test]
    fn test_n_samples_make_n_minus_one_segments() {
        for n in 1..8 {
            let mut rec = recorder();
            for i in 0..n {
                rec.begin_or_continue(p(i as f64, i as f64 * 2.0));
            }
            assert_eq!(rec.history().len(), n - 1);
        }
    }

    #[test]
    fn test_first_sample_emits_nothing() {
        let mut rec = recorder();
        rec.begin_or_continue(p(4.0, 4.0));
        assert!(rec.history().is_empty());
        assert!(rec.is_drawing());
        assert!(!rec.surface().has_pending());
    }

    #[test]
    fn test_release_starts_a_fresh_stroke() {
        let mut rec = recorder();
        rec.begin_or_continue(p(0.0, 0.0));
        rec.begin_or_continue(p(1.0, 0.0));
        rec.release();
        assert!(!rec.is_drawing());

        rec.begin_or_continue(p(10.0, 10.0));
        rec.begin_or_continue(p(11.0, 10.0));

        assert_eq!(
            endpoints(rec.history()),
            vec![(p(0.0, 0.0), p(1.0, 0.0)), (p(10.0, 10.0), p(11.0, 10.0))]
        );
    }

    #[test]
    fn test_undo_then_redo_restores_history() {
        let mut rec = recorder();
        for i in 0..5 {
            rec.begin_or_continue(p(i as f64, 0.0));
        }
        let before = rec.history().to_vec();

        rec.undo();
        assert_eq!(rec.history().len(), 3);
        assert_eq!(rec.redo_pool().len(), 1);

        rec.redo();
        assert_eq!(rec.history(), before.as_slice());
        assert!(rec.redo_pool().is_empty());
    }

    #[test]
    fn test_undo_and_redo_on_empty_stacks_are_noops() {
        let mut rec = recorder();
        rec.undo();
        rec.redo();
        assert!(rec.history().is_empty());
        assert!(rec.redo_pool().is_empty());
        assert!(!rec.surface().has_pending());
    }

    #[test]
    fn test_drawing_after_undo_discards_redo_pool() {
        let mut rec = recorder();
        rec.begin_or_continue(p(0.0, 0.0));
        rec.begin_or_continue(p(1.0, 1.0));
        rec.begin_or_continue(p(2.0, 2.0));
        assert_eq!(
            endpoints(rec.history()),
            vec![(p(0.0, 0.0), p(1.0, 1.0)), (p(1.0, 1.0), p(2.0, 2.0))]
        );

        rec.undo();
        assert_eq!(rec.history().len(), 1);
        assert_eq!(rec.redo_pool().len(), 1);

        rec.begin_or_continue(p(3.0, 3.0));
        assert_eq!(
            endpoints(rec.history()),
            vec![(p(0.0, 0.0), p(1.0, 1.0)), (p(1.0, 1.0), p(3.0, 3.0))]
        );
        assert!(rec.redo_pool().is_empty());

        rec.redo();
        assert_eq!(rec.history().len(), 2);
    }

    #[test]
    fn test_clear_empties_both_stacks() {
        let mut rec = recorder();
        for i in 0..4 {
            rec.begin_or_continue(p(i as f64, 0.0));
        }
        rec.undo();
        rec.clear();

        assert!(rec.history().is_empty());
        assert!(rec.redo_pool().is_empty());
        assert_eq!(rec.surface_mut().drain_ops(), vec![CanvasOp::Clear]);
    }

    #[test]
    fn test_style_changes_only_affect_later_segments() {
        let mut rec = recorder();
        rec.begin_or_continue(p(0.0, 0.0));
        rec.begin_or_continue(p(1.0, 0.0));
        rec.set_color(Color::RED);
        rec.set_width(12);
        rec.begin_or_continue(p(2.0, 0.0));

        assert_eq!(rec.history()[0].style, StrokeStyle::new(Color::BLACK, 5));
        assert_eq!(rec.history()[1].style, StrokeStyle::new(Color::RED, 12));
    }

    #[test]
    fn test_redo_uses_the_stored_style() {
        let mut rec = recorder();
        rec.begin_or_continue(p(0.0, 0.0));
        rec.begin_or_continue(p(1.0, 0.0));
        rec.undo();
        rec.set_color(Color::BLUE);
        rec.set_width(40);
        rec.surface_mut().drain_ops();

        rec.redo();

        let ops = rec.surface_mut().drain_ops();
        match &ops[..] {
            [CanvasOp::Draw { segment }] => {
                assert_eq!(segment.style, StrokeStyle::new(Color::BLACK, 5));
            }
            other => panic!("unexpected ops: {:?}", other),
        }
    }

    #[test]
    fn test_identical_points_make_zero_length_segment() {
        let mut rec = recorder();
        rec.begin_or_continue(p(5.0, 5.0));
        rec.begin_or_continue(p(5.0, 5.0));
        assert_eq!(endpoints(rec.history()), vec![(p(5.0, 5.0), p(5.0, 5.0))]);
    }

    #[test]
    fn test_eraser_uses_surface_background() {
        let mut rec = recorder();
        rec.set_color(Color::RED);
        rec.use_eraser();
        assert_eq!(rec.style().color, Color::WHITE);
    }

    #[test]
    fn test_segment_ids_are_unique() {
        let mut rec = recorder();
        for i in 0..4 {
            rec.begin_or_continue(p(i as f64, 0.0));
        }
        rec.undo();
        rec.begin_or_continue(p(9.0, 0.0));

        let mut ids: Vec<u64> = rec.history().iter().map(|s| s.id).collect();
        ids.dedup();
        assert_eq!(ids, vec![1, 2, 4]);
    }
}
