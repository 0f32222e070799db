//! Per-frame camera pipeline
//!
//! mirror -> detect hands -> classify pinch -> route to the drawing board ->
//! blend the overlay -> encode the preview.

use crate::capture::VideoFrame;
use crate::drawing::{paint_segment, CanvasOp, Color, DrawingBoard, StrokeStyle};
use crate::export::{encode_png, ExportError};
use crate::gesture::{Hand, LandmarkSource, NoLandmarks, PinchClassifier, PinchReading, HAND_CONNECTIONS};
use parking_lot::Mutex;

const LANDMARK_DOT: StrokeStyle = StrokeStyle {
    color: Color::RED,
    width: 5,
};
const CONNECTION_LINE: StrokeStyle = StrokeStyle {
    color: Color::rgb(224, 224, 224),
    width: 2,
};

/// Output of one processed frame
#[derive(Debug)]
pub struct ProcessedFrame {
    pub width: u32,
    pub height: u32,
    /// Composited frame as PNG
    pub preview: Vec<u8>,
    pub reading: Option<PinchReading>,
}

pub struct FrameProcessor {
    classifier: PinchClassifier,
    landmarks: Box<dyn LandmarkSource>,
    detection_enabled: bool,
    mirror: bool,
    show_landmarks: bool,
}

impl FrameProcessor {
    pub fn new(
        classifier: PinchClassifier,
        landmarks: Box<dyn LandmarkSource>,
        mirror: bool,
        show_landmarks: bool,
    ) -> Self {
        Self {
            classifier,
            landmarks,
            detection_enabled: true,
            mirror,
            show_landmarks,
        }
    }

    /// Whether hands are still being detected
    pub fn detection_enabled(&self) -> bool {
        self.detection_enabled
    }

    fn detect(&mut self, frame: &VideoFrame) -> Vec<Hand> {
        if !self.detection_enabled {
            return Vec::new();
        }
        match self.landmarks.detect(frame) {
            Ok(hands) => hands,
            Err(e) => {
                tracing::error!(
                    "Landmark source '{}' failed, hand detection disabled: {}",
                    self.landmarks.name(),
                    e
                );
                self.detection_enabled = false;
                self.landmarks = Box::new(NoLandmarks);
                Vec::new()
            }
        }
    }

    /// Run one frame through the pipeline.
    ///
    /// The board is locked once, for routing, blending and draining, so
    /// commands never observe a half-applied frame. Queued whiteboard
    /// operations go to `on_ops` before the lock is released, keeping them
    /// ordered with the ones commands emit.
    pub fn process(
        &mut self,
        mut frame: VideoFrame,
        board: &Mutex<DrawingBoard>,
        on_ops: &dyn Fn(Vec<CanvasOp>),
    ) -> Result<ProcessedFrame, ExportError> {
        if self.mirror {
            frame.mirror();
        }

        let hands = self.detect(&frame);
        let reading = self.classifier.read_frame(&hands, frame.width(), frame.height());

        if self.show_landmarks {
            for hand in &hands {
                draw_hand(&mut frame, hand);
            }
        }

        {
            let mut board = board.lock();
            board.ensure_overlay(frame.width(), frame.height());
            board.apply_reading(reading);
            board.composite(&mut frame);
            let ops = board.drain_whiteboard_ops();
            if !ops.is_empty() {
                on_ops(ops);
            }
        }

        let preview = encode_png(frame.width(), frame.height(), frame.as_bytes())?;

        Ok(ProcessedFrame {
            width: frame.width(),
            height: frame.height(),
            preview,
            reading,
        })
    }
}

/// Draw a hand's skeleton and keypoints onto the frame
fn draw_hand(frame: &mut VideoFrame, hand: &Hand) {
    let (width, height) = (frame.width(), frame.height());
    let points: Vec<_> = hand
        .landmarks
        .iter()
        .map(|l| l.to_pixel(width, height))
        .collect();

    for (a, b) in HAND_CONNECTIONS {
        if let (Some(&from), Some(&to)) = (points.get(a.index()), points.get(b.index())) {
            paint_segment(frame.bytes_mut(), width, height, from, to, CONNECTION_LINE);
        }
    }
    for &point in &points {
        paint_segment(frame.bytes_mut(), width, height, point, point, LANDMARK_DOT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::{DrawTarget, PenCommand};
    use crate::gesture::{HandLandmark, LandmarkError, NormalizedLandmark};
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    /// Replays scripted detections, then reports no hands
    struct Scripted {
        replies: VecDeque<Result<Vec<Hand>, LandmarkError>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<Vec<Hand>, LandmarkError>>) -> Self {
            Self {
                replies: replies.into(),
            }
        }
    }

    impl LandmarkSource for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn detect(&mut self, _frame: &VideoFrame) -> Result<Vec<Hand>, LandmarkError> {
            self.replies.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    /// Hand with thumb and index tips at the given normalized positions
    fn hand(thumb: (f64, f64), index: (f64, f64)) -> Hand {
        let mut landmarks = vec![NormalizedLandmark { x: 0.5, y: 0.5, z: 0.0 }; HandLandmark::COUNT];
        landmarks[HandLandmark::ThumbTip.index()] = NormalizedLandmark { x: thumb.0, y: thumb.1, z: 0.0 };
        landmarks[HandLandmark::IndexFingerTip.index()] = NormalizedLandmark { x: index.0, y: index.1, z: 0.0 };
        Hand { landmarks }
    }

    fn pinch_at(x: f64, y: f64) -> Result<Vec<Hand>, LandmarkError> {
        Ok(vec![hand((x, y), (x + 0.01, y))])
    }

    fn gray_frame(width: u32, height: u32) -> VideoFrame {
        VideoFrame::from_raw(width, height, vec![128; (width * height * 4) as usize]).unwrap()
    }

    fn processor(source: Scripted) -> FrameProcessor {
        FrameProcessor::new(PinchClassifier::default(), Box::new(source), true, false)
    }

    #[test]
    fn test_pinch_frames_draw_on_camera_overlay() {
        let board = Mutex::new(DrawingBoard::default());
        board.lock().set_target(DrawTarget::Camera);
        let mut processor = processor(Scripted::new(vec![pinch_at(0.1, 0.1), pinch_at(0.5, 0.5), pinch_at(0.9, 0.1)]));

        for _ in 0..3 {
            let out = processor.process(gray_frame(100, 100), &board, &|_| {}).unwrap();
            assert!(out.reading.unwrap().active);
        }

        let board = board.lock();
        let history = board.overlay().unwrap().history();
        assert_eq!(history.len(), 2);
        // The cursor is the index tip
        assert_eq!((history[0].from.x, history[0].from.y), (11.0, 10.0));
    }

    #[test]
    fn test_preview_is_png_of_frame_size() {
        let board = Mutex::new(DrawingBoard::default());
        let mut processor = processor(Scripted::new(Vec::new()));

        let out = processor.process(gray_frame(8, 6), &board, &|_| {}).unwrap();
        assert_eq!((out.width, out.height), (8, 6));

        let decoder = png::Decoder::new(out.preview.as_slice());
        let reader = decoder.read_info().unwrap();
        assert_eq!((reader.info().width, reader.info().height), (8, 6));
    }

    #[test]
    fn test_overlay_is_blended_into_preview() {
        let board = Mutex::new(DrawingBoard::default());
        let mut processor = processor(Scripted::new(Vec::new()));

        let out = processor.process(gray_frame(2, 2), &board, &|_| {}).unwrap();
        let mut reader = png::Decoder::new(out.preview.as_slice()).read_info().unwrap();
        let mut pixels = vec![0; reader.output_buffer_size()];
        reader.next_frame(&mut pixels).unwrap();

        // Empty black overlay at half weight
        assert_eq!(&pixels[..4], &[64, 64, 64, 255]);
    }

    #[test]
    fn test_whiteboard_ops_are_drained_per_frame() {
        let board = Mutex::new(DrawingBoard::default());
        {
            let mut board = board.lock();
            board.open_whiteboard();
            board.set_target(DrawTarget::Whiteboard);
        }
        let mut processor = processor(Scripted::new(vec![pinch_at(0.1, 0.1), pinch_at(0.2, 0.2)]));
        let batches = Mutex::new(Vec::new());
        let sink = |ops: Vec<CanvasOp>| batches.lock().push(ops);

        processor.process(gray_frame(100, 100), &board, &sink).unwrap();
        assert!(batches.lock().is_empty());
        processor.process(gray_frame(100, 100), &board, &sink).unwrap();
        assert_eq!(batches.lock().len(), 1);
        assert_eq!(batches.lock()[0].len(), 1);
        assert!(!board.lock().whiteboard().unwrap().recorder().surface().has_pending());
    }

    #[test]
    fn test_undo_during_emit_is_ordered_after_draw() {
        let board = Arc::new(Mutex::new(DrawingBoard::default()));
        {
            let mut board = board.lock();
            board.open_whiteboard();
            board.set_target(DrawTarget::Whiteboard);
        }
        let mut processor = processor(Scripted::new(vec![pinch_at(0.1, 0.1), pinch_at(0.2, 0.2)]));
        processor.process(gray_frame(100, 100), &board, &|_| {}).unwrap();

        let emitted = Arc::new(Mutex::new(Vec::new()));
        let undo: Mutex<Option<JoinHandle<()>>> = Mutex::new(None);
        let sink = |ops: Vec<CanvasOp>| {
            // An undo command arrives while this batch is being emitted
            let board = board.clone();
            let emitted_by_undo = emitted.clone();
            *undo.lock() = Some(thread::spawn(move || {
                let mut board = board.lock();
                board.pen_command(PenCommand::Undo);
                emitted_by_undo.lock().extend(board.drain_whiteboard_ops());
            }));
            thread::sleep(Duration::from_millis(20));
            emitted.lock().extend(ops);
        };
        processor.process(gray_frame(100, 100), &board, &sink).unwrap();
        if let Some(handle) = undo.lock().take() {
            handle.join().unwrap();
        }

        let emitted = emitted.lock();
        assert_eq!(emitted.len(), 2);
        let CanvasOp::Draw { segment } = &emitted[0] else {
            panic!("expected draw first, got {:?}", emitted[0]);
        };
        assert_eq!(emitted[1], CanvasOp::Erase { id: segment.id });
        assert!(board.lock().whiteboard().unwrap().recorder().history().is_empty());
    }

    #[test]
    fn test_source_failure_disables_detection() {
        let board = Mutex::new(DrawingBoard::default());
        let mut processor = processor(Scripted::new(vec![
            Err(LandmarkError::Closed),
            pinch_at(0.1, 0.1),
        ]));

        let out = processor.process(gray_frame(10, 10), &board, &|_| {}).unwrap();
        assert!(out.reading.is_none());
        assert!(!processor.detection_enabled());

        // The feed keeps running without hands
        let out = processor.process(gray_frame(10, 10), &board, &|_| {}).unwrap();
        assert!(out.reading.is_none());
    }

    #[test]
    fn test_open_hand_releases_pen() {
        let board = Mutex::new(DrawingBoard::default());
        board.lock().set_target(DrawTarget::Camera);
        let mut processor = processor(Scripted::new(vec![
            pinch_at(0.1, 0.1),
            Ok(vec![hand((0.1, 0.1), (0.9, 0.9))]),
            pinch_at(0.5, 0.5),
        ]));

        for _ in 0..3 {
            processor.process(gray_frame(100, 100), &board, &|_| {}).unwrap();
        }
        assert!(board.lock().overlay().unwrap().history().is_empty());
    }

    #[test]
    fn test_mirror_flips_before_detection() {
        let board = Mutex::new(DrawingBoard::default());
        let mut processor = FrameProcessor::new(PinchClassifier::default(), Box::new(NoLandmarks), true, false);

        let mut frame = gray_frame(2, 1);
        frame.bytes_mut()[..4].copy_from_slice(&[200, 0, 0, 255]);
        let out = processor.process(frame, &board, &|_| {}).unwrap();

        let mut reader = png::Decoder::new(out.preview.as_slice()).read_info().unwrap();
        let mut pixels = vec![0; reader.output_buffer_size()];
        reader.next_frame(&mut pixels).unwrap();
        assert_eq!(&pixels[4..8], &[100, 0, 0, 255]);
    }

    #[test]
    fn test_landmarks_drawn_when_enabled() {
        let board = Mutex::new(DrawingBoard::default());
        let mut processor = FrameProcessor::new(
            PinchClassifier::default(),
            Box::new(Scripted::new(vec![pinch_at(0.5, 0.5)])),
            false,
            true,
        );

        let mut frame = VideoFrame::from_raw(20, 20, vec![0; 20 * 20 * 4]).unwrap();
        for pixel in frame.bytes_mut().chunks_exact_mut(4) {
            pixel[3] = 255;
        }
        let out = processor.process(frame, &board, &|_| {}).unwrap();

        let mut reader = png::Decoder::new(out.preview.as_slice()).read_info().unwrap();
        let mut pixels = vec![0; reader.output_buffer_size()];
        reader.next_frame(&mut pixels).unwrap();
        // Centre landmark dot is red, halved by the blend
        let centre = (10 * 20 + 10) * 4;
        assert_eq!(&pixels[centre..centre + 4], &[128, 0, 0, 255]);
    }
}
