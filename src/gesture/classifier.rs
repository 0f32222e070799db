//! Pinch classifier
//!
//! A hand is "pinching" while its thumb tip and index fingertip are closer
//! than a fixed threshold in frame pixels. The index fingertip is the cursor.

use super::landmarks::{Hand, HandLandmark};
use crate::drawing::Point;
use serde::{Deserialize, Serialize};

/// Default pinch distance in frame pixels
pub const DEFAULT_PINCH_THRESHOLD: f64 = 70.0;

/// Classifier output for one hand in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinchReading {
    /// Thumb/index distance is below the threshold
    pub active: bool,
    pub distance: f64,
    /// Index fingertip position in frame pixels
    pub cursor: Point,
}

/// Stateless pinch detector
#[derive(Debug, Clone, Copy)]
pub struct PinchClassifier {
    threshold: f64,
}

impl PinchClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Strict comparison: a distance equal to the threshold is not a pinch
    pub fn is_pinching(&self, distance: f64) -> bool {
        distance < self.threshold
    }

    /// Classify two fingertip positions given in the same pixel space
    pub fn classify(&self, thumb_tip: Point, index_tip: Point) -> PinchReading {
        let distance = thumb_tip.distance_to(index_tip);
        PinchReading {
            active: self.is_pinching(distance),
            distance,
            cursor: index_tip,
        }
    }

    /// Classify a detected hand. Returns `None` when the hand lacks either
    /// fingertip.
    pub fn read_hand(&self, hand: &Hand, frame_width: u32, frame_height: u32) -> Option<PinchReading> {
        let thumb = hand.landmark(HandLandmark::ThumbTip)?;
        let index = hand.landmark(HandLandmark::IndexFingerTip)?;

        Some(self.classify(
            thumb.to_pixel(frame_width, frame_height),
            index.to_pixel(frame_width, frame_height),
        ))
    }

    /// Classify the first hand of a frame; the pen follows one hand only
    pub fn read_frame(&self, hands: &[Hand], frame_width: u32, frame_height: u32) -> Option<PinchReading> {
        hands
            .first()
            .and_then(|hand| self.read_hand(hand, frame_width, frame_height))
    }
}

impl Default for PinchClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_PINCH_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::landmarks::NormalizedLandmark;

    fn hand_with(thumb: (f64, f64), index: (f64, f64)) -> Hand {
        let mut landmarks = vec![NormalizedLandmark { x: 0.0, y: 0.0, z: 0.0 }; HandLandmark::COUNT];
        landmarks[HandLandmark::ThumbTip.index()] = NormalizedLandmark { x: thumb.0, y: thumb.1, z: 0.0 };
        landmarks[HandLandmark::IndexFingerTip.index()] = NormalizedLandmark { x: index.0, y: index.1, z: 0.0 };
        Hand { landmarks }
    }

    #[test]
    fn test_threshold_is_strict() {
        let classifier = PinchClassifier::new(70.0);
        let origin = Point::new(0.0, 0.0);

        assert!(classifier.classify(origin, Point::new(69.9, 0.0)).active);
        assert!(!classifier.classify(origin, Point::new(70.0, 0.0)).active);
        assert!(!classifier.classify(origin, Point::new(70.1, 0.0)).active);
    }

    #[test]
    fn test_cursor_is_index_tip() {
        let reading = PinchClassifier::default().classify(Point::new(10.0, 10.0), Point::new(13.0, 14.0));
        assert_eq!(reading.cursor, Point::new(13.0, 14.0));
        assert_eq!(reading.distance, 5.0);
        assert!(reading.active);
    }

    #[test]
    fn test_read_hand_uses_frame_pixels() {
        let classifier = PinchClassifier::default();
        // 0.1 of a 640px frame is 64px: pinching
        let close = hand_with((0.5, 0.5), (0.6, 0.5));
        let reading = classifier.read_hand(&close, 640, 480).unwrap();
        assert!(reading.active);
        assert_eq!(reading.cursor, Point::new(384.0, 240.0));

        // 0.2 of a 640px frame is 128px: not pinching
        let apart = hand_with((0.4, 0.5), (0.6, 0.5));
        assert!(!classifier.read_hand(&apart, 640, 480).unwrap().active);
    }

    #[test]
    fn test_read_frame_without_hands() {
        assert!(PinchClassifier::default().read_frame(&[], 640, 480).is_none());
    }

    #[test]
    fn test_read_frame_uses_first_hand() {
        let hands = vec![hand_with((0.5, 0.5), (0.55, 0.5)), hand_with((0.0, 0.0), (0.9, 0.9))];
        assert!(PinchClassifier::default().read_frame(&hands, 640, 480).unwrap().active);
    }
}
