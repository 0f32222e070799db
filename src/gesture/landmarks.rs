//! Hand landmark model
//!
//! Landmarks follow the 21-point hand topology used by common hand-tracking
//! models; coordinates are normalized to the frame (0.0..=1.0).

use crate::drawing::Point;
use serde::{Deserialize, Serialize};

/// Named keypoints of a detected hand, by index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexFingerMcp = 5,
    IndexFingerPip = 6,
    IndexFingerDip = 7,
    IndexFingerTip = 8,
    MiddleFingerMcp = 9,
    MiddleFingerPip = 10,
    MiddleFingerDip = 11,
    MiddleFingerTip = 12,
    RingFingerMcp = 13,
    RingFingerPip = 14,
    RingFingerDip = 15,
    RingFingerTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandLandmark {
    /// Number of landmarks in a complete hand
    pub const COUNT: usize = 21;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Bones drawn between landmarks when a hand is shown on the preview
pub const HAND_CONNECTIONS: [(HandLandmark, HandLandmark); 21] = {
    use HandLandmark::*;
    [
        (Wrist, ThumbCmc),
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        (Wrist, IndexFingerMcp),
        (IndexFingerMcp, IndexFingerPip),
        (IndexFingerPip, IndexFingerDip),
        (IndexFingerDip, IndexFingerTip),
        (IndexFingerMcp, MiddleFingerMcp),
        (MiddleFingerMcp, MiddleFingerPip),
        (MiddleFingerPip, MiddleFingerDip),
        (MiddleFingerDip, MiddleFingerTip),
        (MiddleFingerMcp, RingFingerMcp),
        (RingFingerMcp, RingFingerPip),
        (RingFingerPip, RingFingerDip),
        (RingFingerDip, RingFingerTip),
        (RingFingerMcp, PinkyMcp),
        (Wrist, PinkyMcp),
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};

/// A landmark in frame-relative coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLandmark {
    pub x: f64,
    pub y: f64,
    /// Depth relative to the wrist; unused for drawing
    #[serde(default)]
    pub z: f64,
}

impl NormalizedLandmark {
    /// Convert to frame pixels, truncating toward zero
    pub fn to_pixel(&self, frame_width: u32, frame_height: u32) -> Point {
        Point::new(
            (self.x * frame_width as f64).trunc(),
            (self.y * frame_height as f64).trunc(),
        )
    }
}

/// One detected hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub landmarks: Vec<NormalizedLandmark>,
}

impl Hand {
    pub fn landmark(&self, which: HandLandmark) -> Option<&NormalizedLandmark> {
        self.landmarks.get(which.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pixel_truncates() {
        let lm = NormalizedLandmark { x: 0.5, y: 0.999, z: 0.0 };
        assert_eq!(lm.to_pixel(640, 480), Point::new(320.0, 479.0));
    }

    #[test]
    fn test_landmark_lookup_by_name() {
        let landmarks = (0..HandLandmark::COUNT)
            .map(|i| NormalizedLandmark { x: i as f64 / 100.0, y: 0.0, z: 0.0 })
            .collect();
        let hand = Hand { landmarks };

        assert_eq!(hand.landmark(HandLandmark::ThumbTip).unwrap().x, 0.04);
        assert_eq!(hand.landmark(HandLandmark::IndexFingerTip).unwrap().x, 0.08);
    }

    #[test]
    fn test_incomplete_hand_has_missing_landmarks() {
        let hand = Hand { landmarks: vec![NormalizedLandmark { x: 0.1, y: 0.1, z: 0.0 }] };
        assert!(hand.landmark(HandLandmark::Wrist).is_some());
        assert!(hand.landmark(HandLandmark::PinkyTip).is_none());
    }
}
