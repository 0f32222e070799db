//! Hand gesture input
//!
//! Landmarks come from an external detector; the classifier reduces them to
//! a single pinch reading per frame.

pub mod classifier;
pub mod landmarks;
pub mod source;

pub use classifier::{PinchClassifier, PinchReading, DEFAULT_PINCH_THRESHOLD};
pub use landmarks::{Hand, HandLandmark, NormalizedLandmark, HAND_CONNECTIONS};
pub use source::{LandmarkError, LandmarkSource, NoLandmarks, ProcessLandmarkSource};
