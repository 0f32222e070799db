//! Stroke drawing
//!
//! Pen strokes with undo/redo, drawn either into a raster overlay blended over
//! the webcam feed or onto a vector whiteboard rendered by the frontend.

pub mod board;
pub mod raster;
pub mod recorder;
pub mod stroke;
pub mod surface;
pub mod whiteboard;

pub use board::{DrawTarget, DrawingBoard, PenCommand, WhiteboardLayout};
pub use raster::{paint_segment, RasterCanvas};
pub use recorder::{PenControl, StrokeRecorder};
pub use stroke::{Color, Point, StrokeSegment, StrokeStyle};
pub use surface::{CanvasOp, StrokeSurface, VectorCanvas};
pub use whiteboard::{Whiteboard, WhiteboardSnapshot};
