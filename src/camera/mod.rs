//! Live camera view
//!
//! The render loop drives the frame pipeline; the preview slot holds the
//! latest composited frame for the main window.

pub mod processor;
pub mod render_loop;

pub use processor::{FrameProcessor, ProcessedFrame};
pub use render_loop::{FrameSource, OpsSink, Preview, PreviewSlot, RenderLoop};
