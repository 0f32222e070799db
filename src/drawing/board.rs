//! Drawing board
//!
//! Owns the camera overlay and the whiteboard, and routes pinch readings,
//! pointer input and pen commands to whichever one is selected.

use super::raster::RasterCanvas;
use super::recorder::{PenControl, StrokeRecorder};
use super::stroke::{Color, Point, StrokeStyle};
use super::surface::CanvasOp;
use super::whiteboard::{Whiteboard, WhiteboardSnapshot};
use crate::capture::VideoFrame;
use crate::gesture::PinchReading;
use serde::{Deserialize, Serialize};

/// Where gesture strokes and pen commands go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawTarget {
    #[default]
    None,
    Camera,
    Whiteboard,
}

/// A pen command from the control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "camelCase")]
pub enum PenCommand {
    SetColor(Color),
    SetWidth(u32),
    Eraser,
    Undo,
    Redo,
    Clear,
}

/// Size and pen of a newly opened whiteboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteboardLayout {
    pub width: u32,
    pub height: u32,
    pub pen: StrokeStyle,
}

impl Default for WhiteboardLayout {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            pen: StrokeStyle::new(Color::BLACK, 5),
        }
    }
}

#[derive(Debug)]
pub struct DrawingBoard {
    target: DrawTarget,
    overlay_pen: StrokeStyle,
    overlay: Option<StrokeRecorder<RasterCanvas>>,
    layout: WhiteboardLayout,
    whiteboard: Option<Whiteboard>,
    /// Whether the last reading was an active pinch
    pinching: bool,
}

impl DrawingBoard {
    pub fn new(overlay_pen: StrokeStyle, layout: WhiteboardLayout) -> Self {
        Self {
            target: DrawTarget::None,
            overlay_pen,
            overlay: None,
            layout,
            whiteboard: None,
            pinching: false,
        }
    }

    pub fn target(&self) -> DrawTarget {
        self.target
    }

    /// Select a target. Any stroke in progress on either surface ends.
    pub fn set_target(&mut self, target: DrawTarget) {
        if self.target != target {
            tracing::debug!("Draw target {:?} -> {:?}", self.target, target);
        }
        self.release_all();
        self.target = target;
    }

    /// Apply this tick's gesture.
    ///
    /// An active pinch extends the stroke on the selected target. The first
    /// reading without one (no hand, open hand) releases both pens; later
    /// ones leave mouse strokes on the whiteboard alone.
    pub fn apply_reading(&mut self, reading: Option<PinchReading>) {
        match reading {
            Some(reading) if reading.active => {
                self.pinching = true;
                self.draw_gesture(reading.cursor);
            }
            _ => {
                if std::mem::take(&mut self.pinching) {
                    self.release_all();
                }
            }
        }
    }

    fn draw_gesture(&mut self, cursor: Point) {
        match self.target {
            DrawTarget::None => {}
            DrawTarget::Camera => {
                if let Some(overlay) = self.overlay.as_mut() {
                    overlay.begin_or_continue(cursor);
                }
            }
            DrawTarget::Whiteboard => {
                if let Some(whiteboard) = self.whiteboard.as_mut() {
                    whiteboard.recorder_mut().begin_or_continue(cursor);
                }
            }
        }
    }

    fn release_all(&mut self) {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.release();
        }
        if let Some(whiteboard) = self.whiteboard.as_mut() {
            whiteboard.recorder_mut().release();
        }
    }

    /// Allocate the overlay at the first frame's size. A frame of another
    /// size (camera resolution changed) gets a new overlay with the history
    /// repainted.
    pub fn ensure_overlay(&mut self, width: u32, height: u32) {
        match self.overlay.as_mut() {
            None => {
                tracing::debug!("Allocating {}x{} camera overlay", width, height);
                self.overlay = Some(StrokeRecorder::new(
                    RasterCanvas::new(width, height, Color::BLACK),
                    self.overlay_pen,
                ));
            }
            Some(overlay) => {
                let surface = overlay.surface();
                if (surface.width(), surface.height()) != (width, height) {
                    tracing::warn!(
                        "Camera frame size changed from {}x{} to {}x{}, reallocating overlay",
                        surface.width(),
                        surface.height(),
                        width,
                        height
                    );
                    overlay.replace_surface(RasterCanvas::new(width, height, Color::BLACK));
                }
            }
        }
    }

    pub fn overlay(&self) -> Option<&StrokeRecorder<RasterCanvas>> {
        self.overlay.as_ref()
    }

    /// Blend the overlay 50/50 into `frame`. Returns false when there is no
    /// overlay or its size does not match.
    pub fn composite(&self, frame: &mut VideoFrame) -> bool {
        let (width, height) = (frame.width(), frame.height());
        match &self.overlay {
            Some(overlay) => overlay
                .surface()
                .blend_into(frame.bytes_mut(), width, height),
            None => false,
        }
    }

    /// Run a pen command against the selected target.
    ///
    /// Returns the resulting pen style, or `None` when the command was
    /// ignored (no target, or the target is not open yet).
    pub fn pen_command(&mut self, command: PenCommand) -> Option<StrokeStyle> {
        let pen: &mut dyn PenControl = match self.target {
            DrawTarget::None => return None,
            DrawTarget::Camera => self.overlay.as_mut()?,
            DrawTarget::Whiteboard => self.whiteboard.as_mut()?.recorder_mut(),
        };

        match command {
            PenCommand::SetColor(color) => pen.set_color(color),
            PenCommand::SetWidth(width) => pen.set_width(width),
            PenCommand::Eraser => pen.use_eraser(),
            PenCommand::Undo => pen.undo(),
            PenCommand::Redo => pen.redo(),
            PenCommand::Clear => pen.clear(),
        }

        let style = pen.style();
        if self.target == DrawTarget::Camera {
            self.overlay_pen = style;
        }
        Some(style)
    }

    /// Pen style of the selected target
    pub fn pen_style(&self) -> Option<StrokeStyle> {
        match self.target {
            DrawTarget::None => None,
            DrawTarget::Camera => Some(self.overlay_pen),
            DrawTarget::Whiteboard => self.whiteboard.as_ref().map(|w| w.recorder().style()),
        }
    }

    /// Open the whiteboard. Returns false if it was already open.
    pub fn open_whiteboard(&mut self) -> bool {
        if self.whiteboard.is_some() {
            return false;
        }
        tracing::info!("Opening {}x{} whiteboard", self.layout.width, self.layout.height);
        self.whiteboard = Some(Whiteboard::new(
            self.layout.width,
            self.layout.height,
            self.layout.pen,
        ));
        true
    }

    /// Destroy the whiteboard and its history
    pub fn close_whiteboard(&mut self) {
        if self.whiteboard.take().is_some() {
            tracing::info!("Whiteboard closed");
        }
    }

    pub fn whiteboard(&self) -> Option<&Whiteboard> {
        self.whiteboard.as_ref()
    }

    pub fn whiteboard_snapshot(&self) -> Option<WhiteboardSnapshot> {
        self.whiteboard.as_ref().map(Whiteboard::snapshot)
    }

    /// Canvas operations queued since the last drain
    pub fn drain_whiteboard_ops(&mut self) -> Vec<CanvasOp> {
        self.whiteboard
            .as_mut()
            .map(Whiteboard::drain_ops)
            .unwrap_or_default()
    }

    /// Mouse drag on the whiteboard
    pub fn pointer_move(&mut self, point: Point) {
        if let Some(whiteboard) = self.whiteboard.as_mut() {
            whiteboard.recorder_mut().begin_or_continue(point);
        }
    }

    /// Mouse button released on the whiteboard
    pub fn pointer_up(&mut self) {
        if let Some(whiteboard) = self.whiteboard.as_mut() {
            whiteboard.recorder_mut().release();
        }
    }

    /// Change the size and pen used for the next whiteboard
    pub fn set_layout(&mut self, layout: WhiteboardLayout) {
        self.layout = layout;
    }
}

impl Default for DrawingBoard {
    fn default() -> Self {
        Self::new(StrokeStyle::new(Color::BLUE, 10), WhiteboardLayout::default())
    }
}
