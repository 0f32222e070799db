//! Camera render loop
//!
//! A dedicated thread reads the camera once per tick, runs the frame
//! pipeline and publishes the latest preview. The camera is opened on that
//! thread; failing to open it fails `spawn`.

use super::processor::FrameProcessor;
use crate::capture::{VideoFrame, Webcam, WebcamError};
use crate::drawing::{CanvasOp, DrawingBoard};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Anything the render loop can pull frames from
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<VideoFrame, WebcamError>;
}

impl FrameSource for Webcam {
    fn next_frame(&mut self) -> Result<VideoFrame, WebcamError> {
        self.frame()
    }
}

/// Latest composited preview frame
#[derive(Debug, Clone)]
pub struct Preview {
    /// Frames published since start
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Shared slot holding the most recent preview
#[derive(Debug, Clone, Default)]
pub struct PreviewSlot(Arc<Mutex<Option<Preview>>>);

impl PreviewSlot {
    pub fn latest(&self) -> Option<Preview> {
        self.0.lock().clone()
    }

    fn publish(&self, width: u32, height: u32, png: Vec<u8>) {
        let mut slot = self.0.lock();
        let sequence = slot.as_ref().map(|p| p.sequence + 1).unwrap_or(0);
        *slot = Some(Preview {
            sequence,
            width,
            height,
            png,
        });
    }
}

/// Receives whiteboard operations produced by gestures. Called with the
/// board locked.
pub type OpsSink = Box<dyn Fn(Vec<CanvasOp>) + Send>;

pub struct RenderLoop {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RenderLoop {
    /// Open the camera on a new thread and start ticking every `interval`
    pub fn spawn<S, F>(
        open: F,
        mut processor: FrameProcessor,
        board: Arc<Mutex<DrawingBoard>>,
        preview: PreviewSlot,
        on_ops: OpsSink,
        interval: Duration,
    ) -> Result<Self, WebcamError>
    where
        S: FrameSource + 'static,
        F: FnOnce() -> Result<S, WebcamError> + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), WebcamError>>();
        let flag = running.clone();

        let handle = thread::Builder::new()
            .name("camera-render".to_string())
            .spawn(move || {
                let mut camera = match open() {
                    Ok(camera) => {
                        let _ = ready_tx.send(Ok(()));
                        camera
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                let mut ticks: u64 = 0;
                while flag.load(Ordering::SeqCst) {
                    let tick_start = Instant::now();

                    match camera.next_frame() {
                        Ok(frame) => match processor.process(frame, &board, &*on_ops) {
                            Ok(out) => preview.publish(out.width, out.height, out.preview),
                            Err(e) => tracing::warn!("Dropping camera frame: {}", e),
                        },
                        Err(e) => tracing::warn!("Camera read failed: {}", e),
                    }

                    ticks += 1;
                    if let Some(rest) = interval.checked_sub(tick_start.elapsed()) {
                        thread::sleep(rest);
                    }
                }

                tracing::debug!("Render loop exited after {} ticks", ticks);
            })
            .map_err(|e| WebcamError::Frame(format!("Failed to spawn render thread: {}", e)))?;

        let opened = ready_rx.recv().unwrap_or_else(|_| {
            Err(WebcamError::Frame("Render thread exited before opening the camera".to_string()))
        });

        match opened {
            Ok(()) => {
                tracing::info!("Render loop started ({:?} per tick)", interval);
                Ok(Self {
                    running,
                    handle: Some(handle),
                })
            }
            Err(e) => {
                let _ = handle.join();
                Err(e)
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop ticking and wait for the thread to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Render thread panicked");
            }
        }
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::DrawTarget;
    use crate::gesture::{NoLandmarks, PinchClassifier};
    use std::sync::atomic::AtomicUsize;

    /// Solid frames; every `fail_every`-th read fails
    struct FakeCamera {
        reads: Arc<AtomicUsize>,
        fail_every: Option<usize>,
    }

    impl FrameSource for FakeCamera {
        fn next_frame(&mut self) -> Result<VideoFrame, WebcamError> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_every.map(|k| n % k == 0).unwrap_or(false) {
                return Err(WebcamError::Frame("dropped".to_string()));
            }
            Ok(VideoFrame::from_raw(4, 3, vec![90; 4 * 3 * 4]).unwrap())
        }
    }

    fn processor() -> FrameProcessor {
        FrameProcessor::new(PinchClassifier::default(), Box::new(NoLandmarks), true, false)
    }

    fn no_ops() -> OpsSink {
        Box::new(|_| {})
    }

    #[test]
    fn test_loop_publishes_previews_until_stopped() {
        let reads = Arc::new(AtomicUsize::new(0));
        let camera_reads = reads.clone();
        let preview = PreviewSlot::default();
        let board = Arc::new(Mutex::new(DrawingBoard::default()));

        let mut render = RenderLoop::spawn(
            move || Ok(FakeCamera { reads: camera_reads, fail_every: Some(3) }),
            processor(),
            board.clone(),
            preview.clone(),
            no_ops(),
            Duration::from_millis(1),
        )
        .unwrap();
        assert!(render.is_running());

        thread::sleep(Duration::from_millis(50));
        render.stop();
        assert!(!render.is_running());

        let latest = preview.latest().unwrap();
        assert_eq!((latest.width, latest.height), (4, 3));
        assert!(latest.sequence > 0);

        // No reads after stop
        let after_stop = reads.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(10));
        assert_eq!(reads.load(Ordering::SeqCst), after_stop);

        // The overlay was allocated at the camera's frame size
        let board = board.lock();
        let overlay = board.overlay().unwrap().surface();
        assert_eq!((overlay.width(), overlay.height()), (4, 3));
    }

    #[test]
    fn test_camera_open_failure_fails_spawn() {
        let result = RenderLoop::spawn(
            || -> Result<FakeCamera, WebcamError> {
                Err(WebcamError::Open {
                    index: 0,
                    message: "no device".to_string(),
                })
            },
            processor(),
            Arc::new(Mutex::new(DrawingBoard::default())),
            PreviewSlot::default(),
            no_ops(),
            Duration::from_millis(1),
        );

        assert!(matches!(result, Err(WebcamError::Open { index: 0, .. })));
    }

    #[test]
    fn test_pointer_ops_reach_sink_on_next_tick() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink_received = received.clone();
        let board = Arc::new(Mutex::new(DrawingBoard::default()));
        {
            let mut board = board.lock();
            board.open_whiteboard();
            board.set_target(DrawTarget::Whiteboard);
        }

        let mut render = RenderLoop::spawn(
            || Ok(FakeCamera { reads: Arc::new(AtomicUsize::new(0)), fail_every: None }),
            processor(),
            board.clone(),
            PreviewSlot::default(),
            Box::new(move |ops| sink_received.lock().extend(ops)),
            Duration::from_millis(1),
        )
        .unwrap();

        {
            let mut board = board.lock();
            board.pointer_move(crate::drawing::Point::new(1.0, 1.0));
            board.pointer_move(crate::drawing::Point::new(2.0, 2.0));
        }
        thread::sleep(Duration::from_millis(30));
        render.stop();

        assert_eq!(received.lock().len(), 1);
        assert!(matches!(received.lock()[0], CanvasOp::Draw { .. }));
    }
}
