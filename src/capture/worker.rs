//! Background capture worker
//!
//! One dedicated thread per capture source. The thread owns the source and
//! the session buffer; the only state shared with the caller is the
//! recording flag. Stopping clears the flag and joins the thread, which hands
//! the buffer back.

use super::traits::CaptureSource;
use crate::recorder::channel::{RecordingError, RecordingResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Runs a capture loop on its own thread and collects what it acquires
pub struct CaptureWorker<U: Send + 'static> {
    name: String,
    is_recording: Arc<AtomicBool>,
    handle: Option<JoinHandle<Vec<U>>>,
}

impl<U: Send + 'static> CaptureWorker<U> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_recording: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }

    /// Open a source on a new thread and start appending its units.
    ///
    /// `open` runs on the worker thread; its failure is returned here and no
    /// loop is left running.
    pub fn start<S, F>(&mut self, open: F) -> RecordingResult<()>
    where
        S: CaptureSource<Unit = U> + 'static,
        F: FnOnce() -> RecordingResult<S> + Send + 'static,
    {
        if self.handle.is_some() {
            return Err(RecordingError::AlreadyRecording);
        }

        self.is_recording.store(true, Ordering::SeqCst);

        let (ready_tx, ready_rx) = mpsc::channel::<RecordingResult<()>>();
        let is_recording = self.is_recording.clone();
        let name = self.name.clone();

        let handle = thread::Builder::new()
            .name(format!("capture-{}", self.name))
            .spawn(move || {
                let mut source = match open() {
                    Ok(source) => {
                        let _ = ready_tx.send(Ok(()));
                        source
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return Vec::new();
                    }
                };

                let mut buffer = Vec::new();
                while is_recording.load(Ordering::SeqCst) {
                    match source.acquire() {
                        Ok(Some(unit)) => buffer.push(unit),
                        Ok(None) => {}
                        Err(e) => {
                            tracing::error!("{} capture failed, ending loop: {}", name, e);
                            is_recording.store(false, Ordering::SeqCst);
                            break;
                        }
                    }
                }

                tracing::debug!("{} capture loop exited with {} units", name, buffer.len());
                buffer
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.handle = Some(handle);
                tracing::info!("{} capture started", self.name);
                Ok(())
            }
            Ok(Err(e)) => {
                self.is_recording.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                self.is_recording.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(RecordingError::CaptureError(format!(
                    "{} capture thread exited before opening its device",
                    self.name
                )))
            }
        }
    }

    /// Clear the flag, wait for the loop to exit and take its buffer
    pub fn stop(&mut self) -> RecordingResult<Vec<U>> {
        let handle = self.handle.take().ok_or(RecordingError::NotRecording)?;
        self.is_recording.store(false, Ordering::SeqCst);

        let buffer = handle.join().map_err(|_| {
            RecordingError::CaptureError(format!("{} capture thread panicked", self.name))
        })?;

        tracing::info!("{} capture stopped with {} units", self.name, buffer.len());
        Ok(buffer)
    }
}

impl<U: Send + 'static> Drop for CaptureWorker<U> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.is_recording.store(false, Ordering::SeqCst);
            let _ = handle.join();
        }
    }
}
