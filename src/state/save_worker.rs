//! Background thread that performs saves.
//!
//! Jobs go in over one channel and outcomes come back over another, so the
//! session never blocks on I/O unless it asks to.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::save_sync::{SaveJob, SaveResult};
use super::storage::Storage;

/// Message sent to the save thread.
enum ThreadMessage {
    /// Write a file
    Save(SaveJob),
    /// Shutdown the thread
    Shutdown,
}

/// Owns the save thread and its channels.
pub struct SaveWorker {
    /// Sender for jobs to the background thread
    request_tx: Sender<ThreadMessage>,
    /// Receiver for outcomes from the background thread
    result_rx: Receiver<SaveResult>,
    /// Handle to the background thread (for joining on drop)
    thread_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for SaveWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveWorker")
            .field("running", &self.thread_handle.is_some())
            .finish()
    }
}

/// Run one job against the storage.
pub fn run_job(storage: &dyn Storage, job: &SaveJob) -> SaveResult {
    SaveResult {
        generation: job.generation,
        result: storage
            .save(&job.path, &job.content)
            .map_err(|e| e.to_string()),
    }
}

impl SaveWorker {
    /// Spawn the save thread.
    pub fn spawn(storage: Arc<dyn Storage>) -> std::io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<ThreadMessage>();
        let (result_tx, result_rx) = mpsc::channel::<SaveResult>();

        let thread_handle = thread::Builder::new()
            .name("labelgrid-save".to_string())
            .spawn(move || {
                log::debug!("Save thread started");
                Self::thread_loop(storage.as_ref(), request_rx, result_tx);
                log::debug!("Save thread exiting");
            })?;

        Ok(Self {
            request_tx,
            result_rx,
            thread_handle: Some(thread_handle),
        })
    }

    fn thread_loop(
        storage: &dyn Storage,
        request_rx: Receiver<ThreadMessage>,
        result_tx: Sender<SaveResult>,
    ) {
        while let Ok(message) = request_rx.recv() {
            match message {
                ThreadMessage::Save(job) => {
                    if result_tx.send(run_job(storage, &job)).is_err() {
                        log::warn!("Result channel closed, save thread exiting");
                        break;
                    }
                }
                ThreadMessage::Shutdown => break,
            }
        }
    }

    /// Hand a job to the thread. Gives the job back if the thread is gone.
    pub fn submit(&self, job: SaveJob) -> Result<(), SaveJob> {
        match self.request_tx.send(ThreadMessage::Save(job)) {
            Ok(()) => Ok(()),
            Err(mpsc::SendError(ThreadMessage::Save(job))) => Err(job),
            Err(mpsc::SendError(ThreadMessage::Shutdown)) => Ok(()),
        }
    }

    /// Take one finished outcome without blocking.
    pub fn try_result(&self) -> Option<SaveResult> {
        match self.result_rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Save thread disconnected");
                None
            }
        }
    }

    /// Wait up to `timeout` for one finished outcome.
    pub fn wait_result(&self, timeout: Duration) -> Option<SaveResult> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("Save thread disconnected");
                None
            }
        }
    }
}

impl Drop for SaveWorker {
    fn drop(&mut self) {
        log::debug!("Shutting down save thread");
        let _ = self.request_tx.send(ThreadMessage::Shutdown);

        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::warn!("Save thread panicked: {:?}", e);
            }
        }
    }
}
