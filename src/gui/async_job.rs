//! Background work for the GUI thread.
//!
//! Each job runs its future to completion on a dedicated thread with a
//! current-thread tokio runtime and hands the result back over a channel
//! the GUI polls once per frame. Dropping the job abandons the result but
//! not the work; submitted transactions cannot be cancelled anyway.

use anyhow::{anyhow, Result};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tokio::runtime::Builder;

pub struct AsyncJob<T> {
    receiver: Option<Receiver<Result<T>>>,
}

impl<T: Send + 'static> AsyncJob<T> {
    /// Spawn `builder`'s future on a fresh worker thread. The builder runs
    /// on that thread, so the future itself does not need to be `Send`.
    pub fn spawn<FB, Fut>(builder: FB) -> Self
    where
        FB: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<T>> + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime.block_on(builder()),
                Err(e) => Err(anyhow!("Failed to create async runtime: {}", e)),
            };
            let _ = tx.send(result);
        });
        Self { receiver: Some(rx) }
    }
}

impl<T> AsyncJob<T> {
    /// Poll for completion. `Some(result)` exactly once, then the job is
    /// spent; `None` while still running.
    pub fn poll(&mut self) -> Option<Result<T>> {
        if let Some(rx) = &self.receiver {
            match rx.try_recv() {
                Ok(res) => {
                    self.receiver = None;
                    return Some(res);
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.receiver = None;
                    return Some(Err(anyhow!("Worker task disconnected")));
                }
            }
        }
        None
    }

    pub fn is_running(&self) -> bool {
        self.receiver.is_some()
    }
}
