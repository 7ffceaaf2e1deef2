//! Work queue from the listener thread to the host main loop.
//!
//! Host state is owned by the main loop and is never touched from the
//! listener thread. A handler submits a closure with [`HostQueue::call`] and
//! blocks until the main loop runs it through [`HostPump`] or the timeout
//! elapses. A task whose caller has given up is skipped rather than run late.
//! Dropping the pump discards queued tasks, so every waiting caller fails
//! with [`HostCallError::Disconnected`] at once.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use thiserror::Error;
use tracing::debug;

use crate::result::{CommandError, ErrorCode};

const HOST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::host");

type HostTask<W> = Box<dyn FnOnce(&mut W) + Send>;

/// Errors raised when the main loop does not complete a task.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostCallError {
    /// The main loop did not run the task in time.
    #[error("host main loop did not respond within {timeout:?}")]
    TimedOut { timeout: Duration },
    /// The main loop has shut down.
    #[error("host main loop is no longer running")]
    Disconnected,
}

impl From<HostCallError> for CommandError {
    fn from(error: HostCallError) -> Self {
        Self::new(ErrorCode::HostContextUnavailable).with_context(error.to_string())
    }
}

/// Creates a connected queue and pump pair.
#[must_use]
pub fn host_queue<W: 'static>(timeout: Duration) -> (HostQueue<W>, HostPump<W>) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    (HostQueue { sender, timeout }, HostPump { receiver })
}

/// Sending side, cloned into every handler that touches host state.
pub struct HostQueue<W> {
    sender: Sender<HostTask<W>>,
    timeout: Duration,
}

impl<W> Clone for HostQueue<W> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            timeout: self.timeout,
        }
    }
}

impl<W: 'static> HostQueue<W> {
    /// Runs `task` on the host main loop and waits for its result.
    ///
    /// # Errors
    ///
    /// Returns [`HostCallError::TimedOut`] when the main loop does not run the
    /// task within the configured timeout and [`HostCallError::Disconnected`]
    /// when the pump has been dropped.
    pub fn call<R, F>(&self, task: F) -> Result<R, HostCallError>
    where
        F: FnOnce(&mut W) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply, outcome) = crossbeam_channel::bounded(1);
        let abandoned = Arc::new(AtomicBool::new(false));
        let skip = Arc::clone(&abandoned);
        let boxed: HostTask<W> = Box::new(move |world: &mut W| {
            if skip.load(Ordering::SeqCst) {
                debug!(target: HOST_TARGET, "skipping abandoned host task");
                return;
            }
            if reply.send(task(world)).is_err() {
                debug!(target: HOST_TARGET, "caller stopped waiting for host task");
            }
        });
        self.sender
            .send(boxed)
            .map_err(|_| HostCallError::Disconnected)?;

        outcome.recv_timeout(self.timeout).map_err(|error| {
            abandoned.store(true, Ordering::SeqCst);
            match error {
                RecvTimeoutError::Timeout => HostCallError::TimedOut {
                    timeout: self.timeout,
                },
                RecvTimeoutError::Disconnected => HostCallError::Disconnected,
            }
        })
    }

    /// Like [`Self::call`] for tasks that already return a [`CommandError`]
    /// result, flattening the host failure into the same error type.
    ///
    /// # Errors
    ///
    /// Returns the task's own error or a `HostContextUnavailable` error.
    pub fn run<R, F>(&self, task: F) -> Result<R, CommandError>
    where
        F: FnOnce(&mut W) -> Result<R, CommandError> + Send + 'static,
        R: Send + 'static,
    {
        self.call(task)?
    }
}

/// Receiving side, owned by the host main loop.
pub struct HostPump<W> {
    receiver: Receiver<HostTask<W>>,
}

impl<W> HostPump<W> {
    /// Runs every queued task without waiting. Returns the number run.
    pub fn pump(&self, world: &mut W) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task(world);
            ran += 1;
        }
        ran
    }

    /// Waits up to `wait` for a task, then drains the queue. Returns the
    /// number of tasks run.
    pub fn pump_for(&self, world: &mut W, wait: Duration) -> usize {
        match self.receiver.recv_timeout(wait) {
            Ok(task) => {
                task(world);
                1 + self.pump(world)
            }
            Err(_) => 0,
        }
    }

    /// Number of tasks waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl<W> Drop for HostPump<W> {
    fn drop(&mut self) {
        let discarded = self.receiver.try_iter().count();
        if discarded > 0 {
            debug!(target: HOST_TARGET, discarded, "host loop closed with tasks queued");
        }
    }
}
