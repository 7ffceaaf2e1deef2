//! Background host main loop for scenarios that exercise host-bound handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::host::{EditorWorld, HostPump, HostQueue, host_queue};

const PUMP_WAIT: Duration = Duration::from_millis(5);

/// Owns an [`EditorWorld`] on a dedicated thread and pumps its queue, or
/// holds the pump without draining it to model a busy host.
pub struct HostHarness {
    queue: HostQueue<EditorWorld>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    stalled: Option<HostPump<EditorWorld>>,
}

impl HostHarness {
    /// Starts pumping a world with an active level.
    pub fn spawn(timeout: Duration) -> Self {
        let (queue, pump) = host_queue(timeout);
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::spawn(move || {
            let mut world = EditorWorld::with_active_world();
            while !flag.load(Ordering::SeqCst) {
                pump.pump_for(&mut world, PUMP_WAIT);
            }
        });
        Self {
            queue,
            stop,
            thread: Some(thread),
            stalled: None,
        }
    }

    /// Creates a host loop that never runs queued tasks until closed.
    pub fn stalled(timeout: Duration) -> Self {
        let (queue, pump) = host_queue(timeout);
        Self {
            queue,
            stop: Arc::new(AtomicBool::new(false)),
            thread: None,
            stalled: Some(pump),
        }
    }

    /// Tasks waiting on a stalled host.
    pub fn pending(&self) -> usize {
        self.stalled.as_ref().map_or(0, HostPump::pending)
    }

    /// Shuts a stalled host loop down, failing every waiting caller.
    pub fn close(&mut self) {
        self.stalled = None;
    }

    /// Queue handlers submit work through.
    pub fn queue(&self) -> HostQueue<EditorWorld> {
        self.queue.clone()
    }

    /// Total objects in the world, read on the host thread.
    pub fn object_count(&self) -> usize {
        self.queue
            .call(|world: &mut EditorWorld| world.object_count())
            .expect("host thread responds")
    }

    /// Loads or unloads the level.
    pub fn set_world_active(&self, active: bool) {
        self.queue
            .call(move |world: &mut EditorWorld| world.set_world_active(active))
            .expect("host thread responds");
    }
}

impl Drop for HostHarness {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
