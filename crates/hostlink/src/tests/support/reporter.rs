//! Test double for [`HealthReporter`] that records lifecycle events.

use std::net::SocketAddr;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use hostlink_config::BridgeEndpoint;

use crate::health::HealthReporter;
use crate::transport::ListenerError;

/// Lifecycle events captured during a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Listener bind started for the endpoint.
    ListenerStarting(String),
    /// Listener thread running on the bound address.
    ListenerReady(SocketAddr),
    /// Listener failed with a message.
    ListenerFailed(String),
    /// Client accepted.
    ClientConnected,
    /// Client connection ended.
    ClientDisconnected,
    /// Listener thread joined.
    ListenerStopped,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }

    /// Polls until a listener reports ready, returning the latest address.
    pub fn wait_for_address(&self, timeout: Duration) -> Option<SocketAddr> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let ready = self.events().into_iter().rev().find_map(|event| match event {
                HealthEvent::ListenerReady(address) => Some(address),
                _ => None,
            });
            if ready.is_some() {
                return ready;
            }
            thread::sleep(Duration::from_millis(5));
        }
        None
    }

    /// Polls until `event` has been recorded at least `count` times.
    pub fn wait_for(&self, event: &HealthEvent, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.count(event) >= count {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    /// Number of times `event` was recorded.
    pub fn count(&self, event: &HealthEvent) -> usize {
        self.events()
            .iter()
            .filter(|recorded| *recorded == event)
            .count()
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn listener_starting(&self, endpoint: &BridgeEndpoint) {
        self.record(HealthEvent::ListenerStarting(endpoint.to_string()));
    }

    fn listener_ready(&self, address: SocketAddr) {
        self.record(HealthEvent::ListenerReady(address));
    }

    fn listener_failed(&self, error: &ListenerError) {
        self.record(HealthEvent::ListenerFailed(error.to_string()));
    }

    fn client_connected(&self, _peer: SocketAddr) {
        self.record(HealthEvent::ClientConnected);
    }

    fn client_disconnected(&self, _peer: SocketAddr) {
        self.record(HealthEvent::ClientDisconnected);
    }

    fn listener_stopped(&self) {
        self.record(HealthEvent::ListenerStopped);
    }
}
