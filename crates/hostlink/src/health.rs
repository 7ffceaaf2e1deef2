//! Structured health reporting for bridge lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use hostlink_config::BridgeEndpoint;

use crate::transport::ListenerError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before the listener binds.
    fn listener_starting(&self, endpoint: &BridgeEndpoint);

    /// Invoked once the listener thread is running.
    fn listener_ready(&self, address: SocketAddr);

    /// Invoked when binding or spawning the listener fails.
    fn listener_failed(&self, error: &ListenerError);

    /// Invoked when a client connection is accepted.
    fn client_connected(&self, peer: SocketAddr);

    /// Invoked when a client connection ends.
    fn client_disconnected(&self, peer: SocketAddr);

    /// Invoked after the listener thread has been joined.
    fn listener_stopped(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn listener_starting(&self, endpoint: &BridgeEndpoint) {
        (**self).listener_starting(endpoint);
    }

    fn listener_ready(&self, address: SocketAddr) {
        (**self).listener_ready(address);
    }

    fn listener_failed(&self, error: &ListenerError) {
        (**self).listener_failed(error);
    }

    fn client_connected(&self, peer: SocketAddr) {
        (**self).client_connected(peer);
    }

    fn client_disconnected(&self, peer: SocketAddr) {
        (**self).client_disconnected(peer);
    }

    fn listener_stopped(&self) {
        (**self).listener_stopped();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn listener_starting(&self, endpoint: &BridgeEndpoint) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_starting",
            endpoint = %endpoint,
            "starting bridge listener"
        );
    }

    fn listener_ready(&self, address: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_ready",
            address = %address,
            "bridge listener ready"
        );
    }

    fn listener_failed(&self, error: &ListenerError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "listener_failed",
            error = %error,
            "bridge listener failed to start"
        );
    }

    fn client_connected(&self, peer: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "client_connected",
            peer = %peer,
            "client connected"
        );
    }

    fn client_disconnected(&self, peer: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "client_disconnected",
            peer = %peer,
            "client disconnected"
        );
    }

    fn listener_stopped(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_stopped",
            "bridge listener stopped"
        );
    }
}
