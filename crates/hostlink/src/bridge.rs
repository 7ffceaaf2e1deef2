//! The embeddable bridge: listener lifecycle around a frozen router.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hostlink_config::{BridgeEndpoint, Config};
use thiserror::Error;
use tracing::info;

use crate::dispatch::{CategoryRouter, CommandConnectionHandler};
use crate::health::HealthReporter;
use crate::transport::{
    BridgeListener, ListenerContext, ListenerError, ListenerHandle, ListenerState, StateCell,
};

const BRIDGE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bridge");

/// Errors surfaced by [`Bridge::start`] and [`Bridge::stop`].
#[derive(Debug, Error)]
pub enum BridgeError {
    /// `start` was called while the listener thread is running.
    #[error("bridge is already listening on {address}")]
    AlreadyRunning {
        /// Address of the running listener.
        address: SocketAddr,
    },
    /// Binding or spawning the listener failed.
    #[error("failed to start bridge listener: {source}")]
    Start {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
    /// The listener thread did not exit cleanly.
    #[error("failed to stop bridge listener: {source}")]
    Stop {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
}

/// Runtime settings for a [`Bridge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    /// Address to bind. Port 0 selects an ephemeral port.
    pub endpoint: BridgeEndpoint,
    /// Upper bound on how long accepts and reads block between stop checks.
    pub poll_interval: Duration,
    /// Longest request line accepted, in bytes.
    pub max_message_bytes: usize,
}

impl BridgeSettings {
    /// Extracts bridge settings from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.endpoint(),
            poll_interval: config.poll_interval(),
            max_message_bytes: config.max_message_bytes(),
        }
    }
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Owns the listener thread and the router it serves.
///
/// A bridge can be started and stopped repeatedly. Each `start` binds a fresh
/// socket and spawns one listener thread; each `stop` joins it.
pub struct Bridge {
    settings: BridgeSettings,
    router: Arc<CategoryRouter>,
    reporter: Arc<dyn HealthReporter>,
    state: Arc<StateCell>,
    listener: Option<ListenerHandle>,
    local_addr: Option<SocketAddr>,
}

impl Bridge {
    /// Builds a stopped bridge.
    #[must_use]
    pub fn new(
        settings: BridgeSettings,
        router: CategoryRouter,
        reporter: Arc<dyn HealthReporter>,
    ) -> Self {
        Self {
            settings,
            router: Arc::new(router),
            reporter,
            state: Arc::new(StateCell::default()),
            listener: None,
            local_addr: None,
        }
    }

    /// Binds the endpoint and spawns the listener thread.
    ///
    /// Returns the bound address, which carries the real port when the
    /// endpoint asked for port 0.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::AlreadyRunning`] when called twice without a
    /// `stop`, and [`BridgeError::Start`] when binding or spawning fails.
    pub fn start(&mut self) -> Result<SocketAddr, BridgeError> {
        if let Some(address) = self.local_addr.filter(|_| self.is_running()) {
            return Err(BridgeError::AlreadyRunning { address });
        }

        self.state.store(ListenerState::Starting);
        self.reporter.listener_starting(&self.settings.endpoint);

        let started = BridgeListener::bind(&self.settings.endpoint).and_then(|bound| {
            let address = bound.local_addr();
            let context = ListenerContext {
                handler: Arc::new(CommandConnectionHandler::new(
                    Arc::clone(&self.router),
                    self.settings.max_message_bytes,
                )),
                reporter: Arc::clone(&self.reporter),
                state: Arc::clone(&self.state),
                poll_interval: self.settings.poll_interval,
            };
            bound.start(context).map(|handle| (handle, address))
        });

        match started {
            Ok((handle, address)) => {
                self.listener = Some(handle);
                self.local_addr = Some(address);
                self.reporter.listener_ready(address);
                Ok(address)
            }
            Err(source) => {
                self.state.store(ListenerState::Stopped);
                self.reporter.listener_failed(&source);
                Err(BridgeError::Start { source })
            }
        }
    }

    /// Signals the listener thread and waits for it to exit.
    ///
    /// Stopping a bridge that is not running is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Stop`] when the listener thread panicked.
    pub fn stop(&mut self) -> Result<(), BridgeError> {
        let Some(handle) = self.listener.take() else {
            return Ok(());
        };
        self.local_addr = None;
        handle.shutdown();
        let joined = handle.join();
        self.state.store(ListenerState::Stopped);
        self.reporter.listener_stopped();
        info!(target: BRIDGE_TARGET, "bridge stopped");
        joined.map_err(|source| BridgeError::Stop { source })
    }

    /// Whether a listener thread is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.listener.is_some()
    }

    /// Current listener lifecycle state.
    #[must_use]
    pub fn state(&self) -> ListenerState {
        self.state.load()
    }

    /// Address bound by the running listener.
    #[must_use]
    pub const fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Router served by this bridge.
    #[must_use]
    pub fn router(&self) -> &CategoryRouter {
        &self.router
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.take() {
            handle.shutdown();
            let _ = handle.join();
            self.state.store(ListenerState::Stopped);
        }
    }
}
