//! Shared configuration for the hostlink bridge and its command-line client.
//!
//! Values are layered by `ortho_config`: built-in defaults, then an optional
//! configuration file (`--config-path` or `HOSTLINK_CONFIG_PATH`), then
//! `HOSTLINK_*` environment variables, then command-line flags.

mod defaults;
mod endpoint;
mod logging;

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_BIND_HOST, DEFAULT_HOST_CALL_TIMEOUT_MS, DEFAULT_LOG_FILTER,
    DEFAULT_MAX_MESSAGE_BYTES, DEFAULT_POLL_INTERVAL_MS, DEFAULT_PORT, default_bind_host,
    default_endpoint, default_log_filter, default_log_filter_string, default_log_format,
    default_poll_interval,
};
pub use endpoint::{BridgeEndpoint, EndpointParseError};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime settings for the bridge process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "HOSTLINK")]
pub struct Config {
    /// Interface the listener binds to.
    #[ortho_config(default = defaults::default_bind_host())]
    pub bind_host: String,
    /// TCP port the listener binds to.
    #[ortho_config(default = defaults::DEFAULT_PORT)]
    pub port: u16,
    /// Milliseconds between stop-flag checks while accepting or reading.
    #[ortho_config(default = defaults::DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,
    /// Largest accepted request line in bytes.
    #[ortho_config(default = defaults::DEFAULT_MAX_MESSAGE_BYTES)]
    pub max_message_bytes: usize,
    /// Milliseconds a handler waits for the host main loop.
    #[ortho_config(default = defaults::DEFAULT_HOST_CALL_TIMEOUT_MS)]
    pub host_call_timeout_ms: u64,
    /// `tracing` filter directive.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log records.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
}

impl Config {
    /// Endpoint assembled from the bind host and port.
    #[must_use]
    pub fn endpoint(&self) -> BridgeEndpoint {
        BridgeEndpoint::new(self.bind_host.clone(), self.port)
    }

    /// Accept and read poll interval. Zero is raised to one millisecond so the
    /// listener never spins.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Upper bound on a single host main-loop call.
    #[must_use]
    pub const fn host_call_timeout(&self) -> Duration {
        Duration::from_millis(self.host_call_timeout_ms)
    }

    /// Largest accepted request line in bytes.
    #[must_use]
    pub const fn max_message_bytes(&self) -> usize {
        self.max_message_bytes
    }

    /// Configured log filter.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            port: DEFAULT_PORT,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            host_call_timeout_ms: DEFAULT_HOST_CALL_TIMEOUT_MS,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}
