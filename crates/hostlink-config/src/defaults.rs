use std::time::Duration;

use crate::endpoint::BridgeEndpoint;
use crate::logging::LogFormat;

/// Interface the bridge binds to unless configured otherwise.
pub const DEFAULT_BIND_HOST: &str = "127.0.0.1";

/// TCP port the bridge listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 55557;

/// Interval between stop-flag checks while accepting or reading.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Maximum size of a single request line (1 MiB).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Longest a handler waits for the host main loop to run its task.
pub const DEFAULT_HOST_CALL_TIMEOUT_MS: u64 = 10_000;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned bind host value used where allocation is required (e.g. serde).
pub fn default_bind_host() -> String {
    DEFAULT_BIND_HOST.to_owned()
}

/// Default log filter expression used by the binaries.
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Endpoint the bridge binds to with no configuration at all.
pub fn default_endpoint() -> BridgeEndpoint {
    BridgeEndpoint::new(DEFAULT_BIND_HOST, DEFAULT_PORT)
}

/// Default accept and read poll interval.
pub const fn default_poll_interval() -> Duration {
    Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
}
