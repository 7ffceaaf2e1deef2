//! Command-line arguments for the `hostlink` client.

use clap::Parser;
use hostlink_config::{BridgeEndpoint, default_endpoint};

/// Default connect and read budget in milliseconds.
pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Sends one command to a running bridge and prints the JSON response.
#[derive(Parser, Debug)]
#[command(name = "hostlink", version)]
pub(crate) struct Cli {
    /// Bridge address as `tcp://host:port`.
    #[arg(long, value_name = "URL", default_value_t = default_endpoint())]
    pub(crate) endpoint: BridgeEndpoint,
    /// Milliseconds to wait for the connection and for the response.
    #[arg(long = "timeout-ms", value_name = "MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub(crate) timeout_ms: u64,
    /// Command name, for example `ping` or `create_graph`.
    #[arg(value_name = "TYPE")]
    pub(crate) command: String,
    /// JSON object passed as the command's `params`.
    #[arg(value_name = "PARAMS_JSON")]
    pub(crate) params: Option<String>,
}
