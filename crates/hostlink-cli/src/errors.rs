//! Error types for the client runtime.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("the command type must not be blank")]
    BlankCommand,
    #[error("PARAMS_JSON is not valid JSON: {0}")]
    ParseParams(serde_json::Error),
    #[error("PARAMS_JSON must be a JSON object")]
    ParamsNotObject,
    #[error("failed to resolve bridge address {endpoint}: {source}")]
    Resolve { endpoint: String, source: io::Error },
    #[error("failed to connect to bridge at {endpoint}: {source}")]
    Connect { endpoint: String, source: io::Error },
    #[error("failed to serialise command request: {0}")]
    SerialiseRequest(hostlink_protocol::ProtocolError),
    #[error("failed to send request to bridge: {0}")]
    SendRequest(io::Error),
    #[error("failed to read response from bridge: {0}")]
    ReadResponse(io::Error),
    #[error("bridge closed the connection without responding")]
    MissingResponse,
    #[error("failed to parse bridge response: {0}")]
    ParseResponse(serde_json::Error),
    #[error("failed to write response: {0}")]
    ForwardResponse(io::Error),
}
