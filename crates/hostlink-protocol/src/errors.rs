//! Error types for decoding and encoding bridge messages.

use std::io;

use thiserror::Error;

/// Errors surfaced while reading, decoding, or writing bridge messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The line could not be parsed as JSON.
    #[error("malformed JSON: {message}")]
    MalformedJson {
        /// Description of the parse failure.
        message: String,
        /// Underlying parser error, when one exists.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The JSON document does not have the command envelope shape.
    #[error("invalid request structure: {message}")]
    InvalidStructure {
        /// Description of the structural problem.
        message: String,
    },

    /// The request line exceeds the configured size limit.
    #[error("request too large: {size} bytes exceeds {max_size} byte limit")]
    RequestTooLarge {
        /// Number of bytes observed before the line was rejected.
        size: usize,
        /// Configured limit.
        max_size: usize,
    },

    /// IO error during read or write.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A message could not be serialized.
    #[error("failed to serialize message: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl ProtocolError {
    /// Creates a malformed JSON error without an underlying parser error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedJson {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a malformed JSON error from a `serde_json` parse failure.
    #[must_use]
    pub fn from_json_error(error: serde_json::Error) -> Self {
        Self::MalformedJson {
            message: error.to_string(),
            source: Some(error),
        }
    }

    /// Creates an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    /// Creates a request-too-large error.
    #[must_use]
    pub const fn request_too_large(size: usize, max_size: usize) -> Self {
        Self::RequestTooLarge { size, max_size }
    }
}
