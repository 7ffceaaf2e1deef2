//! Wire types shared by the hostlink bridge and its clients.
//!
//! Every message on the bridge socket is a single UTF-8 JSON document
//! terminated by `\n`. Clients send a [`CommandEnvelope`] and receive exactly
//! one [`ResponseEnvelope`] before the next request is read. The
//! [`LineFramer`] splits an incoming byte stream into those lines while
//! bounding how much a misbehaving peer can make the server buffer.

mod command;
mod errors;
mod framing;
mod response;

pub use command::CommandEnvelope;
pub use errors::ProtocolError;
pub use framing::{DEFAULT_MAX_LINE_BYTES, Frame, LineFramer};
pub use response::{ResponseEnvelope, ResponseWriter};

/// JSON object used for command parameters and response payloads.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;
