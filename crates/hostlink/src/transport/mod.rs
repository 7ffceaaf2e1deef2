//! TCP listener for the bridge.
//!
//! A single background thread accepts connections and serves each one to
//! completion before accepting the next. Accepts and reads are polled so the
//! thread notices a shutdown request within one poll interval.

mod errors;
mod handler;
mod listener;
mod state;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub(crate) use self::handler::ConnectionHandler;
pub(crate) use self::listener::{BridgeListener, ListenerContext, ListenerHandle};
pub use self::state::ListenerState;
pub(crate) use self::state::StateCell;
#[cfg(test)]
pub(crate) use self::test_utils::CountingHandler;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
