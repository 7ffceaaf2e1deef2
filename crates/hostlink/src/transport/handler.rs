//! Connection handling abstraction for the listener.

use std::net::TcpStream;
use std::sync::atomic::AtomicBool;

/// Serves one accepted connection on the listener thread.
///
/// The stream arrives in blocking mode with a read timeout of one poll
/// interval. Implementations must return promptly once `shutdown` is set and
/// should avoid panicking.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Serves the connection until the peer disconnects or shutdown begins.
    fn handle(&self, stream: TcpStream, shutdown: &AtomicBool);
}
