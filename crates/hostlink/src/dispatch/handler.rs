//! Connection worker that serves newline-delimited JSON commands.
//!
//! The worker loops read, decode, route, and write for as long as the client
//! stays connected. Exactly one request is in flight: a response is written
//! and flushed before the next buffered line is framed. Malformed lines are
//! answered with a failure envelope and do not end the connection.
//!
//! Reads and writes both time out after the poll interval. A write that keeps
//! timing out because the peer is not reading is retried until shutdown is
//! requested, at which point the connection is abandoned.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hostlink_protocol::{
    CommandEnvelope, Frame, LineFramer, ProtocolError, ResponseEnvelope, ResponseWriter,
};
use tracing::{debug, error, warn};

use crate::result::{CommandError, ErrorCode};
use crate::transport::ConnectionHandler;

use super::DISPATCH_TARGET;
use super::router::CategoryRouter;

const READ_CHUNK_BYTES: usize = 8 * 1024;

/// Serves bridge commands over one connection at a time.
#[derive(Debug, Clone)]
pub(crate) struct CommandConnectionHandler {
    router: Arc<CategoryRouter>,
    max_message_bytes: usize,
}

impl CommandConnectionHandler {
    pub(crate) const fn new(router: Arc<CategoryRouter>, max_message_bytes: usize) -> Self {
        Self {
            router,
            max_message_bytes,
        }
    }

    /// Runs the request loop on any blocking stream whose reads and writes
    /// time out.
    pub(crate) fn serve<S: Read + Write>(&self, stream: &mut S, shutdown: &AtomicBool) {
        let mut framer = LineFramer::new(self.max_message_bytes);
        let mut chunk = vec![0_u8; READ_CHUNK_BYTES];

        loop {
            while let Some(frame) = framer.next_frame() {
                if let Err(error) = self.answer(stream, shutdown, frame) {
                    warn!(target: DISPATCH_TARGET, %error, "failed to write response");
                    return;
                }
                if shutdown.load(Ordering::SeqCst) {
                    return;
                }
            }
            if shutdown.load(Ordering::SeqCst) {
                debug!(target: DISPATCH_TARGET, "closing connection for shutdown");
                return;
            }

            match read_chunk(stream, &mut chunk) {
                Ok(ReadOutcome::Data(read)) => framer.push(chunk.get(..read).unwrap_or_default()),
                Ok(ReadOutcome::Idle) => {}
                Ok(ReadOutcome::Closed) => {
                    if let Some(frame) = framer.finish()
                        && let Err(error) = self.answer(stream, shutdown, frame)
                    {
                        debug!(target: DISPATCH_TARGET, %error, "peer closed before final reply");
                    }
                    return;
                }
                Err(error) => {
                    warn!(target: DISPATCH_TARGET, %error, "failed to read request");
                    return;
                }
            }
        }
    }

    fn answer<S: Write>(
        &self,
        stream: &mut S,
        shutdown: &AtomicBool,
        frame: Frame,
    ) -> Result<(), ProtocolError> {
        let response = self.respond_to(frame);
        ResponseWriter::new(StopAwareWriter { stream, shutdown }).write_response(&response)
    }

    fn respond_to(&self, frame: Frame) -> ResponseEnvelope {
        let line = match frame {
            Frame::Line(line) => line,
            Frame::Oversized { size } => {
                let error = ProtocolError::request_too_large(size, self.max_message_bytes);
                warn!(target: DISPATCH_TARGET, %error, "rejected request");
                return ResponseEnvelope::failure(error.to_string());
            }
        };
        let envelope = match CommandEnvelope::parse(&line) {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "malformed request");
                return ResponseEnvelope::failure(error.to_string());
            }
        };
        self.dispatch(&envelope)
    }

    fn dispatch(&self, envelope: &CommandEnvelope) -> ResponseEnvelope {
        let name = envelope.command_type();
        debug!(target: DISPATCH_TARGET, command = name, "dispatching request");
        let routed = panic::catch_unwind(AssertUnwindSafe(|| {
            self.router.route(name, envelope.params())
        }));
        routed.unwrap_or_else(|_| {
            error!(target: DISPATCH_TARGET, command = name, "command handler panicked");
            let failure = CommandError::new(ErrorCode::OperationFailed)
                .with_context(name)
                .with_details("handler panicked");
            ResponseEnvelope::failure(failure.to_string())
        })
    }
}

impl ConnectionHandler for CommandConnectionHandler {
    fn handle(&self, mut stream: TcpStream, shutdown: &AtomicBool) {
        self.serve(&mut stream, shutdown);
    }
}

/// Retries timed-out writes until shutdown is requested.
struct StopAwareWriter<'a, S> {
    stream: &'a mut S,
    shutdown: &'a AtomicBool,
}

impl<S: Write> StopAwareWriter<'_, S> {
    fn retry<T>(&mut self, mut op: impl FnMut(&mut S) -> io::Result<T>) -> io::Result<T> {
        loop {
            match op(&mut *self.stream) {
                Err(error) if is_timeout(&error) => {
                    if self.shutdown.load(Ordering::SeqCst) {
                        return Err(io::Error::new(
                            io::ErrorKind::ConnectionAborted,
                            "shutdown requested while the peer was not reading",
                        ));
                    }
                }
                result => return result,
            }
        }
    }
}

impl<S: Write> Write for StopAwareWriter<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.retry(|stream| stream.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.retry(|stream| stream.flush())
    }
}

enum ReadOutcome {
    Data(usize),
    Idle,
    Closed,
}

/// Reads one chunk, retrying on interrupts and mapping read timeouts to idle.
fn read_chunk<S: Read>(stream: &mut S, buf: &mut [u8]) -> io::Result<ReadOutcome> {
    loop {
        match stream.read(buf) {
            Ok(0) => return Ok(ReadOutcome::Closed),
            Ok(read) => return Ok(ReadOutcome::Data(read)),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) if is_timeout(&error) => return Ok(ReadOutcome::Idle),
            Err(error) => return Err(error),
        }
    }
}

fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
