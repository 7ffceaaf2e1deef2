//! Listener implementation for the bridge TCP endpoint.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use hostlink_config::BridgeEndpoint;
use tracing::{debug, info, warn};

use crate::health::HealthReporter;

use super::{ConnectionHandler, LISTENER_TARGET, ListenerError, ListenerState, StateCell};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Bound, not yet running listener.
#[derive(Debug)]
pub(crate) struct BridgeListener {
    endpoint: BridgeEndpoint,
    listener: TcpListener,
    local_addr: SocketAddr,
}

/// Collaborators the listener thread reports to.
pub(crate) struct ListenerContext {
    pub(crate) handler: Arc<dyn ConnectionHandler>,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) state: Arc<StateCell>,
    pub(crate) poll_interval: Duration,
}

impl BridgeListener {
    pub(crate) fn bind(endpoint: &BridgeEndpoint) -> Result<Self, ListenerError> {
        let listener = bind_tcp(endpoint.host(), endpoint.port())?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ListenerError::LocalAddr { source })?;
        Ok(Self {
            endpoint: endpoint.clone(),
            listener,
            local_addr,
        })
    }

    /// Address actually bound, which differs from the endpoint for port 0.
    pub(crate) const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub(crate) fn start(self, context: ListenerContext) -> Result<ListenerHandle, ListenerError> {
        self.listener
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);
        let state = Arc::clone(&context.state);
        state.store(ListenerState::Listening);
        let spawned = thread::Builder::new()
            .name(String::from("hostlink-listener"))
            .spawn(move || run_accept_loop(&self, &shutdown_flag, &context));
        match spawned {
            Ok(handle) => Ok(ListenerHandle {
                shutdown,
                handle: Some(handle),
            }),
            Err(source) => {
                state.store(ListenerState::Stopped);
                Err(ListenerError::Spawn { source })
            }
        }
    }
}

/// Handle to the background listener thread.
pub(crate) struct ListenerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub(crate) fn join(mut self) -> Result<(), ListenerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| ListenerError::ThreadPanic),
            None => Ok(()),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

fn run_accept_loop(listener: &BridgeListener, shutdown: &AtomicBool, context: &ListenerContext) {
    info!(
        target: LISTENER_TARGET,
        endpoint = %listener.endpoint,
        address = %listener.local_addr,
        "bridge listener active"
    );
    let idle_wait = context.poll_interval.min(ACCEPT_BACKOFF);
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.load(Ordering::SeqCst) {
        match listener.listener.accept() {
            Ok((stream, peer)) => {
                last_error = None;
                serve_connection(stream, peer, shutdown, context);
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(idle_wait);
            }
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "socket accept error"
                    );
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF.min(context.poll_interval));
            }
        }
    }
    context.state.store(ListenerState::Stopped);
    info!(target: LISTENER_TARGET, "bridge listener stopped");
}

fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    shutdown: &AtomicBool,
    context: &ListenerContext,
) {
    if let Err(error) = prepare_stream(&stream, context.poll_interval) {
        warn!(
            target: LISTENER_TARGET,
            error = %error,
            peer = %peer,
            "failed to configure client stream"
        );
        return;
    }
    context.state.store(ListenerState::Serving);
    context.reporter.client_connected(peer);
    context.handler.handle(stream, shutdown);
    context.reporter.client_disconnected(peer);
    debug!(target: LISTENER_TARGET, peer = %peer, "connection closed");
    context.state.store(ListenerState::Listening);
}

fn prepare_stream(stream: &TcpStream, poll_interval: Duration) -> io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(poll_interval))?;
    stream.set_write_timeout(Some(poll_interval))?;
    stream.set_nodelay(true)
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;
    let addr = addrs
        .find(|addr| matches!(addr, SocketAddr::V4(_) | SocketAddr::V6(_)))
        .ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })?;
    TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })
}
