//! TCP round trip to the bridge.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use hostlink_config::BridgeEndpoint;
use hostlink_protocol::CommandEnvelope;

use crate::errors::AppError;

/// Sends `envelope` and returns the first response line without its
/// terminator.
pub(crate) fn exchange(
    endpoint: &BridgeEndpoint,
    envelope: &CommandEnvelope,
    timeout: Duration,
) -> Result<String, AppError> {
    let mut stream = connect(endpoint, timeout)?;
    stream
        .set_read_timeout(Some(timeout))
        .and_then(|()| stream.set_write_timeout(Some(timeout)))
        .map_err(AppError::SendRequest)?;

    let line = envelope.to_line().map_err(AppError::SerialiseRequest)?;
    stream.write_all(&line).map_err(AppError::SendRequest)?;
    stream.flush().map_err(AppError::SendRequest)?;

    let mut reader = BufReader::new(stream);
    let mut response = String::new();
    let read = reader
        .read_line(&mut response)
        .map_err(AppError::ReadResponse)?;
    if read == 0 {
        return Err(AppError::MissingResponse);
    }
    Ok(response.trim_end_matches(['\r', '\n']).to_owned())
}

fn connect(endpoint: &BridgeEndpoint, timeout: Duration) -> Result<TcpStream, AppError> {
    let display = endpoint.to_string();
    let address = resolve_tcp_address(endpoint.host(), endpoint.port()).map_err(|source| {
        AppError::Resolve {
            endpoint: display.clone(),
            source,
        }
    })?;
    TcpStream::connect_timeout(&address, timeout).map_err(|source| AppError::Connect {
        endpoint: display,
        source,
    })
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    let mut addrs = (host, port).to_socket_addrs()?;
    addrs
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}
