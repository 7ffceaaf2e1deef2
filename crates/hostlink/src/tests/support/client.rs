//! Line-oriented TCP client used to drive a running bridge.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use serde_json::Value;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Persistent connection that sends one line and reads one reply at a time.
pub struct TestClient {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
}

impl TestClient {
    /// Connects to the bridge at `address`.
    pub fn connect(address: SocketAddr) -> Self {
        let writer = TcpStream::connect(address).expect("connect to bridge");
        writer
            .set_read_timeout(Some(READ_TIMEOUT))
            .expect("set read timeout");
        let reader = BufReader::new(writer.try_clone().expect("clone stream"));
        Self { writer, reader }
    }

    /// Writes raw bytes without adding a terminator.
    pub fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).expect("write request");
        self.writer.flush().expect("flush request");
    }

    /// Reads one response line and parses it.
    pub fn read_response(&mut self) -> Value {
        let mut line = String::new();
        self.reader.read_line(&mut line).expect("read response");
        assert!(line.ends_with('\n'), "response must be newline-terminated: {line:?}");
        serde_json::from_str(&line).expect("response is JSON")
    }

    /// Releases the underlying connection without closing it.
    pub fn into_stream(self) -> TcpStream {
        self.writer
    }

    /// Sends `{"type": command, "params": params}` and waits for the reply.
    pub fn request(&mut self, command: &str, params: Value) -> Value {
        let request = serde_json::json!({ "type": command, "params": params });
        let mut line = request.to_string();
        line.push('\n');
        self.send_raw(line.as_bytes());
        self.read_response()
    }
}
