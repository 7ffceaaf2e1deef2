//! Newline framing for the bridge byte stream.
//!
//! The framer accumulates bytes as they arrive and yields complete lines. Bytes
//! following a complete line stay buffered until the caller asks for the next
//! frame, which keeps exactly one request in flight per connection. Blank
//! lines are skipped. A line longer than the limit is reported once and the
//! remainder up to the next newline is discarded without being buffered.

/// Default maximum size of a single request line (1 MiB).
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Output of the framer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete, non-blank line without its terminator.
    Line(Vec<u8>),
    /// A line exceeded the limit and is being dropped.
    Oversized {
        /// Number of bytes seen when the line was rejected.
        size: usize,
    },
}

/// Incremental splitter for newline-delimited messages.
#[derive(Debug)]
pub struct LineFramer {
    buffer: Vec<u8>,
    scanned: usize,
    max_line_bytes: usize,
    discarding: bool,
}

impl LineFramer {
    /// Creates a framer that rejects lines longer than `max_line_bytes`.
    #[must_use]
    pub const fn new(max_line_bytes: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            max_line_bytes,
            discarding: false,
        }
    }

    /// Appends bytes read from the stream.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Returns the next complete frame, or `None` when more bytes are needed.
    pub fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let newline = self.find_newline();
            if self.discarding {
                let Some(position) = newline else {
                    self.clear();
                    return None;
                };
                self.take_through(position);
                self.discarding = false;
                continue;
            }

            let Some(position) = newline else {
                if self.buffer.len() > self.max_line_bytes {
                    let size = self.buffer.len();
                    self.clear();
                    self.discarding = true;
                    return Some(Frame::Oversized { size });
                }
                return None;
            };

            let mut line = self.take_through(position);
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if let Some(frame) = self.classify(line) {
                return Some(frame);
            }
        }
    }

    /// Flushes a final unterminated line once the peer has closed its side.
    pub fn finish(&mut self) -> Option<Frame> {
        self.scanned = 0;
        if self.discarding {
            self.discarding = false;
            self.buffer.clear();
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        self.classify(line)
    }

    /// Finds the first newline, searching only bytes not yet scanned.
    fn find_newline(&mut self) -> Option<usize> {
        let unscanned = self.buffer.get(self.scanned..).unwrap_or_default();
        if let Some(offset) = unscanned.iter().position(|byte| *byte == b'\n') {
            return Some(self.scanned + offset);
        }
        self.scanned = self.buffer.len();
        None
    }

    fn take_through(&mut self, position: usize) -> Vec<u8> {
        self.scanned = 0;
        self.buffer.drain(..=position).collect()
    }

    fn clear(&mut self) {
        self.scanned = 0;
        self.buffer.clear();
    }

    fn classify(&self, line: Vec<u8>) -> Option<Frame> {
        if line.len() > self.max_line_bytes {
            return Some(Frame::Oversized { size: line.len() });
        }
        if line.trim_ascii().is_empty() {
            return None;
        }
        Some(Frame::Line(line))
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_BYTES)
    }
}
