//! Observable listener lifecycle state.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of the bridge listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerState {
    /// No socket is bound and no thread runs.
    Stopped,
    /// The socket is being bound and the thread spawned.
    Starting,
    /// Waiting for a client to connect.
    Listening,
    /// A client is connected and being served.
    Serving,
}

impl ListenerState {
    const fn to_raw(self) -> u8 {
        match self {
            Self::Stopped => 0,
            Self::Starting => 1,
            Self::Listening => 2,
            Self::Serving => 3,
        }
    }

    const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Starting,
            2 => Self::Listening,
            3 => Self::Serving,
            _ => Self::Stopped,
        }
    }
}

impl fmt::Display for ListenerState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Listening => "listening",
            Self::Serving => "serving",
        };
        formatter.write_str(name)
    }
}

/// Lock-free cell shared between the bridge and its listener thread.
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) const fn new(state: ListenerState) -> Self {
        Self(AtomicU8::new(state.to_raw()))
    }

    pub(crate) fn load(&self) -> ListenerState {
        ListenerState::from_raw(self.0.load(Ordering::SeqCst))
    }

    pub(crate) fn store(&self, state: ListenerState) {
        self.0.store(state.to_raw(), Ordering::SeqCst);
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new(ListenerState::Stopped)
    }
}
