//! Connection lifecycle tags.
//!
//! `Connecting → Open → (Closed | Failed)`. Transitions are driven by the transport; the
//! state is stored in an atomic so it can be read from any thread.
use std::sync::atomic::{AtomicU8, Ordering};

use strum_macros::Display;

/// Lifecycle of a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum ConnectionState {
    /// Handshake in progress.
    Connecting = 0,
    /// Handshake completed; frames may be sent.
    Open = 1,
    /// The channel was closed by either side.
    Closed = 2,
    /// The transport reported an error.
    Failed = 3,
}

impl From<u8> for ConnectionState {
    fn from(value: u8) -> Self {
        match value {
            0 => ConnectionState::Connecting,
            1 => ConnectionState::Open,
            3 => ConnectionState::Failed,
            _ => ConnectionState::Closed,
        }
    }
}

/// Thread-safe holder for a `ConnectionState`.
#[derive(Debug)]
pub struct SharedState(AtomicU8);

impl SharedState {
    /// Creates a holder starting in `initial`.
    pub fn new(initial: ConnectionState) -> Self {
        Self(AtomicU8::new(initial as u8))
    }

    /// Current state.
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from(self.0.load(Ordering::SeqCst))
    }

    /// Unconditionally moves to `state`.
    pub fn set(&self, state: ConnectionState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }
}
