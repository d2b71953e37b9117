//! Error types shared between client and server.
//!
//! The `ChannelError` enum unifies the failure cases of a message channel: connecting,
//! sending on a channel that is not open, transport failures, serialization, and
//! internal synchronization, allowing crates to propagate a single error type.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by client and server.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// I/O error originating from sockets or the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// The endpoint string is not a usable `ws://` or `wss://` URI.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The initial connect failed (unreachable host or rejected handshake).
    #[error("Connection error: {0}")]
    Connection(String),

    /// A send was attempted while the channel was not open.
    #[error("Channel is not connected")]
    NotConnected,

    /// Writing to an open channel failed at the transport level.
    #[error("Send error: {0}")]
    Send(String),

    /// Failure reported by the WebSocket transport while the channel was running.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl<T> From<PoisonError<T>> for ChannelError {
    fn from(err: PoisonError<T>) -> Self {
        ChannelError::MutexLock(err.to_string())
    }
}

impl From<url::ParseError> for ChannelError {
    fn from(err: url::ParseError) -> Self {
        ChannelError::InvalidEndpoint(err.to_string())
    }
}
