//! Event hooks invoked by the receive loop.
//!
//! Hooks run on the channel's receive thread, so they must return quickly: anything that
//! waits (like the scripted sequence) is handed to its own thread.
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{error, info};
use order_common::{ChannelError, Result};

use crate::channel::ChannelHandle;
use crate::script::{Script, ScriptOutcome};

/// Lifecycle and message hooks for a channel.
///
/// Every hook has a logging default, so implementors only override what they need.
pub trait EventHandler: Send + Sync {
    /// Called exactly once, after the handshake and before any inbound message.
    fn on_open(&self, channel: &ChannelHandle) {
        info!("Connected to {}", channel.endpoint());
    }

    /// Called for every inbound text frame, in arrival order, with the payload untouched.
    fn on_message(&self, raw: &str) {
        info!("Received: {}", raw);
    }

    /// Called when the transport fails; `on_close` follows.
    fn on_error(&self, err: &ChannelError) {
        error!("Error: {}", err);
    }

    /// Called once when the receive loop ends, whatever the reason.
    fn on_close(&self) {
        info!("Connection closed");
    }
}

/// Observe-only handler: logs everything and never sends.
#[derive(Debug, Default)]
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {}

/// Logs like [`LoggingHandler`] and starts the post-open [`Script`] when the channel opens.
pub struct ScriptedHandler {
    interval: Duration,
    script: Mutex<Option<JoinHandle<ScriptOutcome>>>,
}

impl ScriptedHandler {
    /// Creates a handler whose script waits `interval` before each send.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            script: Mutex::new(None),
        }
    }

    /// Waits for the script thread, if one was started, and returns its outcome.
    pub fn join_script(&self) -> Result<Option<ScriptOutcome>> {
        let Some(thread) = self.script.lock()?.take() else {
            return Ok(None);
        };
        thread
            .join()
            .map(Some)
            .map_err(|_| ChannelError::Format("script thread panicked".into()))
    }
}

impl EventHandler for ScriptedHandler {
    fn on_open(&self, channel: &ChannelHandle) {
        info!("Connected to {}", channel.endpoint());
        match Script::post_open(self.interval).spawn(channel.clone()) {
            Ok(thread) => match self.script.lock() {
                Ok(mut slot) => *slot = Some(thread),
                Err(e) => error!("Script handle lost: {}", e),
            },
            Err(e) => error!("Failed to start scripted sequence: {}", e),
        }
    }
}
