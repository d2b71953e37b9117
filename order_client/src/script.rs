//! Scripted post-open sequence.
//!
//! After the channel opens the client waits one interval, subscribes to
//! `BTC-PERPETUAL`, waits another interval, and places order `ETH-123456`. The script
//! runs on its own thread and watches the channel's `closed` receiver while it waits, so
//! a channel that goes away mid-script abandons the remaining steps instead of sending
//! into a dead socket.
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::select;
use log::{error, info, warn};
use order_common::{ChannelError, Request, Result};

use crate::channel::ChannelHandle;

/// Wait before each scripted send.
pub const SCRIPT_INTERVAL: Duration = Duration::from_secs(1);
/// Symbol subscribed to by the script.
pub const SUBSCRIBE_SYMBOL: &str = "BTC-PERPETUAL";
/// Order placed by the script.
pub const ORDER_ID: &str = "ETH-123456";
/// Size of the scripted order.
pub const ORDER_AMOUNT: u64 = 2;
/// Limit price of the scripted order.
pub const ORDER_PRICE: u64 = 1000;

/// A wait followed by a send.
#[derive(Debug, Clone)]
pub struct ScriptStep {
    /// How long to wait before sending.
    pub delay: Duration,
    /// What to send.
    pub request: Request,
}

/// How a script run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// Every step was sent.
    Completed {
        /// Number of requests sent.
        sent: usize,
    },
    /// The channel closed or a send failed; later steps were skipped.
    Abandoned {
        /// Number of requests sent before giving up.
        sent: usize,
    },
}

/// Ordered list of delayed sends.
#[derive(Debug, Clone)]
pub struct Script {
    steps: Vec<ScriptStep>,
}

impl Script {
    /// Builds a script from explicit steps.
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self { steps }
    }

    /// The fixed post-open sequence: subscribe, then place, each after `interval`.
    pub fn post_open(interval: Duration) -> Self {
        Self::new(vec![
            ScriptStep {
                delay: interval,
                request: Request::subscribe(SUBSCRIBE_SYMBOL),
            },
            ScriptStep {
                delay: interval,
                request: Request::place(ORDER_ID, ORDER_AMOUNT, ORDER_PRICE),
            },
        ])
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    /// Runs the steps in order on the calling thread.
    pub fn run(&self, channel: &ChannelHandle) -> ScriptOutcome {
        for (sent, step) in self.steps.iter().enumerate() {
            let method = step.request.method();
            select! {
                recv(channel.closed()) -> _ => {
                    info!("Channel closed before '{}' was due; abandoning script", method);
                    return ScriptOutcome::Abandoned { sent };
                },
                default(step.delay) => {},
            }

            match channel.send(&step.request) {
                Ok(()) => info!("Sent '{}' request", method),
                Err(ChannelError::NotConnected) => {
                    warn!("Discarding '{}' request: channel is not connected", method);
                    return ScriptOutcome::Abandoned { sent };
                }
                Err(e) => {
                    error!("Failed to send '{}' request: {}", method, e);
                    return ScriptOutcome::Abandoned { sent };
                }
            }
        }
        ScriptOutcome::Completed {
            sent: self.steps.len(),
        }
    }

    /// Runs the script on a dedicated thread.
    pub fn spawn(self, channel: ChannelHandle) -> Result<JoinHandle<ScriptOutcome>> {
        let thread = thread::Builder::new()
            .name("channel-script".into())
            .spawn(move || self.run(&channel))?;
        Ok(thread)
    }
}
