//! Order Client — a WebSocket client that keeps one channel open to an order-book server,
//! logs every inbound message, and runs a short scripted sequence once the channel opens.
//!
//! Modules:
//! - `channel` — `ChannelClient` / `ChannelHandle`: connect, receive loop, send, close.
//! - `handler` — `EventHandler` hooks and the stock handlers.
//! - `script` — the delayed subscribe/place sequence run after open.
#![warn(missing_docs)]
pub mod channel;
pub mod handler;
pub mod script;

pub use channel::{ChannelClient, ChannelHandle};
pub use handler::{EventHandler, LoggingHandler, ScriptedHandler};
pub use script::{Script, ScriptOutcome, ScriptStep};
