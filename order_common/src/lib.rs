//!
//! Common types and utilities shared by the order client and the order-book server.
//!
//! This crate aggregates:
//! - `error` — unified error type `ChannelError` used across the workspace.
//! - `result` — handy `Result<T, ChannelError>` alias.
//! - `message` — JSON requests and responses exchanged over the channel.
//! - `endpoint` — parsed `ws://host:port` endpoint.
//! - `state` — connection lifecycle tags.
//! - `net` — networking constants and small helpers.
#![warn(missing_docs)]
pub mod endpoint;
pub mod error;
pub mod message;
pub mod net;
pub mod result;
pub mod state;

pub use endpoint::Endpoint;
pub use error::ChannelError;
pub use message::Request;
pub use result::Result;
pub use state::ConnectionState;
