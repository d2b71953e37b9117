//! Order-book WebSocket server.
//!
//! A small demo exchange front end: clients connect over WebSocket, subscribe to symbols,
//! and send order requests. Internally it wires together:
//!
//! - `OrderBookServer` — owns the listening socket and starts the accept and broadcast
//!   threads; `ServerHandle` stops and inspects a running server.
//! - Per‑connection session thread — reads JSON requests, answers them, and writes any
//!   broadcast frames queued for that connection.
//! - `Registry` — shared session/subscription bookkeeping and the journal of received
//!   frames, behind an `Arc<Mutex<_>>`.
//!
//! Requests follow `{"method": ..., "params": {...}}`; see `order_common::message`.
#![warn(missing_docs)]
pub mod model;
pub mod server;
mod session;

pub use server::{OrderBookServer, ServerHandle};
