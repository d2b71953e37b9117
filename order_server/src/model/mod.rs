//! Domain models and utilities for the order-book server.
//!
//! - `book` — static order-book/position data and request replies.
//! - `registry` — in-memory session, subscription, and journal tracker.

pub mod book;
pub mod registry;
