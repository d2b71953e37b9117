//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `ChannelError`, so functions can simply return `Result<T>`.
use crate::error::ChannelError;

/// Workspace-wide `Result` alias with `ChannelError` as the default error.
pub type Result<T, E = ChannelError> = std::result::Result<T, E>;
