//! Command-line arguments for the Order Client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use order_common::net::DEFAULT_ENDPOINT;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// WebSocket endpoint of the order-book server.
    #[clap(long, default_value = DEFAULT_ENDPOINT)]
    pub url: String,
}
