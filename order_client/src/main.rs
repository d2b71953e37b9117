//! Order Client binary. Connects to the order-book server, prints every inbound message,
//! and one second after the channel opens subscribes to `BTC-PERPETUAL`, then one second
//! later places order `ETH-123456`.
//!
//! Usage example (CLI):
//! ```bash
//! order_client --url ws://localhost:9002
//! ```
//!
//! The process exits when the channel closes or fails, or on Ctrl+C.
#![warn(missing_docs)]
mod args;

use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn};
use order_client::script::SCRIPT_INTERVAL;
use order_client::{ChannelClient, ScriptedHandler};
use order_common::{ChannelError, Endpoint, Result};

use crate::args::Args;

fn main() -> Result<(), ChannelError> {
    init_logger();
    let args = Args::parse();
    let endpoint = Endpoint::parse(&args.url)?;

    let handler = Arc::new(ScriptedHandler::new(SCRIPT_INTERVAL));
    let client = ChannelClient::new(handler.clone());
    let channel = client.connect(&endpoint).inspect_err(|e| {
        error!("{}", e);
    })?;

    {
        let channel = channel.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Closing channel...");
            if let Err(e) = channel.close() {
                warn!("Close request failed: {}", e);
            }
        })
        .map_err(|e| ChannelError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;
    }

    info!("Client is running. Press Ctrl+C to exit.");
    channel.wait();

    if let Some(outcome) = handler.join_script()? {
        info!("Scripted sequence finished: {:?}", outcome);
    }
    info!("Channel to {} ended in state {}", endpoint, channel.state());
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .init();
}
