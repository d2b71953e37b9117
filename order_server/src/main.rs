//! Order-book WebSocket server binary.
//!
//! Listens on `0.0.0.0:9002` by default, answers order requests, and pushes a snapshot of
//! each subscribed symbol every second. Stops on Ctrl+C.
#![warn(missing_docs)]
mod args;

use std::time::Duration;

use clap::Parser;
use crossbeam_channel::bounded;
use log::info;
use order_common::net::addr;
use order_common::{ChannelError, Result};
use order_server::OrderBookServer;

use crate::args::Args;

fn main() -> Result<(), ChannelError> {
    init_logger();
    let args = Args::parse();

    let server = OrderBookServer::bind(&addr("0.0.0.0", args.port))?
        .with_broadcast_interval(Duration::from_millis(args.broadcast_ms));
    let handle = server.start()?;
    info!("Server started on port {}", handle.local_addr().port());

    let (stop_tx, stop_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down server...");
        let _ = stop_tx.try_send(());
    })
    .map_err(|e| ChannelError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;

    let _ = stop_rx.recv();
    handle.join()
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .init();
}
