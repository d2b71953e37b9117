//! Shared networking constants and helpers used by client and server.
use std::io::ErrorKind;
use std::time::Duration;

/// Port the order-book server listens on by default.
pub const DEFAULT_PORT: u16 = 9002;
/// Endpoint the client connects to when none is given.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:9002";
/// Read timeout used by socket loops so that queued writes and shutdown flags are
/// serviced between inbound frames.
pub const POLL_INTERVAL: Duration = Duration::from_millis(20);
/// How long either side waits for the peer to answer a close frame before dropping the
/// connection anyway.
pub const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Helper to format an address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}

/// Returns `true` when a WebSocket read failed only because the poll timeout elapsed.
///
/// Depending on the platform an expired read timeout surfaces as `WouldBlock` or
/// `TimedOut`; both mean "nothing arrived yet".
pub fn is_idle(err: &tungstenite::Error) -> bool {
    match err {
        tungstenite::Error::Io(e) => {
            matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
        }
        _ => false,
    }
}
