//! One accepted connection: handshake, request handling, and pushed snapshots.
//!
//! The session thread owns its socket. It polls for requests with a short read timeout
//! and, between reads, writes whatever the broadcaster queued for it.
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, unbounded};
use log::{debug, info, warn};
use order_common::net::{CLOSE_GRACE, POLL_INTERVAL, is_idle};
use order_common::{ChannelError, Request, Result};
use tungstenite::{Message, WebSocket};

use crate::model::book;
use crate::model::registry::{Registry, SessionId};

/// Upper bound for the opening handshake of a new connection.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Serve one accepted TCP connection until it closes or the server shuts down.
///
/// Performs the WebSocket handshake, registers the session, and runs the read/write
/// loop. The session is always removed from the registry on the way out.
pub(crate) fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<Mutex<Registry>>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;
    let mut ws = tungstenite::accept(stream)
        .map_err(|e| ChannelError::Connection(format!("handshake with {} failed: {}", peer, e)))?;
    ws.get_ref().set_read_timeout(Some(POLL_INTERVAL))?;

    let (outbound_tx, outbound_rx) = unbounded::<String>();
    let id = registry.lock()?.open(outbound_tx);
    info!("Session {} opened for {}", id, peer);

    let result = session_loop(&mut ws, id, &registry, &outbound_rx, &shutdown);

    registry.lock()?.close(id);
    info!("Session {} for {} closed", id, peer);
    result
}

fn session_loop(
    ws: &mut WebSocket<TcpStream>,
    id: SessionId,
    registry: &Mutex<Registry>,
    outbound: &Receiver<String>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut closing_since: Option<Instant> = None;
    let mut peer_closed = false;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            match closing_since {
                None => {
                    debug!("Session {}: server shutting down, sending close", id);
                    closing_since = Some(Instant::now());
                    if ws.close(None).is_err() {
                        return Ok(());
                    }
                }
                Some(since) if since.elapsed() > CLOSE_GRACE => return Ok(()),
                Some(_) => {}
            }
        }

        if closing_since.is_none() && !peer_closed {
            for frame in outbound.try_iter() {
                ws.send(Message::text(frame))?;
            }
        }

        match ws.read() {
            Ok(Message::Text(text)) => {
                let raw = text.as_str();
                registry.lock()?.record(raw);
                let reply = handle_frame(raw, id, registry)?;
                if let (Some(reply), None) = (reply, closing_since) {
                    ws.send(Message::text(reply))?;
                }
            }
            Ok(Message::Close(frame)) => {
                debug!("Session {}: close frame {:?}", id, frame);
                peer_closed = true;
            }
            Ok(_) => {}
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                return Ok(());
            }
            Err(e) if is_idle(&e) => {}
            Err(e) => return Err(e.into()),
        }
    }
}

/// Decode one request, apply its side effects, and build the reply.
///
/// Malformed or unknown requests are logged and ignored so a bad client cannot take its
/// session down.
fn handle_frame(raw: &str, id: SessionId, registry: &Mutex<Registry>) -> Result<Option<String>> {
    let request = match Request::from_json(raw) {
        Ok(request) => request,
        Err(e) => {
            warn!("Session {}: ignoring request {}: {}", id, raw, e);
            return Ok(None);
        }
    };
    debug!("Session {}: {:?}", id, request);

    if let Request::Subscribe(params) = &request {
        registry.lock()?.subscribe(id, &params.symbol);
        info!("Session {} subscribed to {}", id, params.symbol);
    }
    book::respond(&request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_frame_is_ignored() {
        let registry = Mutex::new(Registry::new());
        assert_eq!(handle_frame("{not json", 1, &registry).unwrap(), None);
    }

    #[test]
    fn subscribe_registers_session() {
        let registry = Mutex::new(Registry::new());
        let (tx, _rx) = unbounded();
        let id = registry.lock().unwrap().open(tx);

        let reply = handle_frame(
            r#"{"method":"subscribe","params":{"symbol":"BTC-PERPETUAL"}}"#,
            id,
            &registry,
        )
        .unwrap();

        assert_eq!(reply, None);
        assert_eq!(registry.lock().unwrap().subscriber_count("BTC-PERPETUAL"), 1);
    }
}
