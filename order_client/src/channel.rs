//! One WebSocket channel to a remote endpoint.
//!
//! `ChannelClient::connect` performs the handshake and hands the socket to a background
//! receive thread. That thread is the only owner of the socket: it polls for inbound
//! frames with a short read timeout and, between reads, drains a queue of outbound
//! commands. Sends issued from other threads therefore never contend with reads and never
//! stall inbound delivery.
//!
//! Lifecycle: `Connecting → Open → (Closed | Failed)`. When the receive loop ends it
//! drops the sender half of the `closed` channel, which wakes anyone waiting on
//! [`ChannelHandle::closed`] or [`ChannelHandle::wait`].
use std::net::TcpStream;
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use log::{debug, error, info, warn};
use order_common::net::{CLOSE_GRACE, POLL_INTERVAL, is_idle};
use order_common::state::SharedState;
use order_common::{ChannelError, ConnectionState, Endpoint, Request, Result};
use tungstenite::error::ProtocolError;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use crate::handler::EventHandler;

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

/// Work queued for the receive thread.
enum Outbound {
    Frame {
        text: String,
        reply: Option<Sender<Result<()>>>,
    },
    Close,
}

enum LoopExit {
    Closed,
    Failed(ChannelError),
}

struct Shared {
    endpoint: Endpoint,
    state: SharedState,
    commands: Sender<Outbound>,
    closed: Receiver<()>,
    receive_thread: OnceLock<ThreadId>,
}

/// Connects channels and wires them to an [`EventHandler`].
pub struct ChannelClient {
    handler: Arc<dyn EventHandler>,
}

impl ChannelClient {
    /// Creates a client that dispatches lifecycle events to `handler`.
    pub fn new(handler: Arc<dyn EventHandler>) -> Self {
        Self { handler }
    }

    /// Opens a channel to `endpoint`.
    ///
    /// Blocks until the WebSocket handshake completes. On success the receive loop is
    /// running and `on_open` is the first hook it calls. Unreachable hosts and rejected
    /// handshakes yield `ChannelError::Connection`; nothing is retried.
    pub fn connect(&self, endpoint: &Endpoint) -> Result<ChannelHandle> {
        let state = SharedState::new(ConnectionState::Connecting);
        info!("Connecting to {}", endpoint);

        let (socket, response) = tungstenite::connect(endpoint.as_str())
            .map_err(|e| ChannelError::Connection(format!("{}: {}", endpoint, e)))?;
        debug!("Handshake with {} answered {}", endpoint, response.status());

        match socket.get_ref() {
            MaybeTlsStream::Plain(stream) => stream.set_read_timeout(Some(POLL_INTERVAL))?,
            _ => {
                return Err(ChannelError::Connection(format!(
                    "{}: only plain ws:// transports are supported",
                    endpoint
                )));
            }
        }

        let (commands_tx, commands_rx) = unbounded::<Outbound>();
        let (closed_tx, closed_rx) = bounded::<()>(0);
        state.set(ConnectionState::Open);

        let handle = ChannelHandle {
            shared: Arc::new(Shared {
                endpoint: endpoint.clone(),
                state,
                commands: commands_tx,
                closed: closed_rx,
                receive_thread: OnceLock::new(),
            }),
        };

        let loop_handle = handle.clone();
        let handler = Arc::clone(&self.handler);
        thread::Builder::new()
            .name("channel-recv".into())
            .spawn(move || receive_loop(socket, loop_handle, commands_rx, handler, closed_tx))?;

        Ok(handle)
    }
}

/// Cheap, cloneable reference to an open channel.
///
/// Every clone talks to the same receive thread; `send` and `close` are safe to call
/// from any thread.
#[derive(Clone)]
pub struct ChannelHandle {
    shared: Arc<Shared>,
}

impl ChannelHandle {
    /// Endpoint this channel was opened against.
    pub fn endpoint(&self) -> &Endpoint {
        &self.shared.endpoint
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state.get()
    }

    /// Serializes `request` and writes it as one text frame.
    ///
    /// Returns `NotConnected` without touching the wire when the channel is not open, and
    /// `Send` when the transport rejects the write.
    pub fn send(&self, request: &Request) -> Result<()> {
        self.ensure_open()?;
        let text = request.to_json()?;
        debug!("Sending {}", text);
        self.send_text(text)
    }

    /// Writes a raw text frame.
    ///
    /// Called from another thread, this blocks until the receive loop has written the
    /// frame and reports the transport's result. Called from inside an event hook (that
    /// is, on the receive thread itself) the frame is queued and written once the hook
    /// returns; write failures are then only logged.
    pub fn send_text(&self, text: String) -> Result<()> {
        self.ensure_open()?;

        if self.on_receive_thread() {
            return self
                .shared
                .commands
                .send(Outbound::Frame { text, reply: None })
                .map_err(|_| ChannelError::NotConnected);
        }

        let (reply_tx, reply_rx) = bounded(1);
        self.shared
            .commands
            .send(Outbound::Frame {
                text,
                reply: Some(reply_tx),
            })
            .map_err(|_| ChannelError::NotConnected)?;
        // The reply sender is dropped unanswered when the loop ends first.
        reply_rx.recv().map_err(|_| ChannelError::NotConnected)?
    }

    /// Starts the closing handshake. A no-op when the channel is no longer open.
    pub fn close(&self) -> Result<()> {
        if self.state() != ConnectionState::Open {
            return Ok(());
        }
        self.shared
            .commands
            .send(Outbound::Close)
            .map_err(|_| ChannelError::NotConnected)
    }

    /// Receiver that disconnects once the receive loop has ended.
    ///
    /// Nothing is ever sent on it; use it in a `select!` to stop waiting when the channel
    /// goes away.
    pub fn closed(&self) -> &Receiver<()> {
        &self.shared.closed
    }

    /// Blocks until the receive loop has ended and `on_close` has run.
    pub fn wait(&self) {
        let _ = self.shared.closed.recv();
    }

    /// Like [`wait`](Self::wait) with an upper bound. Returns `true` if the loop ended.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        matches!(
            self.shared.closed.recv_timeout(timeout),
            Err(RecvTimeoutError::Disconnected)
        )
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state() == ConnectionState::Open {
            Ok(())
        } else {
            Err(ChannelError::NotConnected)
        }
    }

    fn on_receive_thread(&self) -> bool {
        self.shared.receive_thread.get() == Some(&thread::current().id())
    }
}

fn receive_loop(
    mut socket: Socket,
    handle: ChannelHandle,
    commands: Receiver<Outbound>,
    handler: Arc<dyn EventHandler>,
    closed_tx: Sender<()>,
) {
    let _ = handle.shared.receive_thread.set(thread::current().id());
    handler.on_open(&handle);

    match pump(&mut socket, &commands, handler.as_ref()) {
        LoopExit::Closed => {
            handle.shared.state.set(ConnectionState::Closed);
            info!("Channel to {} closed", handle.endpoint());
        }
        LoopExit::Failed(err) => {
            handle.shared.state.set(ConnectionState::Failed);
            error!("Channel to {} failed: {}", handle.endpoint(), err);
            handler.on_error(&err);
        }
    }

    for pending in commands.try_iter() {
        if let Outbound::Frame {
            reply: Some(reply), ..
        } = pending
        {
            let _ = reply.send(Err(ChannelError::NotConnected));
        }
    }
    drop(commands);

    handler.on_close();
    drop(closed_tx);
}

fn pump(socket: &mut Socket, commands: &Receiver<Outbound>, handler: &dyn EventHandler) -> LoopExit {
    let mut closing_since: Option<Instant> = None;

    loop {
        if let Some(since) = closing_since {
            if since.elapsed() > CLOSE_GRACE {
                warn!("Peer did not answer the close frame; dropping connection");
                return LoopExit::Closed;
            }
        }

        for command in commands.try_iter() {
            match command {
                Outbound::Frame { text, reply } => {
                    let result = write_frame(socket, text);
                    if let Err(e) = &result {
                        warn!("Failed to write frame: {}", e);
                    }
                    if let Some(reply) = reply {
                        let _ = reply.send(result);
                    }
                }
                Outbound::Close => match socket.close(None) {
                    Ok(()) => {
                        debug!("Close frame sent");
                        closing_since.get_or_insert_with(Instant::now);
                    }
                    Err(tungstenite::Error::AlreadyClosed | tungstenite::Error::ConnectionClosed) => {}
                    Err(e) => return LoopExit::Failed(ChannelError::WebSocket(e)),
                },
            }
        }

        match socket.read() {
            Ok(Message::Text(text)) => handler.on_message(text.as_str()),
            Ok(Message::Binary(data)) => debug!("Ignoring binary frame of {} bytes", data.len()),
            Ok(Message::Close(frame)) => debug!("Close frame received: {:?}", frame),
            Ok(_) => {}
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                return LoopExit::Closed;
            }
            Err(e) if is_idle(&e) => continue,
            Err(e) => return LoopExit::Failed(ChannelError::WebSocket(e)),
        }
    }
}

fn write_frame(socket: &mut Socket, text: String) -> Result<()> {
    socket.send(Message::text(text)).map_err(send_error)
}

/// A write on a closing or closed socket means "not connected"; anything else is a
/// transport-level send failure.
fn send_error(err: tungstenite::Error) -> ChannelError {
    match err {
        tungstenite::Error::ConnectionClosed
        | tungstenite::Error::AlreadyClosed
        | tungstenite::Error::Protocol(ProtocolError::SendAfterClosing) => ChannelError::NotConnected,
        other => ChannelError::Send(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, ErrorKind};

    #[test]
    fn writes_on_closed_socket_are_not_connected() {
        for err in [
            tungstenite::Error::ConnectionClosed,
            tungstenite::Error::AlreadyClosed,
            tungstenite::Error::Protocol(ProtocolError::SendAfterClosing),
        ] {
            assert!(matches!(send_error(err), ChannelError::NotConnected));
        }
    }

    #[test]
    fn broken_pipe_is_a_send_error() {
        let err = tungstenite::Error::Io(io::Error::from(ErrorKind::BrokenPipe));
        assert!(matches!(send_error(err), ChannelError::Send(_)));
    }
}
