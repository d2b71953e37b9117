//! Listening socket, accept loop, and snapshot broadcaster.
//!
//! `OrderBookServer::start` spawns two threads: one accepts connections and gives each
//! its own session thread, the other pushes an order-book snapshot to every subscriber
//! of every symbol once per broadcast interval. Both poll a shared shutdown flag.
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::tick;
use log::{debug, error, info};
use order_common::{ChannelError, Result};

use crate::model::book;
use crate::model::registry::Registry;
use crate::session::serve_connection;

/// Default period between snapshot broadcasts.
pub const BROADCAST_INTERVAL: Duration = Duration::from_secs(1);
/// How often idle loops re-check the shutdown flag.
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

/// A bound, not yet running, order-book server.
pub struct OrderBookServer {
    listener: TcpListener,
    broadcast_interval: Duration,
}

impl OrderBookServer {
    /// Bind the listening socket to `bind_addr` (e.g., `0.0.0.0:9002`).
    pub fn bind(bind_addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(bind_addr)?;
        listener.set_nonblocking(true)?;
        Ok(Self {
            listener,
            broadcast_interval: BROADCAST_INTERVAL,
        })
    }

    /// Override the snapshot broadcast period.
    pub fn with_broadcast_interval(mut self, interval: Duration) -> Self {
        self.broadcast_interval = interval;
        self
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Start the accept and broadcast threads.
    pub fn start(self) -> Result<ServerHandle> {
        let addr = self.local_addr()?;
        let registry = Arc::new(Mutex::new(Registry::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let accept = {
            let registry = Arc::clone(&registry);
            let shutdown = Arc::clone(&shutdown);
            let listener = self.listener;
            thread::Builder::new()
                .name("server-accept".into())
                .spawn(move || accept_loop(listener, registry, shutdown))?
        };

        let broadcast = {
            let registry = Arc::clone(&registry);
            let shutdown = Arc::clone(&shutdown);
            let interval = self.broadcast_interval;
            thread::Builder::new()
                .name("server-broadcast".into())
                .spawn(move || broadcast_loop(registry, shutdown, interval))?
        };

        info!("Order-book server listening on {}", addr);
        Ok(ServerHandle {
            addr,
            registry,
            shutdown,
            threads: vec![accept, broadcast],
        })
    }
}

/// Control and inspection handle for a running server.
pub struct ServerHandle {
    addr: SocketAddr,
    registry: Arc<Mutex<Registry>>,
    shutdown: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
}

impl ServerHandle {
    /// Address the server is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Text frames received so far, across all sessions, in arrival order.
    ///
    /// Only the most recent [`JOURNAL_CAPACITY`](crate::model::registry::JOURNAL_CAPACITY) frames are retained.
    pub fn received_frames(&self) -> Result<Vec<String>> {
        Ok(self.registry.lock()?.journal().map(String::from).collect())
    }

    /// Number of sessions currently subscribed to `symbol`.
    pub fn subscriber_count(&self, symbol: &str) -> Result<usize> {
        Ok(self.registry.lock()?.subscriber_count(symbol))
    }

    /// Number of connected sessions.
    pub fn session_count(&self) -> Result<usize> {
        Ok(self.registry.lock()?.session_count())
    }

    /// Ask every server thread to stop; sessions send a close frame to their peer.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Stop the server and wait for all of its threads.
    pub fn join(self) -> Result<()> {
        self.shutdown();
        for thread in self.threads {
            thread
                .join()
                .map_err(|_| ChannelError::Format("server thread panicked".into()))?;
        }
        info!("Order-book server on {} stopped", self.addr);
        Ok(())
    }
}

fn accept_loop(listener: TcpListener, registry: Arc<Mutex<Registry>>, shutdown: Arc<AtomicBool>) {
    let mut sessions: Vec<JoinHandle<()>> = Vec::new();

    while !shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!("Accepted TCP connection from {}", peer);
                let registry = Arc::clone(&registry);
                let shutdown = Arc::clone(&shutdown);
                let spawned = thread::Builder::new()
                    .name(format!("session-{}", peer))
                    .spawn(move || {
                        if let Err(e) = serve_connection(stream, peer, registry, shutdown) {
                            error!("Session for {} ended with error: {}", peer, e);
                        }
                    });
                match spawned {
                    Ok(session) => sessions.push(session),
                    Err(e) => error!("Failed to spawn session for {}: {}", peer, e),
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(SHUTDOWN_POLL),
            Err(e) => error!("TCP connection error: {}", e),
        }
        sessions.retain(|session| !session.is_finished());
    }

    for session in sessions {
        let _ = session.join();
    }
}

fn broadcast_loop(registry: Arc<Mutex<Registry>>, shutdown: Arc<AtomicBool>, interval: Duration) {
    let ticker = tick(interval);
    while !shutdown.load(Ordering::Relaxed) {
        if ticker.recv_timeout(SHUTDOWN_POLL).is_ok() {
            if let Err(e) = broadcast_once(&registry) {
                error!("Snapshot broadcast failed: {}", e);
            }
        }
    }
}

/// Queue one snapshot per subscribed symbol to each of its subscribers.
fn broadcast_once(registry: &Mutex<Registry>) -> Result<()> {
    let targets = registry.lock()?.fan_out();
    for (symbol, queues) in targets {
        let frame = serde_json::to_string(&book::snapshot(&symbol))?;
        for queue in queues {
            if queue.send(frame.clone()).is_err() {
                debug!("Subscriber of {} went away before broadcast", symbol);
            }
        }
    }
    Ok(())
}
