//! Test peers and handlers shared by the client integration tests.
#![allow(dead_code)]
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use order_client::{ChannelHandle, EventHandler};
use order_common::{ChannelError, Endpoint};
use tungstenite::Message;

/// What a [`Peer`] does once a client has connected.
#[derive(Debug, Default, Clone)]
pub struct PeerScript {
    /// Text frames pushed right after the handshake.
    pub greet: Vec<String>,
    /// Start the closing handshake right after greeting.
    pub close_immediately: bool,
    /// Start the closing handshake once this many frames were received.
    pub close_after: Option<usize>,
    /// Drop the TCP connection right after greeting, without a close frame.
    pub drop_after_greeting: bool,
    /// Stop reading after greeting and hold the connection open this long.
    pub silent_for: Option<Duration>,
}

/// Single-connection WebSocket server that records what it receives.
pub struct Peer {
    pub endpoint: Endpoint,
    frames: Arc<Mutex<Vec<(Instant, String)>>>,
    thread: JoinHandle<()>,
}

impl Peer {
    pub fn spawn(script: PeerScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = Endpoint::parse(&format!("ws://{}", listener.local_addr().unwrap())).unwrap();
        let frames = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&frames);

        let thread = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut ws = tungstenite::accept(stream).unwrap();
            for text in script.greet {
                ws.send(Message::text(text)).unwrap();
            }
            if script.drop_after_greeting {
                drop(ws);
                return;
            }
            if let Some(silence) = script.silent_for {
                thread::sleep(silence);
                return;
            }
            if script.close_immediately {
                let _ = ws.close(None);
            }
            loop {
                match ws.read() {
                    Ok(Message::Text(text)) => {
                        let count = {
                            let mut frames = recorded.lock().unwrap();
                            frames.push((Instant::now(), text.as_str().to_owned()));
                            frames.len()
                        };
                        if script.close_after == Some(count) {
                            let _ = ws.close(None);
                        }
                    }
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
        });

        Self {
            endpoint,
            frames,
            thread,
        }
    }

    pub fn frames(&self) -> Vec<String> {
        self.frames.lock().unwrap().iter().map(|(_, f)| f.clone()).collect()
    }

    pub fn timed_frames(&self) -> Vec<(Instant, String)> {
        self.frames.lock().unwrap().clone()
    }

    pub fn join(self) {
        self.thread.join().unwrap();
    }
}

/// Lifecycle event as seen by [`RecordingHandler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open,
    Message(String),
    Error,
    Close,
}

/// Records every hook call; optionally answers each message from inside the hook.
#[derive(Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<Event>>,
    channel: Mutex<Option<ChannelHandle>>,
    reply_prefix: Option<String>,
}

impl RecordingHandler {
    pub fn replying(prefix: &str) -> Self {
        Self {
            reply_prefix: Some(prefix.to_owned()),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl EventHandler for RecordingHandler {
    fn on_open(&self, channel: &ChannelHandle) {
        *self.channel.lock().unwrap() = Some(channel.clone());
        self.events.lock().unwrap().push(Event::Open);
    }

    fn on_message(&self, raw: &str) {
        self.events.lock().unwrap().push(Event::Message(raw.to_owned()));
        if let Some(prefix) = &self.reply_prefix {
            if let Some(channel) = self.channel.lock().unwrap().as_ref() {
                channel.send_text(format!("{}{}", prefix, raw)).unwrap();
            }
        }
    }

    fn on_error(&self, _err: &ChannelError) {
        self.events.lock().unwrap().push(Event::Error);
    }

    fn on_close(&self) {
        self.events.lock().unwrap().push(Event::Close);
    }
}

pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}
