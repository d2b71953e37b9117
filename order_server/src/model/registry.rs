//! Session and subscription tracker.
//!
//! Every accepted connection is registered with the outbound queue its session thread
//! drains. Subscriptions map a symbol to the sessions that asked for it, and every text
//! frame received by any session is appended to the journal in arrival order. The
//! journal keeps only the most recent frames; older ones are evicted first.
//!
//! The registry is not synchronized; the server shares it as `Arc<Mutex<Registry>>`.
use std::collections::{HashMap, HashSet, VecDeque};

use crossbeam_channel::Sender;

/// Identifier assigned to each accepted connection.
pub type SessionId = u64;

/// Number of received frames the journal retains by default.
pub const JOURNAL_CAPACITY: usize = 1024;

/// Tracks live sessions, their subscriptions, and received frames.
#[derive(Debug)]
pub struct Registry {
    sessions: HashMap<SessionId, Sender<String>>,
    subscriptions: HashMap<String, HashSet<SessionId>>,
    journal: VecDeque<String>,
    journal_capacity: usize,
    next_id: SessionId,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_journal_capacity(JOURNAL_CAPACITY)
    }
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry whose journal retains at most `capacity` frames.
    /// A capacity of zero disables journaling.
    pub fn with_journal_capacity(capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            subscriptions: HashMap::new(),
            journal: VecDeque::with_capacity(capacity.min(JOURNAL_CAPACITY)),
            journal_capacity: capacity,
            next_id: 0,
        }
    }

    /// Register a session that receives pushed frames through `outbound`.
    pub fn open(&mut self, outbound: Sender<String>) -> SessionId {
        self.next_id += 1;
        let id = self.next_id;
        self.sessions.insert(id, outbound);
        id
    }

    /// Forget a session and drop it from every subscription.
    pub fn close(&mut self, id: SessionId) {
        self.sessions.remove(&id);
        self.subscriptions.retain(|_, subscribers| {
            subscribers.remove(&id);
            !subscribers.is_empty()
        });
    }

    /// Subscribe `id` to `symbol`. Returns `false` for an unknown session.
    pub fn subscribe(&mut self, id: SessionId, symbol: &str) -> bool {
        if !self.sessions.contains_key(&id) {
            return false;
        }
        self.subscriptions
            .entry(String::from(symbol))
            .or_default()
            .insert(id);
        true
    }

    /// Number of sessions subscribed to `symbol`.
    pub fn subscriber_count(&self, symbol: &str) -> usize {
        self.subscriptions.get(symbol).map_or(0, HashSet::len)
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Outbound queues of every subscriber, grouped by symbol.
    pub fn fan_out(&self) -> Vec<(String, Vec<Sender<String>>)> {
        self.subscriptions
            .iter()
            .map(|(symbol, subscribers)| {
                let queues = subscribers
                    .iter()
                    .filter_map(|id| self.sessions.get(id).cloned())
                    .collect();
                (symbol.clone(), queues)
            })
            .collect()
    }

    /// Append a received frame to the journal, evicting the oldest when full.
    pub fn record(&mut self, frame: &str) {
        if self.journal_capacity == 0 {
            return;
        }
        if self.journal.len() == self.journal_capacity {
            self.journal.pop_front();
        }
        self.journal.push_back(String::from(frame));
    }

    /// Retained frames in arrival order.
    pub fn journal(&self) -> impl Iterator<Item = &str> {
        self.journal.iter().map(String::as_str)
    }
}
