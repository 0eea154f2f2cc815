//! FanoutHub - room registry for socket connections
//!
//! ```text
//! EventRouter
//!       │ publish(room, ServerEvent)   (serialized once)
//!       ▼
//! FanoutHub
//!   ├── rooms: Room → {connection ids}
//!   └── connections: id → bounded mpsc::Sender<frame>
//!           │ try_send (full → dropped)
//!           ▼
//!     WebSocket session task
//! ```
//!
//! Delivery is best-effort and at-most-once: a slow connection loses frames
//! instead of holding up the router. Clients refetch over HTTP.

use super::room::Room;
use dashmap::DashMap;
use shared::ServerEvent;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

pub type ConnectionId = u64;

/// Serialized frame shared by every recipient
pub type Frame = Arc<str>;

struct Connection {
    tx: mpsc::Sender<Frame>,
    user_id: String,
    rooms: HashSet<Room>,
}

struct HubInner {
    rooms: DashMap<Room, HashSet<ConnectionId>>,
    connections: DashMap<ConnectionId, Connection>,
    next_id: AtomicU64,
    buffer: usize,
}

/// Room-based fan-out shared by the router and all socket sessions
#[derive(Clone)]
pub struct FanoutHub {
    inner: Arc<HubInner>,
}

impl std::fmt::Debug for FanoutHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutHub")
            .field("connections", &self.inner.connections.len())
            .field("rooms", &self.inner.rooms.len())
            .finish()
    }
}

impl FanoutHub {
    /// `buffer` is the per-connection queue length
    pub fn new(buffer: usize) -> Self {
        Self {
            inner: Arc::new(HubInner {
                rooms: DashMap::new(),
                connections: DashMap::new(),
                next_id: AtomicU64::new(1),
                buffer: buffer.max(1),
            }),
        }
    }

    /// Register a connection; frames for it arrive on the returned receiver
    pub fn register(&self, user_id: &str) -> (ConnectionId, mpsc::Receiver<Frame>) {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.inner.buffer);
        self.inner.connections.insert(
            id,
            Connection {
                tx,
                user_id: user_id.to_string(),
                rooms: HashSet::new(),
            },
        );
        tracing::debug!(connection_id = id, user_id = %user_id, "Connection registered");
        (id, rx)
    }

    /// Add a connection to a room; false if the connection is gone
    pub fn join(&self, id: ConnectionId, room: Room) -> bool {
        {
            let Some(mut conn) = self.inner.connections.get_mut(&id) else {
                return false;
            };
            if !conn.rooms.insert(room.clone()) {
                return true;
            }
        }
        self.inner.rooms.entry(room).or_default().insert(id);
        true
    }

    /// Remove a connection from every room it joined
    pub fn unregister(&self, id: ConnectionId) {
        let Some((_, conn)) = self.inner.connections.remove(&id) else {
            return;
        };
        for room in conn.rooms {
            if let Some(mut members) = self.inner.rooms.get_mut(&room) {
                members.remove(&id);
            }
            self.inner.rooms.remove_if(&room, |_, members| members.is_empty());
        }
        tracing::debug!(connection_id = id, user_id = %conn.user_id, "Connection unregistered");
    }

    /// Send a frame directly to one connection (join acks)
    pub fn send_to(&self, id: ConnectionId, event: &ServerEvent) -> bool {
        let Some(frame) = encode(event) else {
            return false;
        };
        let Some(tx) = self.inner.connections.get(&id).map(|c| c.tx.clone()) else {
            return false;
        };
        tx.try_send(frame).is_ok()
    }

    /// Fan an event out to every member of a room; returns frames queued
    pub fn publish(&self, room: &Room, event: &ServerEvent) -> usize {
        let members: Vec<ConnectionId> = match self.inner.rooms.get(room) {
            Some(members) => members.iter().copied().collect(),
            None => return 0,
        };
        if members.is_empty() {
            return 0;
        }
        let Some(frame) = encode(event) else {
            return 0;
        };

        let mut delivered = 0;
        for id in members {
            let Some(tx) = self.inner.connections.get(&id).map(|c| c.tx.clone()) else {
                continue;
            };
            match tx.try_send(Arc::clone(&frame)) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        connection_id = id,
                        room = %room,
                        event = event.name(),
                        "Connection queue full, event dropped"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(connection_id = id, "Connection closed before delivery");
                }
            }
        }
        delivered
    }

    /// Number of open connections
    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    /// Number of connections in a room
    pub fn room_size(&self, room: &Room) -> usize {
        self.inner.rooms.get(room).map(|m| m.len()).unwrap_or(0)
    }

    /// Drop every connection; sessions see their receiver close and exit
    pub fn close_all(&self) {
        let count = self.inner.connections.len();
        self.inner.connections.clear();
        self.inner.rooms.clear();
        if count > 0 {
            tracing::info!(connections = count, "Fan-out hub closed all connections");
        }
    }
}

fn encode(event: &ServerEvent) -> Option<Frame> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Arc::from(json)),
        Err(e) => {
            tracing::error!(event = event.name(), error = %e, "Failed to serialize event");
            None
        }
    }
}
