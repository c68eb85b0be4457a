use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::event::GameEvent;


pub type EventSender = async_std::channel::Sender<GameEvent>;

// Opaque identifier of the party behind a connection (in practice: a cookie value). Stays the same
// when the party reconnects, e.g. after a page refresh.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn new(s: impl Into<String>) -> Self { Self(s.into()) }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// Unique for the lifetime of the process. Distinguishes two sockets opened by the same identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        ConnectionId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

// A single live websocket. The same identity may own several connections over time, but only the
// latest registered one receives events.
#[derive(Clone, Debug)]
pub struct ClientConnection {
    pub id: ConnectionId,
    pub identity: ClientIdentity,
    pub events_tx: EventSender,
}

impl ClientConnection {
    pub fn new(identity: ClientIdentity, events_tx: EventSender) -> Self {
        ClientConnection { id: ConnectionId::next(), identity, events_tx }
    }
}

// Volatile routing table: identity -> outbound channel. Sending to an identity without a channel
// is not an error, the event is simply lost. There are no retries and no queueing.
#[derive(Default)]
pub struct Clients {
    map: HashMap<ClientIdentity, (ConnectionId, EventSender)>,
}

impl Clients {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.map.len() }
    pub fn is_empty(&self) -> bool { self.map.is_empty() }
    pub fn identities(&self) -> impl Iterator<Item = &ClientIdentity> { self.map.keys() }
    pub fn is_connected(&self, identity: &ClientIdentity) -> bool {
        self.map.contains_key(identity)
    }

    // Last registration wins.
    pub fn register(&mut self, connection: ClientConnection) {
        let ClientConnection { id, identity, events_tx } = connection;
        if self.map.insert(identity.clone(), (id, events_tx)).is_some() {
            debug!("Client {} replaced its connection", identity);
        }
    }

    pub fn remove(&mut self, identity: &ClientIdentity) -> bool {
        self.map.remove(identity).is_some()
    }

    // Removes the entry only if it still points to the given connection. When a client refreshes
    // the page, the new socket registers before the old one is closed; closing the old one must
    // not unregister the new one.
    pub fn remove_connection(&mut self, connection: &ClientConnection) -> bool {
        match self.map.get(&connection.identity) {
            Some((id, _)) if *id == connection.id => {
                self.map.remove(&connection.identity);
                true
            }
            _ => false,
        }
    }

    pub fn send(&self, identity: &ClientIdentity, event: GameEvent) -> bool {
        let Some((_, events_tx)) = self.map.get(identity) else {
            debug!("Client {} is not connected, dropping {:?}", identity, event);
            return false;
        };
        match events_tx.try_send(event) {
            Ok(()) => true,
            Err(err) => {
                debug!("Cannot send to client {}: {}", identity, err);
                false
            }
        }
    }
}
