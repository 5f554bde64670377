use crate::sink::ChatSink;
use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
};
use tokio::sync::{Mutex, MutexGuard, oneshot};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

pub(crate) type Entries<S> = HashMap<ConnectionId, Member<S>>;

/// Resolves once the connection has been taken out of the registry.
pub type Evicted = oneshot::Receiver<()>;

pub(crate) struct Member<S> {
    pub(crate) sink: S,
    evicted: oneshot::Sender<()>,
}

impl<S> Member<S> {
    /// Tells the owning session to stop and hands back the sink for closing.
    pub(crate) fn evict(self) -> S {
        let _ = self.evicted.send(());
        self.sink
    }
}

/// Live connections, keyed by connection id.
///
/// Every access goes through one async mutex. The broadcast router keeps it
/// locked for a whole fan-out, so membership cannot change under a send.
/// Whoever removes an entry gets its sink back and is the only one to close it.
/// Removal also resolves the [`Evicted`] signal handed out by [`Registry::add`].
pub struct Registry<S> {
    entries: Mutex<Entries<S>>,
}

impl<S: ChatSink> Registry<S> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `None` and drops `sink` if `id` is already registered.
    pub async fn add(&self, id: ConnectionId, sink: S) -> Option<Evicted> {
        match self.entries.lock().await.entry(id) {
            Entry::Vacant(slot) => {
                let (tx, rx) = oneshot::channel();
                slot.insert(Member { sink, evicted: tx });
                Some(rx)
            }
            Entry::Occupied(_) => None,
        }
    }

    pub async fn remove(&self, id: ConnectionId) -> Option<S> {
        self.entries.lock().await.remove(&id).map(Member::evict)
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.entries.lock().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn snapshot(&self) -> Vec<ConnectionId> {
        self.entries.lock().await.keys().copied().collect()
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, Entries<S>> {
        self.entries.lock().await
    }
}

impl<S: ChatSink> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}
