//! The canonical ordered store of items.
//!
//! The registry owns the raw append-only sequence and a derived sorted
//! snapshot. Every append recomputes the snapshot in full — the order
//! policy may consult attributes that change between mutations, so an
//! incremental re-sort would be wrong — and then notifies subscribers
//! synchronously. Reads hand out copies; callers can never reach
//! registry-internal state through a snapshot.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::debug;

use crate::event::{ChangeKind, Event};
use crate::model::{Item, ItemId, NewItem};
use crate::order::OrderPolicy;

/// A registry change listener. Invoked synchronously on the appending
/// thread, in registration order.
pub type Listener = Box<dyn Fn(&Event) + Send + Sync>;

struct Inner {
    /// Insertion order, append-only.
    raw: Vec<Arc<Item>>,
    /// Derived: `raw` under the order policy, stable-sorted, tie-broken
    /// by arrival seq.
    sorted: Vec<Arc<Item>>,
    next_seq: u64,
}

/// Subscribers and the event counter live behind one lock: the seq is
/// assigned while delivery is serialized, so every listener sees seq
/// values in strictly increasing order even under concurrent appends.
struct Subscribers {
    listeners: Vec<Listener>,
    next_event_seq: u64,
}

/// Canonical ordered collection of items.
pub struct Registry {
    order: Box<dyn OrderPolicy>,
    inner: Mutex<Inner>,
    subscribers: Mutex<Subscribers>,
}

impl Registry {
    /// Create an empty registry with the given order policy. An empty
    /// registry is valid, not an error.
    pub fn new(order: Box<dyn OrderPolicy>) -> Self {
        Self {
            order,
            inner: Mutex::new(Inner {
                raw: Vec::new(),
                sorted: Vec::new(),
                next_seq: 0,
            }),
            subscribers: Mutex::new(Subscribers {
                listeners: Vec::new(),
                next_event_seq: 0,
            }),
        }
    }

    /// Append an item. Recomputes the sorted snapshot, then emits one
    /// `ListModified` event to every subscriber before returning.
    pub fn append(&self, new: NewItem) -> Arc<Item> {
        let item = {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

            let item = Arc::new(Item {
                id: ItemId::new(),
                kind: new.kind,
                urgency: new.urgency,
                seq: inner.next_seq,
                created_at: Utc::now(),
                flags: Default::default(),
            });
            inner.next_seq += 1;
            inner.raw.push(Arc::clone(&item));

            // Full rebuild, stable sort with seq tie-break.
            let mut sorted = inner.raw.clone();
            sorted.sort_by(|a, b| self.order.compare(a, b).then(a.seq.cmp(&b.seq)));
            inner.sorted = sorted;

            debug!(id = %item.id, kind = %item.kind, seq = item.seq, "item appended");
            item
        };
        // Inner lock released before listeners run, so a listener may read
        // the registry without deadlocking.
        self.notify(ChangeKind::ListModified { appended: item.id });
        item
    }

    /// Current sorted order, as a defensive copy. Idempotent: repeated
    /// calls without an intervening mutation yield equal sequences.
    pub fn snapshot(&self) -> Vec<Arc<Item>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sorted
            .clone()
    }

    /// Number of items ever appended.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .raw
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a change listener. There is no unsubscribe; the subscriber
    /// set is append-only for the life of the registry.
    pub fn subscribe(&self, listener: Listener) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .push(listener);
    }

    fn notify(&self, kind: ChangeKind) {
        let mut subs = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let event = Event {
            seq: subs.next_event_seq,
            timestamp: Utc::now(),
            kind,
        };
        subs.next_event_seq += 1;
        debug!(seq = event.seq, subscribers = subs.listeners.len(), "list modified");
        for listener in subs.listeners.iter() {
            listener(&event);
        }
    }
}
