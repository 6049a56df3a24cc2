//! The per-stage cursor.
//!
//! A cursor holds a cached copy of the registry's sorted order and scans it
//! for the next item its predicate accepts. The cache is authoritative only
//! while the dirty flag is clear; once marked dirty (by the factory's
//! fan-out) the cache is rebuilt whole from a fresh registry snapshot on
//! the next `advance` — never patched incrementally. Stale snapshots are
//! therefore never an error condition; they self-heal on the next advance.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::model::Item;
use crate::readiness::Readiness;
use crate::registry::Registry;

/// A stage-owned pointer into a lazily rebuilt view of the registry.
///
/// Single-writer by design: exactly one logical caller drives `advance` /
/// `set_predicate` on a given cursor, which `&mut self` enforces. Only the
/// dirty flag is shared with the factory's fan-out.
pub struct Cursor {
    registry: Arc<Registry>,
    predicate: Option<Box<dyn Readiness>>,
    /// Shared with the factory; starts true so first use rebuilds.
    dirty: Arc<AtomicBool>,
    snapshot: Vec<Arc<Item>>,
    current: Option<Arc<Item>>,
}

impl Cursor {
    /// Construct a cursor. Crate-private: cursors are created through a
    /// `CursorFactory` so the dirty fan-out covers them.
    pub(crate) fn new(
        registry: Arc<Registry>,
        predicate: Option<Box<dyn Readiness>>,
        dirty: Arc<AtomicBool>,
    ) -> Self {
        Self {
            registry,
            predicate,
            dirty,
            snapshot: Vec::new(),
            current: None,
        }
    }

    /// Replace the gating predicate. The pending `current` item, if any,
    /// will be completed through the new predicate on the next advance.
    pub fn set_predicate(&mut self, predicate: Box<dyn Readiness>) {
        self.predicate = Some(predicate);
    }

    /// Mark the cached snapshot stale. Normally driven by the factory's
    /// fan-out; safe to call from any thread.
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Move to the next ready item.
    ///
    /// In order: completes the previously returned item, rebuilds the
    /// snapshot if dirty, then scans for the first item the predicate
    /// accepts. `Ok(None)` means no currently ready item — not an error;
    /// the cursor stays usable and will yield again once the registry
    /// changes or an upstream stage unblocks an item.
    pub fn advance(&mut self) -> Result<Option<Arc<Item>>> {
        let predicate = self.predicate.as_ref().ok_or(Error::PredicateMissing)?;

        if let Some(prev) = self.current.take() {
            trace!(id = %prev.id, "completing previous item");
            predicate.mark_completed(&prev);
        }

        if self.dirty.swap(false, Ordering::AcqRel) {
            self.snapshot = self.registry.snapshot();
            debug!(items = self.snapshot.len(), "snapshot rebuilt");
        }

        let next = self
            .snapshot
            .iter()
            .find(|item| predicate.is_ready(item))
            .cloned();

        match &next {
            Some(item) => trace!(id = %item.id, "next ready item"),
            None => trace!("no ready item"),
        }

        self.current = next.clone();
        Ok(next)
    }
}
