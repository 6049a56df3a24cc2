//! Cursor creation and dirty fan-out.
//!
//! The factory is the only registry subscriber cursors need: it registers
//! one listener at construction and marks every managed cursor dirty from
//! it. The registry's subscriber count stays independent of the number of
//! cursors, and all cursors observe a given mutation as one logical event
//! even though each rebuilds its own snapshot lazily.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::cursor::Cursor;
use crate::readiness::Readiness;
use crate::registry::Registry;

/// Creates cursors against one registry and fans dirty signals out to all
/// of them. The fan-out runs inside the registry's synchronous notify, so
/// every cursor is dirty before `append` returns.
pub struct CursorFactory {
    registry: Arc<Registry>,
    /// One dirty handle per cursor ever created. Handles are kept for the
    /// process lifetime; marking a dropped cursor's flag is harmless.
    dirty_handles: Arc<Mutex<Vec<Arc<AtomicBool>>>>,
}

impl CursorFactory {
    /// Build a factory for the given registry. Subscribes exactly once.
    pub fn new(registry: Arc<Registry>) -> Self {
        let dirty_handles: Arc<Mutex<Vec<Arc<AtomicBool>>>> = Arc::default();

        let fanout = Arc::clone(&dirty_handles);
        registry.subscribe(Box::new(move |event| {
            let handles = fanout.lock().unwrap_or_else(PoisonError::into_inner);
            debug!(seq = event.seq, cursors = handles.len(), "marking cursors dirty");
            for handle in handles.iter() {
                handle.store(true, Ordering::Release);
            }
        }));

        Self {
            registry,
            dirty_handles,
        }
    }

    /// Create a cursor bound to this factory's registry and the given
    /// predicate, and add it to the fan-out.
    pub fn create_cursor(&self, predicate: Box<dyn Readiness>) -> Cursor {
        self.build(Some(predicate))
    }

    /// Create a cursor with no predicate yet. The caller must call
    /// `set_predicate` before the first `advance`, which otherwise fails
    /// with `Error::PredicateMissing`.
    pub fn create_blank_cursor(&self) -> Cursor {
        self.build(None)
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    fn build(&self, predicate: Option<Box<dyn Readiness>>) -> Cursor {
        // Dirty from birth: the first advance always rebuilds.
        let dirty = Arc::new(AtomicBool::new(true));
        self.dirty_handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&dirty));
        Cursor::new(Arc::clone(&self.registry), predicate, dirty)
    }
}
