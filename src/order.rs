//! Pluggable total orders over items.
//!
//! The registry applies one policy to its whole raw sequence on every
//! mutation. Policies compare attributes only; the stable `seq` tie-break
//! is appended here so equal-priority items keep deterministic relative
//! position across rebuilds regardless of the policy.

use std::cmp::Ordering;

use crate::model::Item;

/// A total order over items. Implementations compare by whatever
/// attributes they like; `Registry` breaks ties by arrival order.
pub trait OrderPolicy: Send + Sync {
    fn compare(&self, a: &Item, b: &Item) -> Ordering;
}

/// Plain arrival order (FIFO).
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrivalOrder;

impl OrderPolicy for ArrivalOrder {
    fn compare(&self, a: &Item, b: &Item) -> Ordering {
        a.seq.cmp(&b.seq)
    }
}

/// Most-urgent-first. Ties fall back to arrival order via the registry's
/// stable tie-break.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrgencyOrder;

impl OrderPolicy for UrgencyOrder {
    fn compare(&self, a: &Item, b: &Item) -> Ordering {
        b.urgency.cmp(&a.urgency)
    }
}
