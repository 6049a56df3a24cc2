//! Change notifications emitted by the registry.
//!
//! The kinds form a closed enum — consumers match exhaustively and the
//! compiler flags any future addition. Listeners run synchronously on the
//! mutating call, in registration order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ItemId;

/// A change notification from a registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic sequence number per registry. Consumers can detect gaps.
    pub seq: u64,
    /// When this event occurred.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub kind: ChangeKind,
}

/// The closed set of registry change kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeKind {
    /// The raw sequence grew and the sorted snapshot was recomputed.
    ListModified { appended: ItemId },
}
