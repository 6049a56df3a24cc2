//! Core data model.
//!
//! An item is a unit of work flowing through processing stages. It has
//! identity, a type tag, attributes the order policy consults (urgency,
//! arrival order), and a set of per-stage completion flags. The flags are
//! the only mutable state and the only channel stages communicate through.

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A unit of work tracked by the registry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier.
    pub id: ItemId,

    /// What kind of item this is (e.g., "car"). The core doesn't interpret
    /// it; order policies and predicates may.
    pub kind: String,

    /// Urgency attribute for priority policies. Higher = more urgent.
    pub urgency: i32,

    /// Arrival order, assigned by the registry on append. Also the stable
    /// tie-break for every order policy.
    pub seq: u64,

    pub created_at: DateTime<Utc>,

    /// Per-stage completion flags. Written only through a stage predicate's
    /// `mark_completed`.
    pub flags: StageFlags,
}

/// Newtype for item IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short display: first 8 chars of UUID
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// New item builder
// ---------------------------------------------------------------------------

/// Builder for submitting an item to a registry. The registry assigns
/// `id`, `seq`, and `created_at` on append.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub kind: String,
    pub urgency: i32,
}

impl NewItem {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            urgency: 0,
        }
    }

    pub fn urgency(mut self, urgency: i32) -> Self {
        self.urgency = urgency;
        self
    }
}

// ---------------------------------------------------------------------------
// Stage flags
// ---------------------------------------------------------------------------

/// Thread-safe set of stage names whose work on an item is complete.
///
/// Distinct stages write distinct names, so two predicates never contend
/// over the same logical flag; the mutex only guards the set structure.
/// Setting a flag twice is a no-op (set semantics), which is what makes
/// `mark_completed` idempotent.
#[derive(Debug, Default)]
pub struct StageFlags {
    inner: Mutex<BTreeSet<String>>,
}

impl StageFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Is the given stage's flag set?
    pub fn is_set(&self, stage: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(stage)
    }

    /// Set the given stage's flag. Idempotent.
    pub fn set(&self, stage: &str) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(stage.to_string());
    }

    /// Snapshot of all completed stage names.
    pub fn completed(&self) -> BTreeSet<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Serialize for StageFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.completed().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StageFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let set = BTreeSet::<String>::deserialize(deserializer)?;
        Ok(Self {
            inner: Mutex::new(set),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_set_is_idempotent() {
        let flags = StageFlags::new();
        assert!(!flags.is_set("wheels"));

        flags.set("wheels");
        flags.set("wheels");

        assert!(flags.is_set("wheels"));
        assert_eq!(flags.completed().len(), 1);
    }

    #[test]
    fn flags_survive_serde() {
        let flags = StageFlags::new();
        flags.set("wheels");
        flags.set("paint");

        let json = serde_json::to_string(&flags).unwrap();
        let back: StageFlags = serde_json::from_str(&json).unwrap();
        assert!(back.is_set("wheels"));
        assert!(back.is_set("paint"));
        assert!(!back.is_set("polish"));
    }

    #[test]
    fn item_id_short_display() {
        let id = ItemId::new();
        assert_eq!(id.to_string().len(), 8);
    }
}
