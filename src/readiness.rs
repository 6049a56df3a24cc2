//! The per-stage gating contract.
//!
//! A readiness predicate is the only thing a cursor knows about its stage:
//! `is_ready` decides whether an item may be surfaced, `mark_completed`
//! records that the stage finished with it. Predicates read flags owned by
//! other stages (that is how upstream dependencies are expressed) but
//! write only their own, and they never call back into the registry or
//! cursor.

use crate::model::Item;

/// Stage-local capability pair consumed by a cursor.
///
/// Contract:
/// - `is_ready` is pure: it depends only on the item's recorded flags and
///   attributes, with no side effects.
/// - `mark_completed` sets only this stage's own flag and is idempotent.
/// - A well-formed predicate's `is_ready` is false for an item whose own
///   flag is set; that is what keeps a cursor from returning the same item
///   twice.
pub trait Readiness: Send {
    fn is_ready(&self, item: &Item) -> bool;
    fn mark_completed(&self, item: &Item);
}

/// The standard dependency-gating predicate: an item is ready for `stage`
/// once every flag in `requires` is set and the stage's own flag is not.
///
/// "Paint only after wheels" is `StageGate::new("paint").requires("wheels")`.
#[derive(Debug, Clone)]
pub struct StageGate {
    stage: String,
    requires: Vec<String>,
}

impl StageGate {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            requires: Vec::new(),
        }
    }

    /// Add an upstream stage whose flag must be set first.
    pub fn requires(mut self, upstream: impl Into<String>) -> Self {
        self.requires.push(upstream.into());
        self
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }
}

impl Readiness for StageGate {
    fn is_ready(&self, item: &Item) -> bool {
        !item.flags.is_set(&self.stage) && self.requires.iter().all(|up| item.flags.is_set(up))
    }

    fn mark_completed(&self, item: &Item) {
        item.flags.set(&self.stage);
    }
}
