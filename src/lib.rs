//! # conveyor
//!
//! Dynamic-priority iteration engine: a shared, dynamically reordered
//! worklist consumed by independent stages through per-stage cursors.
//!
//! The registry owns the canonical ordered item sequence and notifies a
//! cursor factory of every change; the factory marks all live cursors
//! dirty; each cursor rebuilds its own snapshot lazily on its next advance
//! and scans it with a stage-local readiness predicate. Stages never
//! reference each other — upstream dependencies are expressed entirely
//! through per-stage completion flags on the shared items.

pub mod config;
pub mod cursor;
pub mod error;
pub mod event;
pub mod factory;
pub mod model;
pub mod order;
pub mod readiness;
pub mod registry;
pub mod stage;
