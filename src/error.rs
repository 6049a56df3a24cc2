//! Error types for conveyor.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// `advance()` was called on a cursor that has no readiness predicate.
    /// A wiring mistake, not an empty backlog, so it fails loudly instead
    /// of returning `None`.
    #[error("cursor has no readiness predicate set")]
    PredicateMissing,

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
