//! Engine error types.
//!
//! None of these cross the `reduce`/`evaluate` boundary. They surface only in
//! the type-erased layer, at persistence, and inside generators (where they
//! trigger a retry or a fallback puzzle).

use thiserror::Error;

/// Result alias for persistence operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the engine outside of pure puzzle logic.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No module is registered under this id.
    #[error("unknown game `{0}`")]
    UnknownGame(String),

    /// A persisted puzzle or state did not match the family's shape.
    #[error("malformed {what} for `{game}`: {source}")]
    Snapshot {
        game: &'static str,
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by a persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("remote store unavailable: {0}")]
    Unavailable(String),
}

/// Internal generator failure. Always recovered by retry or fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    #[error("pick from an empty list")]
    EmptyChoice,

    #[error("search budget exhausted")]
    Exhausted,

    #[error("constraint construction failed: {0}")]
    Unsatisfied(&'static str),
}
