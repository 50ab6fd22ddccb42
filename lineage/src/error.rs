//! Errors surfaced by the context store.
//!
//! Most "missing context" situations are reported through sentinel values
//! (`Ok(false)`, `None`) because losing a context is expected on hot paths.
//! Only caller bugs become an [`Error`].

use thiserror::Error;

/// Errors returned by the context store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The key is reserved for node bookkeeping and cannot be written.
    #[error("can't set reserved key `{0}`")]
    InvalidKey(String),

    /// There is no context node for the current execution.
    ///
    /// Usually means the store was used before any task boundary
    /// established a context, or before the store was enabled.
    #[error("no active context for the current execution; run inside a spawned task")]
    NoActiveContext,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
