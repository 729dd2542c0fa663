//! Engine-wide recoverable error type.
//!
//! Only configuration and data problems travel through `EpError`.  Broken
//! scheduler or state-machine invariants are panics, never errors.

use thiserror::Error;

/// The top-level error type for `ep-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum EpError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EpError {
    /// Shorthand for building a [`EpError::Config`] from anything printable.
    pub fn config(msg: impl Into<String>) -> Self {
        EpError::Config(msg.into())
    }
}

/// Shorthand result type for all `ep-*` crates.
pub type EpResult<T> = Result<T, EpError>;
