//! Core error type.
//!
//! Every variant here is configuration-class: unknown names coming from
//! scenario input or a config value the simulation cannot run with.  Sub-crates
//! define their own enums and wrap `CoreError` with `#[from]` where needed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown transport mode {0:?}")]
    UnknownMode(String),

    #[error("unknown entity kind {0:?}")]
    UnknownEntityKind(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `um-core`.
pub type CoreResult<T> = Result<T, CoreError>;
