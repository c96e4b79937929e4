//! Error types shared across crate boundaries.
//!
//! Crate-specific rejection reasons (validation, quorum, state transition,
//! ...) live in each owning crate's own `thiserror::Error` enum, following
//! A deliberately small taxonomy. This module only holds the handful of error
//! shapes more than one crate needs to name.

use thiserror::Error;

/// A fixed-width or length-prefixed field failed to decode from wire bytes.
#[derive(Debug, Clone, Error)]
pub enum EncodingError {
    #[error("unexpected end of buffer: needed {needed} more bytes, had {available}")]
    UnexpectedEof { needed: usize, available: usize },

    #[error("field {field} out of range: {detail}")]
    OutOfRange { field: &'static str, detail: String },
}
