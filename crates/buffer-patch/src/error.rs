//! Error types.
//!
//! Errors come in two tiers:
//! - [`PatchError`] aborts a whole batch before the buffer is touched.
//! - [`OpError`] fails a single edit; the batch records it and moves on.

use thiserror::Error;

/// Failure reported by a host buffer when it rejects a primitive mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("range {offset}..{end} is outside the buffer (length {len})", end = .offset + .length)]
    /// The requested range does not fit in the buffer.
    OutOfBounds {
        /// Start character offset.
        offset: usize,
        /// Length in characters.
        length: usize,
        /// Buffer length in characters.
        len: usize,
    },

    #[error("range {start}..{end} overlaps a read-only region")]
    /// The requested range touches a protected region.
    ReadOnly {
        /// Inclusive start character offset.
        start: usize,
        /// Exclusive end character offset.
        end: usize,
    },

    #[error("buffer rejected the edit: {0}")]
    /// Host-specific rejection.
    Rejected(String),
}

/// Failure produced by the external text transformer (e.g. a code formatter).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransformError {
    /// Human-readable reason reported by the transformer.
    pub message: String,
}

impl TransformError {
    /// Create a transform error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Whole-batch failure. When returned, the buffer is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("transformer failed: {0}")]
    /// The transformer could not produce new text.
    Transform(#[from] TransformError),

    #[error("cannot split {which} text into lines: {reason}")]
    /// The old or new text has no consistent line model.
    Input {
        /// Which side failed (`"old"` or `"new"`).
        which: &'static str,
        /// Why decomposition failed.
        reason: String,
    },

    #[error("malformed edit script at op {index}: {reason}")]
    /// The script violates an op or ordering invariant.
    MalformedScript {
        /// Index of the offending op in the script as given.
        index: usize,
        /// Which invariant was violated.
        reason: String,
    },
}

/// Failure of a single op. The op is skipped; the rest of the batch proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpError {
    #[error("lines {start}..{end} are out of range (buffer has {line_count} lines)")]
    /// The op's anchor does not resolve inside the current buffer.
    OutOfRange {
        /// First line the op addresses, in current buffer coordinates.
        start: usize,
        /// Exclusive end line.
        end: usize,
        /// Current line count.
        line_count: usize,
    },

    #[error("buffer content at line {line} does not match the edit's source lines")]
    /// The located span does not hold the text the op expects to remove.
    SourceMismatch {
        /// First line the op addresses, in current buffer coordinates.
        line: usize,
    },

    #[error(transparent)]
    /// The host rejected a delete or insert.
    BufferWrite(#[from] BufferError),
}
