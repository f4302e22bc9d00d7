//! Outcome of one patch batch.

use crate::delta::TextDelta;
use crate::edit_script::EditKind;
use crate::error::OpError;

/// Why a batch did or did not touch the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchStatus {
    /// Patching is disabled for this buffer; nothing was read or written.
    Disabled,
    /// The new text equals the buffer content; nothing was written.
    Unchanged,
    /// Every op was applied.
    Applied,
    /// Some ops failed; the rest were applied.
    Partial,
}

/// An op the patcher had to skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpFailure {
    /// Position of the op in the schedule.
    pub index: usize,
    /// Kind of the failed op.
    pub kind: EditKind,
    /// The op's first source line, in old-text coordinates.
    pub source_line: usize,
    /// What went wrong.
    pub error: OpError,
}

/// Summary of one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    /// Overall status.
    pub status: PatchStatus,
    /// Number of ops in the schedule.
    pub scheduled: usize,
    /// Mutations performed, in application order.
    pub delta: TextDelta,
    /// Ops that were skipped.
    pub failures: Vec<OpFailure>,
}

impl PatchReport {
    pub(crate) fn untouched(status: PatchStatus, char_count: usize) -> Self {
        Self {
            status,
            scheduled: 0,
            delta: TextDelta {
                before_char_count: char_count,
                after_char_count: char_count,
                edits: Vec::new(),
            },
            failures: Vec::new(),
        }
    }

    /// Number of ops applied successfully.
    pub fn applied(&self) -> usize {
        self.scheduled - self.failures.len()
    }

    /// Returns `true` if no op failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
