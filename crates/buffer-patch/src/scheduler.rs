//! Batch scheduling.
//!
//! Every op of an [`EditScript`] is expressed in the old text's line numbering. Applying the
//! ops bottom-of-buffer first ([`ApplyOrder::Descending`]) keeps every op that is still
//! pending strictly above the region just mutated, so its line numbers stay valid without any
//! bookkeeping. [`ApplyOrder::AscendingWithShift`] applies top-down and adds the accumulated
//! line shift to each lookup instead; both orders yield the same text.

use crate::edit_script::{EditKind, EditOp, EditScript};
use crate::error::PatchError;
use crate::line_ending::LineEnding;
use serde::{Deserialize, Serialize};

/// Order in which a [`Schedule`] applies its ops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOrder {
    /// Bottom-most op first. Needs no shift state.
    #[default]
    Descending,
    /// Top-most op first, compensating every lookup with the accumulated line shift.
    AscendingWithShift,
}

/// A validated, ordered batch of ops ready for the patcher.
///
/// Only [`schedule`] constructs one, so holding a `Schedule` means the script passed the
/// overlap and consistency checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    ops: Vec<EditOp>,
    order: ApplyOrder,
    ending: LineEnding,
}

impl Schedule {
    /// Ops in application order.
    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    /// The order the ops were arranged in.
    pub fn order(&self) -> ApplyOrder {
        self.order
    }

    /// Terminator convention of the ops.
    pub fn ending(&self) -> LineEnding {
        self.ending
    }

    /// Number of ops.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if there is nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Validate `script` and arrange its ops for application in `order`.
///
/// # Errors
///
/// Returns [`PatchError::MalformedScript`] if an op's kind does not match its ranges, if an
/// op is empty, or if two ops overlap or share an anchor.
pub fn schedule(script: EditScript, order: ApplyOrder) -> Result<Schedule, PatchError> {
    let ending = script.ending();
    let mut indexed: Vec<(usize, EditOp)> = script.into_ops().into_iter().enumerate().collect();

    for (index, op) in &indexed {
        validate_op(*index, op)?;
    }

    indexed.sort_by_key(|(_, op)| op.source.start_line);
    for pair in indexed.windows(2) {
        let (_, previous) = &pair[0];
        let (index, current) = &pair[1];
        if current.source.start_line <= previous.source.start_line {
            return Err(malformed(
                *index,
                format!(
                    "shares anchor line {} with another op",
                    current.source.start_line
                ),
            ));
        }
        if is_open_ended(previous) {
            return Err(malformed(
                *index,
                "follows an op that ends at an unterminated final line",
            ));
        }
        if current.source.start_line < previous.source.end_line() {
            return Err(malformed(
                *index,
                format!(
                    "source starting at line {} overlaps lines {}..{}",
                    current.source.start_line,
                    previous.source.start_line,
                    previous.source.end_line()
                ),
            ));
        }
    }

    let mut ops: Vec<EditOp> = indexed.into_iter().map(|(_, op)| op).collect();
    if order == ApplyOrder::Descending {
        ops.reverse();
    }

    tracing::debug!(ops = ops.len(), ?order, "scheduled edit script");

    Ok(Schedule {
        ops,
        order,
        ending,
    })
}

fn validate_op(index: usize, op: &EditOp) -> Result<(), PatchError> {
    let (source_empty, target_empty) = (op.source.is_empty(), op.target.is_empty());
    match op.kind {
        EditKind::Insert if !source_empty => {
            return Err(malformed(index, "insert carries source lines"));
        }
        EditKind::Insert if target_empty => {
            return Err(malformed(index, "insert has no target lines"));
        }
        EditKind::Delete if !target_empty => {
            return Err(malformed(index, "delete carries target lines"));
        }
        EditKind::Delete if source_empty => {
            return Err(malformed(index, "delete has no source lines"));
        }
        EditKind::Change if source_empty || target_empty => {
            return Err(malformed(index, "change needs both source and target lines"));
        }
        _ => {}
    }

    if op.kind == EditKind::Change
        && op.source.lines == op.target.lines
        && op.source.final_terminator == op.target.final_terminator
    {
        return Err(malformed(index, "change describes an equal region"));
    }
    Ok(())
}

/// Whether `op` touches the unterminated final line of either text.
fn is_open_ended(op: &EditOp) -> bool {
    (!op.source.is_empty() && !op.source.final_terminator)
        || (!op.target.is_empty() && !op.target.final_terminator)
}

fn malformed(index: usize, reason: impl Into<String>) -> PatchError {
    PatchError::MalformedScript {
        index,
        reason: reason.into(),
    }
}
