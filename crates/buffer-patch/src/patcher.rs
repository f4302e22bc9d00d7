//! Buffer patcher.
//!
//! Applies a [`Schedule`] to a live [`TextBuffer`]. Each op walks
//! `Pending -> Located -> Mutated -> Done`. An op whose step fails is reported and skipped
//! while the rest of the batch continues.
//!
//! Line to offset resolution goes through one [`LineIndex`], built from the buffer when the
//! batch starts and spliced after every primitive mutation, so every lookup sees the buffer
//! as it is right now.

use crate::buffer::TextBuffer;
use crate::delta::{TextDelta, TextDeltaEdit};
use crate::edit_script::EditOp;
use crate::error::{OpError, PatchError};
use crate::line_ending::LineEnding;
use crate::line_index::LineIndex;
use crate::report::{OpFailure, PatchReport, PatchStatus};
use crate::scheduler::{ApplyOrder, Schedule};

/// Resolved location of an op's source lines in the current buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Location {
    line: usize,
    offset: usize,
    length: usize,
}

#[derive(Debug)]
enum OpState {
    Pending,
    Located(Location),
    Mutated,
    Done,
}

/// Applies ops to one borrowed buffer.
pub struct BufferPatcher<'a, B: TextBuffer + ?Sized> {
    buffer: &'a mut B,
    index: LineIndex,
    order: ApplyOrder,
    original_line_count: usize,
    before_char_count: usize,
    edits: Vec<TextDeltaEdit>,
}

impl<'a, B: TextBuffer + ?Sized> BufferPatcher<'a, B> {
    /// Index `buffer` and prepare to apply ops arranged in `order`, written in `ending`.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::Input`] if the buffer content has no consistent line model or
    /// uses a different terminator than the ops.
    pub fn new(buffer: &'a mut B, order: ApplyOrder, ending: LineEnding) -> Result<Self, PatchError> {
        let mut index = LineIndex::from_text(&buffer.read_all()).map_err(|err| {
            PatchError::Input {
                which: "old",
                reason: err.to_string(),
            }
        })?;
        if !index.assume_ending(ending) {
            return Err(PatchError::Input {
                which: "old",
                reason: format!(
                    "buffer uses {:?} terminators but the edits use {:?}",
                    index.ending(),
                    ending
                ),
            });
        }

        Ok(Self {
            buffer,
            original_line_count: index.line_count(),
            before_char_count: index.char_count(),
            index,
            order,
            edits: Vec::new(),
        })
    }

    /// The index as of the last mutation.
    pub fn line_index(&self) -> &LineIndex {
        &self.index
    }

    /// Apply a single op.
    ///
    /// # Errors
    ///
    /// - [`OpError::OutOfRange`] if the op's lines do not resolve in the current buffer.
    /// - [`OpError::SourceMismatch`] if the buffer does not hold the op's source lines.
    /// - [`OpError::BufferWrite`] if the host rejects the delete or insert.
    pub fn apply_op(&mut self, op: &EditOp) -> Result<(), OpError> {
        let mut state = OpState::Pending;
        loop {
            state = match state {
                OpState::Pending => OpState::Located(self.locate(op)?),
                OpState::Located(location) => {
                    self.mutate(op, location)?;
                    OpState::Mutated
                }
                OpState::Mutated => OpState::Done,
                OpState::Done => return Ok(()),
            };
            tracing::trace!(kind = ?op.kind, line = op.source.start_line, ?state, "edit op");
        }
    }

    /// Finish the batch, returning the mutations performed.
    pub fn into_delta(self) -> TextDelta {
        TextDelta {
            before_char_count: self.before_char_count,
            after_char_count: self.index.char_count(),
            edits: self.edits,
        }
    }

    /// Current line of `op`'s anchor.
    ///
    /// In descending order nothing above the anchor has changed yet. In ascending order every
    /// earlier mutation lies above it, so the anchor moved by exactly the net line count
    /// change so far.
    fn current_line(&self, op: &EditOp) -> Option<usize> {
        match self.order {
            ApplyOrder::Descending => Some(op.source.start_line),
            ApplyOrder::AscendingWithShift => {
                let shift = self.index.line_count() as isize - self.original_line_count as isize;
                op.source.start_line.checked_add_signed(shift)
            }
        }
    }

    fn locate(&self, op: &EditOp) -> Result<Location, OpError> {
        let line_count = self.index.line_count();
        let count = op.source.line_count();
        let out_of_range = |start: usize| OpError::OutOfRange {
            start,
            end: start + count,
            line_count,
        };

        let line = self
            .current_line(op)
            .ok_or_else(|| out_of_range(op.source.start_line))?;
        let (offset, length) = self.index.range(line, count).ok_or_else(|| out_of_range(line))?;

        if !op.target.is_empty() {
            // New lines must start on a line boundary, and an unterminated last line can only
            // be written at the very end of the buffer.
            let appends = line + count == line_count;
            if appends && count == 0 && !self.index.ends_with_terminator() {
                return Err(out_of_range(line));
            }
            if !op.target.final_terminator && !appends {
                return Err(out_of_range(line));
            }
        }

        if count > 0 {
            let ending = self.index.ending();
            let expected = op.source.to_text(ending);
            let matches = length == op.source.char_len(ending)
                && self.buffer.text_range(offset, length).as_deref() == Some(expected.as_str());
            if !matches {
                return Err(OpError::SourceMismatch { line });
            }
        }

        Ok(Location {
            line,
            offset,
            length,
        })
    }

    fn mutate(&mut self, op: &EditOp, location: Location) -> Result<(), OpError> {
        let ending = self.index.ending();
        let Location {
            line,
            offset,
            length,
        } = location;

        if !op.source.is_empty() {
            self.buffer.delete(offset, length)?;
            self.index
                .splice(line, op.source.line_count(), &[] as &[&str], true);
            self.edits.push(TextDeltaEdit {
                start: offset,
                deleted_text: op.source.to_text(ending),
                inserted_text: String::new(),
            });
        }

        if !op.target.is_empty() {
            let offset = self.index.line_to_offset(line).ok_or(OpError::OutOfRange {
                start: line,
                end: line,
                line_count: self.index.line_count(),
            })?;
            let text = op.target.to_text(ending);
            self.buffer.insert(offset, &text)?;
            self.index
                .splice(line, 0, &op.target.lines, op.target.final_terminator);
            self.edits.push(TextDeltaEdit {
                start: offset,
                deleted_text: String::new(),
                inserted_text: text,
            });
        }

        Ok(())
    }
}

/// Apply every op of `schedule` to `buffer` as one grouped mutation.
///
/// Per-op failures are logged, collected in the report, and do not stop the batch.
///
/// # Errors
///
/// Returns [`PatchError::Input`] before touching the buffer if its content cannot be indexed
/// under the schedule's terminator convention.
pub fn apply<B: TextBuffer + ?Sized>(
    buffer: &mut B,
    schedule: &Schedule,
) -> Result<PatchReport, PatchError> {
    if schedule.is_empty() {
        return Ok(PatchReport::untouched(
            PatchStatus::Unchanged,
            buffer.char_count(),
        ));
    }

    let mut patcher = BufferPatcher::new(&mut *buffer, schedule.order(), schedule.ending())?;
    let mut failures = Vec::new();

    patcher.buffer.begin_group();
    for (index, op) in schedule.ops().iter().enumerate() {
        if let Err(error) = patcher.apply_op(op) {
            tracing::warn!(
                index,
                kind = ?op.kind,
                line = op.source.start_line,
                %error,
                "skipping edit op"
            );
            failures.push(OpFailure {
                index,
                kind: op.kind,
                source_line: op.source.start_line,
                error,
            });
        }
    }
    patcher.buffer.end_group();

    let delta = patcher.into_delta();
    let status = if failures.is_empty() {
        PatchStatus::Applied
    } else {
        PatchStatus::Partial
    };
    tracing::info!(
        scheduled = schedule.len(),
        failed = failures.len(),
        before_chars = delta.before_char_count,
        after_chars = delta.after_char_count,
        "patch batch finished"
    );

    Ok(PatchReport {
        status,
        scheduled: schedule.len(),
        delta,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit_script::{EditScript, LineRange};
    use crate::rope_buffer::RopeBuffer;
    use crate::scheduler::schedule;

    fn run(text: &str, ops: Vec<EditOp>, order: ApplyOrder) -> (RopeBuffer, PatchReport) {
        let mut buffer = RopeBuffer::new(text);
        let schedule = schedule(EditScript::from_ops(ops, LineEnding::Lf), order).unwrap();
        let report = apply(&mut buffer, &schedule).unwrap();
        (buffer, report)
    }

    #[test]
    fn test_change_single_line() {
        let ops = vec![EditOp::change(
            LineRange::new(1, ["b"]),
            LineRange::new(1, ["B"]),
        )];
        let (buffer, report) = run("a\nb\nc\nd\n", ops, ApplyOrder::Descending);
        assert_eq!(buffer.text(), "a\nB\nc\nd\n");
        assert_eq!(report.status, PatchStatus::Applied);
        assert_eq!(report.delta.edits.len(), 2);
    }

    #[test]
    fn test_insert_goes_before_anchor_line() {
        let ops = vec![EditOp::insert(2, LineRange::new(2, ["X"]))];
        let (buffer, _) = run("a\nb\nc\n", ops, ApplyOrder::Descending);
        assert_eq!(buffer.text(), "a\nb\nX\nc\n");
    }

    #[test]
    fn test_insert_at_end() {
        let ops = vec![EditOp::insert(3, LineRange::new(3, ["d"]).without_final_terminator())];
        let (buffer, _) = run("a\nb\nc\n", ops, ApplyOrder::Descending);
        assert_eq!(buffer.text(), "a\nb\nc\nd");
    }

    #[test]
    fn test_multi_line_delete() {
        let ops = vec![EditOp::delete(LineRange::new(1, ["bb", "ccc"]), 1)];
        let (buffer, report) = run("a\nbb\nccc\nd\n", ops, ApplyOrder::Descending);
        assert_eq!(buffer.text(), "a\nd\n");
        assert_eq!(report.delta.edits[0].deleted_len(), 7);
    }

    #[test]
    fn test_stale_anchor_is_out_of_range() {
        let ops = vec![EditOp::delete(LineRange::new(5, ["x"]), 5)];
        let (buffer, report) = run("a\nb\n", ops, ApplyOrder::Descending);
        assert_eq!(buffer.text(), "a\nb\n");
        assert_eq!(report.status, PatchStatus::Partial);
        assert!(matches!(
            report.failures[0].error,
            OpError::OutOfRange { start: 5, .. }
        ));
    }

    #[test]
    fn test_source_mismatch_keeps_content() {
        let ops = vec![EditOp::change(
            LineRange::new(0, ["not a"]),
            LineRange::new(0, ["A"]),
        )];
        let (buffer, report) = run("a\nb\n", ops, ApplyOrder::Descending);
        assert_eq!(buffer.text(), "a\nb\n");
        assert_eq!(report.failures[0].error, OpError::SourceMismatch { line: 0 });
    }

    #[test]
    fn test_missing_terminator_is_a_mismatch() {
        let ops = vec![EditOp::delete(
            LineRange::new(1, ["b"]).without_final_terminator(),
            1,
        )];
        let (buffer, report) = run("a\nb\n", ops, ApplyOrder::Descending);
        assert_eq!(buffer.text(), "a\nb\n");
        assert!(!report.is_complete());
    }

    #[test]
    fn test_terminator_mismatch_aborts_before_mutation() {
        let mut buffer = RopeBuffer::new("a\r\nb\r\n");
        let ops = vec![EditOp::insert(0, LineRange::new(0, ["x"]))];
        let schedule = schedule(
            EditScript::from_ops(ops, LineEnding::Lf),
            ApplyOrder::Descending,
        )
        .unwrap();
        let err = apply(&mut buffer, &schedule).unwrap_err();
        assert!(matches!(err, PatchError::Input { .. }));
        assert_eq!(buffer.text(), "a\r\nb\r\n");
    }

    #[test]
    fn test_index_tracks_buffer() {
        let mut buffer = RopeBuffer::new("1\n2\n3\n");
        let mut patcher =
            BufferPatcher::new(&mut buffer, ApplyOrder::Descending, LineEnding::Lf).unwrap();
        patcher
            .apply_op(&EditOp::change(
                LineRange::new(1, ["2"]),
                LineRange::new(1, ["two", "deux"]),
            ))
            .unwrap();
        let index = patcher.line_index().clone();
        assert_eq!(index, LineIndex::from_text("1\ntwo\ndeux\n3\n").unwrap());
        assert_eq!(buffer.text(), "1\ntwo\ndeux\n3\n");
    }
}
