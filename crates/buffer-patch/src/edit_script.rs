//! Line-level edit scripts.
//!
//! An [`EditScript`] is the minimal set of [`EditOp`]s that turns an old text into a new one.
//! Every op is anchored in the coordinate space of the *old* text; regions that are equal in
//! both texts never produce an op.
//!
//! The diff itself is delegated to [`similar`]; this module owns the op contract and the
//! adapter from `similar`'s output to it.

use crate::error::PatchError;
use crate::line_ending::{Line, LineEnding, TextLines};
use serde::{Deserialize, Serialize};
use similar::{Algorithm, DiffOp};
use std::time::Instant;

/// A contiguous block of lines in either the old or the new text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRange {
    /// 0-based line number of the first line.
    pub start_line: usize,
    /// Line contents, without terminators.
    pub lines: Vec<String>,
    /// Whether the last line of the range is followed by a terminator.
    ///
    /// Only a range that ends at the final line of an unterminated text has this set to
    /// `false`.
    pub final_terminator: bool,
}

impl LineRange {
    /// Create a range whose lines are all terminated.
    pub fn new<S: Into<String>>(start_line: usize, lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            start_line,
            lines: lines.into_iter().map(Into::into).collect(),
            final_terminator: true,
        }
    }

    /// Create an empty range anchored at `start_line`.
    pub fn empty(start_line: usize) -> Self {
        Self::new(start_line, Vec::<String>::new())
    }

    /// Mark the last line as unterminated.
    pub fn without_final_terminator(mut self) -> Self {
        self.final_terminator = false;
        self
    }

    /// Number of lines in the range.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if the range holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Exclusive end line.
    pub fn end_line(&self) -> usize {
        self.start_line + self.lines.len()
    }

    /// Character count of the range once written with `ending`.
    ///
    /// Each line counts its content plus one terminator, except an unterminated final line.
    pub fn char_len(&self, ending: LineEnding) -> usize {
        let content: usize = self.lines.iter().map(|line| line.chars().count()).sum();
        let mut terminators = self.lines.len();
        if !self.final_terminator && terminators > 0 {
            terminators -= 1;
        }
        content + terminators * ending.char_len()
    }

    /// Render the range as text, each line followed by `ending`.
    pub fn to_text(&self, ending: LineEnding) -> String {
        let mut text = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            text.push_str(line);
            if self.final_terminator || i + 1 < self.lines.len() {
                text.push_str(ending.as_str());
            }
        }
        text
    }

    fn from_lines(start_line: usize, lines: &[Line<'_>]) -> Self {
        Self {
            start_line,
            lines: lines.iter().map(|line| line.content.to_string()).collect(),
            final_terminator: lines.last().is_none_or(|line| line.terminated),
        }
    }
}

/// What an [`EditOp`] does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// Add `target` lines before `source.start_line`.
    Insert,
    /// Remove `source` lines.
    Delete,
    /// Remove `source` lines, then add `target` lines at the same place.
    Change,
}

/// One edit, anchored in the old text's line numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOp {
    /// Kind of edit.
    pub kind: EditKind,
    /// Lines in the old text (empty for [`EditKind::Insert`]; its `start_line` is the
    /// insertion point).
    pub source: LineRange,
    /// Lines in the new text (empty for [`EditKind::Delete`]).
    pub target: LineRange,
}

impl EditOp {
    /// Insert `target` lines immediately before old line `at`.
    pub fn insert(at: usize, target: LineRange) -> Self {
        Self {
            kind: EditKind::Insert,
            source: LineRange::empty(at),
            target,
        }
    }

    /// Delete `source` lines. `target_line` is where the removed lines would have been in the
    /// new text.
    pub fn delete(source: LineRange, target_line: usize) -> Self {
        Self {
            kind: EditKind::Delete,
            source,
            target: LineRange::empty(target_line),
        }
    }

    /// Replace `source` lines with `target` lines.
    pub fn change(source: LineRange, target: LineRange) -> Self {
        Self {
            kind: EditKind::Change,
            source,
            target,
        }
    }

    /// Net change in line count once the op is applied.
    pub fn line_delta(&self) -> isize {
        self.target.line_count() as isize - self.source.line_count() as isize
    }
}

/// Line diff algorithm used by [`compute_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffAlgorithm {
    /// Myers' O(ND) algorithm.
    #[default]
    Myers,
    /// Patience diff.
    Patience,
    /// Classic longest common subsequence.
    Lcs,
}

impl From<DiffAlgorithm> for Algorithm {
    fn from(algorithm: DiffAlgorithm) -> Self {
        match algorithm {
            DiffAlgorithm::Myers => Algorithm::Myers,
            DiffAlgorithm::Patience => Algorithm::Patience,
            DiffAlgorithm::Lcs => Algorithm::Lcs,
        }
    }
}

/// Ordered ops transforming an old text into a new one.
///
/// Ops are non-overlapping and strictly increasing by `source.start_line`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    ops: Vec<EditOp>,
    ending: LineEnding,
}

impl EditScript {
    /// Wrap ops that were produced elsewhere. They are validated when scheduled.
    pub fn from_ops(ops: Vec<EditOp>, ending: LineEnding) -> Self {
        Self { ops, ending }
    }

    /// Ops in old-text order.
    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    /// Terminator convention the ops are written in.
    pub fn ending(&self) -> LineEnding {
        self.ending
    }

    /// Number of ops.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` when old and new text were identical.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consume the script, yielding its ops.
    pub fn into_ops(self) -> Vec<EditOp> {
        self.ops
    }
}

/// Compute the edit script from `old_text` to `new_text` using Myers' diff.
pub fn compute(old_text: &str, new_text: &str) -> Result<EditScript, PatchError> {
    compute_with(old_text, new_text, DiffAlgorithm::default())
}

/// Compute the edit script from `old_text` to `new_text` with the given algorithm.
pub fn compute_with(
    old_text: &str,
    new_text: &str,
    algorithm: DiffAlgorithm,
) -> Result<EditScript, PatchError> {
    compute_with_deadline(old_text, new_text, algorithm, None)
}

/// Compute the edit script, giving up on minimality once `deadline` has passed.
///
/// Past the deadline the diff falls back to coarser hunks. The script still turns `old_text`
/// into `new_text` exactly; it may just rewrite lines that were equal.
pub fn compute_with_deadline(
    old_text: &str,
    new_text: &str,
    algorithm: DiffAlgorithm,
    deadline: Option<Instant>,
) -> Result<EditScript, PatchError> {
    let old = TextLines::parse(old_text).map_err(|err| PatchError::Input {
        which: "old",
        reason: err.to_string(),
    })?;
    let new = TextLines::parse(new_text).map_err(|err| PatchError::Input {
        which: "new",
        reason: err.to_string(),
    })?;

    let ending = match (old.ending, new.ending) {
        (Some(old_ending), Some(new_ending)) if old_ending != new_ending => {
            return Err(PatchError::Input {
                which: "new",
                reason: format!(
                    "terminator {:?} differs from the old text's {:?}",
                    new_ending, old_ending
                ),
            });
        }
        (Some(ending), _) | (None, Some(ending)) => ending,
        (None, None) => LineEnding::default(),
    };

    let diff = similar::capture_diff_slices_deadline(
        algorithm.into(),
        &old.lines,
        &new.lines,
        deadline,
    );

    // Coalesce every run of non-equal diff ops into one hunk so that no two ops share an
    // anchor.
    let mut ops = Vec::new();
    let mut hunk: Option<Hunk> = None;
    for op in &diff {
        match *op {
            DiffOp::Equal { .. } => {
                if let Some(hunk) = hunk.take() {
                    ops.push(hunk.into_op(&old.lines, &new.lines));
                }
            }
            DiffOp::Delete {
                old_index,
                old_len,
                new_index,
            } => Hunk::extend(&mut hunk, old_index, old_len, new_index, 0),
            DiffOp::Insert {
                old_index,
                new_index,
                new_len,
            } => Hunk::extend(&mut hunk, old_index, 0, new_index, new_len),
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => Hunk::extend(&mut hunk, old_index, old_len, new_index, new_len),
        }
    }
    if let Some(hunk) = hunk {
        ops.push(hunk.into_op(&old.lines, &new.lines));
    }

    tracing::debug!(
        ops = ops.len(),
        old_lines = old.lines.len(),
        new_lines = new.lines.len(),
        "computed edit script"
    );

    Ok(EditScript { ops, ending })
}

/// A run of adjacent non-equal lines, as half-open ranges in both texts.
struct Hunk {
    old_start: usize,
    old_end: usize,
    new_start: usize,
    new_end: usize,
}

impl Hunk {
    fn extend(
        hunk: &mut Option<Hunk>,
        old_index: usize,
        old_len: usize,
        new_index: usize,
        new_len: usize,
    ) {
        match hunk {
            Some(hunk) => {
                hunk.old_end = hunk.old_end.max(old_index + old_len);
                hunk.new_end = hunk.new_end.max(new_index + new_len);
            }
            None => {
                *hunk = Some(Hunk {
                    old_start: old_index,
                    old_end: old_index + old_len,
                    new_start: new_index,
                    new_end: new_index + new_len,
                });
            }
        }
    }

    fn into_op(self, old: &[Line<'_>], new: &[Line<'_>]) -> EditOp {
        let source = LineRange::from_lines(self.old_start, &old[self.old_start..self.old_end]);
        let target = LineRange::from_lines(self.new_start, &new[self.new_start..self.new_end]);
        match (source.is_empty(), target.is_empty()) {
            (true, _) => EditOp {
                kind: EditKind::Insert,
                source,
                target,
            },
            (false, true) => EditOp {
                kind: EditKind::Delete,
                source,
                target,
            },
            (false, false) => EditOp::change(source, target),
        }
    }
}
