//! Logical line index.
//!
//! Maps a 0-based line number to its absolute character offset and length in the current
//! buffer content. The index is built once from a text snapshot and then kept in step with the
//! buffer through [`LineIndex::splice`] after every mutation, so a lookup never observes
//! offsets from before a mutation.
//!
//! Only LF breaks lines; with CRLF the `'\r'` sits at the end of each line's span, and a lone
//! `'\r'` is content.

use crate::line_ending::{LineEnding, LineModelError};
use ropey::Rope;

/// Location of one line, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    /// Absolute character offset of the first character of the line.
    pub offset: usize,
    /// Character count of the line content (excluding the terminator).
    pub content_len: usize,
    /// Character count of the terminator (0 for an unterminated final line).
    pub terminator_len: usize,
}

impl LineSpan {
    /// Total character count including the terminator.
    pub fn len(&self) -> usize {
        self.content_len + self.terminator_len
    }

    /// Returns `true` for an empty unterminated line (never produced by [`LineIndex`]).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exclusive end offset, including the terminator.
    pub fn end(&self) -> usize {
        self.offset + self.len()
    }

    /// Whether the line is followed by a terminator.
    pub fn is_terminated(&self) -> bool {
        self.terminator_len > 0
    }
}

/// Line number to character offset mapping for one buffer.
///
/// Backed by a [`Rope`] mirror of the buffer content, so lookups and splices cost
/// O(log N) regardless of how many lines follow the edited region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineIndex {
    rope: Rope,
    ending: LineEnding,
}

impl LineIndex {
    /// Build a line index from text.
    pub fn from_text(text: &str) -> Result<Self, LineModelError> {
        let ending = LineEnding::detect_in_text(text)?.unwrap_or_default();
        Ok(Self {
            rope: Rope::from_str(text),
            ending,
        })
    }

    /// Terminator convention of the indexed text (LF when the text has none).
    pub fn ending(&self) -> LineEnding {
        self.ending
    }

    /// Get total line count.
    ///
    /// A trailing terminator does not open an extra line: `"a\n"` has one line.
    pub fn line_count(&self) -> usize {
        let lines = self.rope.len_lines();
        if self.ends_with_terminator() {
            lines - 1
        } else {
            lines
        }
    }

    /// Get total character count.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Get the span of a single line.
    pub fn span(&self, line_number: usize) -> Option<LineSpan> {
        let line_count = self.line_count();
        if line_number >= line_count {
            return None;
        }
        let offset = self.rope.line_to_char(line_number);
        let end = self.rope.line_to_char(line_number + 1);
        let terminated = line_number + 1 < line_count || self.ends_with_terminator();
        let terminator_len = if terminated { self.ending.char_len() } else { 0 };
        Some(LineSpan {
            offset,
            content_len: end - offset - terminator_len,
            terminator_len,
        })
    }

    /// Get the character offset at which `line_number` starts.
    ///
    /// `line_number == line_count()` resolves to the end of the text, which is where content
    /// appended after the last line goes.
    pub fn line_to_offset(&self, line_number: usize) -> Option<usize> {
        (line_number <= self.line_count()).then(|| self.rope.line_to_char(line_number))
    }

    /// Get the line containing `char_offset` (the end of text maps to `line_count()`).
    pub fn offset_to_line(&self, char_offset: usize) -> usize {
        if char_offset >= self.rope.len_chars() {
            return self.line_count();
        }
        self.rope.char_to_line(char_offset)
    }

    /// Resolve `count` lines starting at `start` to an `(offset, length)` pair.
    ///
    /// Returns `None` if the range does not lie inside the index.
    pub fn range(&self, start: usize, count: usize) -> Option<(usize, usize)> {
        let end = start.checked_add(count)?;
        if end > self.line_count() {
            return None;
        }
        let offset = self.rope.line_to_char(start);
        Some((offset, self.rope.line_to_char(end) - offset))
    }

    /// Whether the last line is followed by a terminator (`true` for an empty text).
    pub fn ends_with_terminator(&self) -> bool {
        let len = self.rope.len_chars();
        len == 0 || self.rope.char(len - 1) == '\n'
    }

    /// Whether any line is followed by a terminator.
    pub fn has_terminators(&self) -> bool {
        self.rope.len_lines() > 1
    }

    /// Adopt `ending` for lines added later.
    ///
    /// Returns `false`, leaving the index untouched, if the indexed text already uses a
    /// different terminator.
    pub fn assume_ending(&mut self, ending: LineEnding) -> bool {
        if self.has_terminators() && self.ending != ending {
            return false;
        }
        self.ending = ending;
        true
    }

    /// Bring the index in step with a line-granular mutation.
    ///
    /// Replaces lines `start..start + removed` with `lines` (each followed by this index's
    /// terminator, except the last one when `final_terminator` is `false`). Costs O(log N)
    /// plus the size of the replaced and inserted text; following lines are not visited.
    ///
    /// An unterminated line is only meaningful at the end of the text; the caller guarantees
    /// that.
    pub fn splice<S: AsRef<str>>(
        &mut self,
        start: usize,
        removed: usize,
        lines: &[S],
        final_terminator: bool,
    ) {
        let line_count = self.line_count();
        let start = start.min(line_count);
        let end = start.saturating_add(removed).min(line_count);
        let from = self.rope.line_to_char(start);
        let to = self.rope.line_to_char(end);
        self.rope.remove(from..to);

        let mut text = String::new();
        for (i, line) in lines.iter().enumerate() {
            text.push_str(line.as_ref());
            if final_terminator || i + 1 < lines.len() {
                text.push_str(self.ending.as_str());
            }
        }
        self.rope.insert(from, &text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_index() {
        let index = LineIndex::from_text("").unwrap();
        assert_eq!(index.line_count(), 0);
        assert_eq!(index.char_count(), 0);
        assert_eq!(index.line_to_offset(0), Some(0));
        assert!(index.ends_with_terminator());
    }

    #[test]
    fn test_from_text() {
        let text = "Line 1\nLine 2\nLine 3";
        let index = LineIndex::from_text(text).unwrap();

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.char_count(), text.chars().count());
        assert!(!index.ends_with_terminator());
    }

    #[test]
    fn test_line_to_offset() {
        let index = LineIndex::from_text("First line\nSecond line\nThird line\n").unwrap();

        assert_eq!(index.line_to_offset(0), Some(0));
        assert_eq!(index.line_to_offset(1), Some(11));
        assert_eq!(index.line_to_offset(2), Some(23));
        assert_eq!(index.line_to_offset(3), Some(34));
        assert_eq!(index.line_to_offset(4), None);
    }

    #[test]
    fn test_offset_to_line() {
        let index = LineIndex::from_text("ABC\nDEF\nGHI").unwrap();

        assert_eq!(index.offset_to_line(0), 0);
        assert_eq!(index.offset_to_line(3), 0);
        assert_eq!(index.offset_to_line(4), 1);
        assert_eq!(index.offset_to_line(8), 2);
        assert_eq!(index.offset_to_line(11), 3);
    }

    #[test]
    fn test_range() {
        let index = LineIndex::from_text("a\nbb\nccc\n").unwrap();

        assert_eq!(index.range(1, 2), Some((2, 7)));
        assert_eq!(index.range(3, 0), Some((9, 0)));
        assert_eq!(index.range(2, 2), None);
    }

    #[test]
    fn test_crlf_spans() {
        let index = LineIndex::from_text("ab\r\ncd").unwrap();

        assert_eq!(index.ending(), LineEnding::Crlf);
        assert_eq!(
            index.span(0),
            Some(LineSpan {
                offset: 0,
                content_len: 2,
                terminator_len: 2
            })
        );
        assert_eq!(index.line_to_offset(1), Some(4));
    }

    #[test]
    fn test_utf8_cjk() {
        let index = LineIndex::from_text("你好\n世界").unwrap();

        assert_eq!(index.line_count(), 2);
        assert_eq!(index.char_count(), 5);
        assert_eq!(index.line_to_offset(1), Some(3));
    }

    #[test]
    fn test_splice_matches_rebuild() {
        let mut index = LineIndex::from_text("1\n2\n3\n4\n5\n").unwrap();

        index.splice(1, 2, &["two", "three", "three and a half"], true);
        assert_eq!(
            index,
            LineIndex::from_text("1\ntwo\nthree\nthree and a half\n4\n5\n").unwrap()
        );

        index.splice(0, 1, &[] as &[&str], true);
        assert_eq!(
            index,
            LineIndex::from_text("two\nthree\nthree and a half\n4\n5\n").unwrap()
        );

        index.splice(5, 0, &["tail"], false);
        assert_eq!(
            index,
            LineIndex::from_text("two\nthree\nthree and a half\n4\n5\ntail").unwrap()
        );
    }

    #[test]
    fn test_assume_ending() {
        let mut index = LineIndex::from_text("no terminator").unwrap();
        assert!(index.assume_ending(LineEnding::Crlf));
        index.splice(0, 0, &["next"], true);
        assert_eq!(index.char_count(), "no terminator".len() + 6);

        let mut index = LineIndex::from_text("a\n").unwrap();
        assert!(!index.assume_ending(LineEnding::Crlf));
        assert_eq!(index.ending(), LineEnding::Lf);
    }

    #[test]
    fn test_lone_cr_does_not_break_lines() {
        let index = LineIndex::from_text("a\rb\nc").unwrap();
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line_to_offset(1), Some(4));
    }

    #[test]
    fn test_bottom_up_splices_match_rebuild() {
        let lines: Vec<String> = (0..2000).map(|i| format!("line {i}")).collect();
        let mut index = LineIndex::from_text(&format!("{}\n", lines.join("\n"))).unwrap();

        let mut expected = lines;
        for line in (0..2000).step_by(2).rev() {
            index.splice(line, 1, &[format!("LINE {line}"), String::new()], true);
            expected.splice(line..line + 1, [format!("LINE {line}"), String::new()]);
        }

        let rebuilt = LineIndex::from_text(&format!("{}\n", expected.join("\n"))).unwrap();
        assert_eq!(index, rebuilt);
        assert_eq!(index.line_count(), 3000);
        assert_eq!(index.line_to_offset(3), rebuilt.line_to_offset(3));
    }

    #[test]
    fn test_large_document() {
        let text = (0..10000)
            .map(|i| format!("Line {}\n", i))
            .collect::<String>();

        let index = LineIndex::from_text(&text).unwrap();
        assert_eq!(index.line_count(), 10000);
        assert_eq!(index.line_to_offset(10), Some(70));
    }
}
