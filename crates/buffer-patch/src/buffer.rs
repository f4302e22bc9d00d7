//! Host buffer capability.
//!
//! The patcher never owns the buffer. It borrows anything implementing [`TextBuffer`] for the
//! duration of one batch. All offsets and lengths are in characters (Unicode scalar values).

pub use crate::error::BufferError;

/// A live, mutable text container supplied by the editor/document layer.
pub trait TextBuffer {
    /// Complete current content.
    fn read_all(&self) -> String;

    /// Current length in characters.
    fn char_count(&self) -> usize {
        self.read_all().chars().count()
    }

    /// Text of `length` characters starting at `offset`, or `None` if the range does not fit.
    fn text_range(&self, offset: usize, length: usize) -> Option<String> {
        let text = self.read_all();
        let end = offset.checked_add(length)?;
        if end > text.chars().count() {
            return None;
        }
        Some(text.chars().skip(offset).take(length).collect())
    }

    /// Remove `length` characters starting at `offset`.
    fn delete(&mut self, offset: usize, length: usize) -> Result<(), BufferError>;

    /// Insert `text` at `offset`.
    fn insert(&mut self, offset: usize, text: &str) -> Result<(), BufferError>;

    /// Start a group of mutations that the host should treat as one unit (e.g. one undo step).
    fn begin_group(&mut self) {}

    /// Close the group opened by [`TextBuffer::begin_group`].
    fn end_group(&mut self) {}
}
