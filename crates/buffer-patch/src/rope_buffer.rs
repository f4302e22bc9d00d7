//! In-memory reference host.
//!
//! [`RopeBuffer`] implements [`TextBuffer`] over a [`ropey::Rope`] with character offsets. It
//! supports read-only regions (to exercise write rejection) and grouped undo/redo, where one
//! [`RopeBuffer::undo`] reverts everything recorded between `begin_group` and `end_group`.

use crate::buffer::TextBuffer;
use crate::error::BufferError;
use ropey::Rope;
use std::ops::Range;

#[derive(Debug, Clone)]
struct RecordedEdit {
    offset: usize,
    deleted_text: String,
    inserted_text: String,
}

#[derive(Debug, Clone)]
struct UndoStep {
    group_id: usize,
    edit: RecordedEdit,
}

#[derive(Debug)]
struct UndoRedoManager {
    undo_stack: Vec<UndoStep>,
    redo_stack: Vec<UndoStep>,
    next_group_id: usize,
    open_group_id: Option<usize>,
    open_depth: usize,
}

impl UndoRedoManager {
    fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            next_group_id: 0,
            open_group_id: None,
            open_depth: 0,
        }
    }

    fn allocate_group_id(&mut self) -> usize {
        let id = self.next_group_id;
        self.next_group_id = self.next_group_id.wrapping_add(1);
        id
    }

    fn begin_group(&mut self) {
        if self.open_depth == 0 {
            self.open_group_id = Some(self.allocate_group_id());
        }
        self.open_depth += 1;
    }

    fn end_group(&mut self) {
        self.open_depth = self.open_depth.saturating_sub(1);
        if self.open_depth == 0 {
            self.open_group_id = None;
        }
    }

    fn push(&mut self, edit: RecordedEdit) {
        self.redo_stack.clear();
        let group_id = match self.open_group_id {
            Some(id) => id,
            None => self.allocate_group_id(),
        };
        self.undo_stack.push(UndoStep { group_id, edit });
    }

    fn pop_group(stack: &mut Vec<UndoStep>) -> Option<Vec<UndoStep>> {
        let last_group_id = stack.last().map(|s| s.group_id)?;
        let mut steps: Vec<UndoStep> = Vec::new();

        while let Some(step) = stack.pop_if(|step| step.group_id == last_group_id) {
            steps.push(step);
        }

        Some(steps)
    }
}

/// A rope-backed text buffer with character offsets.
#[derive(Debug)]
pub struct RopeBuffer {
    rope: Rope,
    read_only: Vec<Range<usize>>,
    undo_redo: UndoRedoManager,
}

impl RopeBuffer {
    /// Create a buffer holding `text`.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            read_only: Vec::new(),
            undo_redo: UndoRedoManager::new(),
        }
    }

    /// Get complete text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Protect a character range from edits. The range moves with edits made before it.
    pub fn protect(&mut self, range: Range<usize>) {
        self.read_only.push(range);
    }

    /// Whether there is a group to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_redo.undo_stack.is_empty()
    }

    /// Whether there is a group to redo.
    pub fn can_redo(&self) -> bool {
        !self.undo_redo.redo_stack.is_empty()
    }

    /// Number of recorded primitive edits on the undo stack.
    pub fn undo_depth(&self) -> usize {
        self.undo_redo.undo_stack.len()
    }

    /// Revert the most recent group. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(steps) = UndoRedoManager::pop_group(&mut self.undo_redo.undo_stack) else {
            return false;
        };

        // Steps come off the stack newest first, which is the order they must be reverted in.
        for step in steps {
            let edit = &step.edit;
            self.rope
                .remove(edit.offset..edit.offset + edit.inserted_text.chars().count());
            self.rope.insert(edit.offset, &edit.deleted_text);
            self.undo_redo.redo_stack.push(step);
        }
        true
    }

    /// Re-apply the most recently undone group. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(steps) = UndoRedoManager::pop_group(&mut self.undo_redo.redo_stack) else {
            return false;
        };

        for step in steps {
            let edit = &step.edit;
            self.rope
                .remove(edit.offset..edit.offset + edit.deleted_text.chars().count());
            self.rope.insert(edit.offset, &edit.inserted_text);
            self.undo_redo.undo_stack.push(step);
        }
        true
    }

    fn check_bounds(&self, offset: usize, length: usize) -> Result<(), BufferError> {
        let len = self.rope.len_chars();
        match offset.checked_add(length) {
            Some(end) if end <= len => Ok(()),
            _ => Err(BufferError::OutOfBounds {
                offset,
                length,
                len,
            }),
        }
    }

    fn check_writable(&self, start: usize, end: usize) -> Result<(), BufferError> {
        let touches = |range: &Range<usize>| {
            if start == end {
                range.start < start && start < range.end
            } else {
                start < range.end && range.start < end
            }
        };
        match self.read_only.iter().find(|range| touches(range)) {
            Some(_) => Err(BufferError::ReadOnly { start, end }),
            None => Ok(()),
        }
    }

    fn shift_protected(&mut self, at: usize, removed: usize, inserted: usize) {
        for range in &mut self.read_only {
            if range.start >= at + removed {
                range.start = range.start - removed + inserted;
                range.end = range.end - removed + inserted;
            }
        }
    }
}

impl Default for RopeBuffer {
    fn default() -> Self {
        Self::new("")
    }
}

impl TextBuffer for RopeBuffer {
    fn read_all(&self) -> String {
        self.rope.to_string()
    }

    fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    fn text_range(&self, offset: usize, length: usize) -> Option<String> {
        self.check_bounds(offset, length).ok()?;
        Some(self.rope.slice(offset..offset + length).to_string())
    }

    fn delete(&mut self, offset: usize, length: usize) -> Result<(), BufferError> {
        self.check_bounds(offset, length)?;
        self.check_writable(offset, offset + length)?;
        if length == 0 {
            return Ok(());
        }

        let deleted_text = self.rope.slice(offset..offset + length).to_string();
        self.rope.remove(offset..offset + length);
        self.shift_protected(offset, length, 0);
        self.undo_redo.push(RecordedEdit {
            offset,
            deleted_text,
            inserted_text: String::new(),
        });
        Ok(())
    }

    fn insert(&mut self, offset: usize, text: &str) -> Result<(), BufferError> {
        self.check_bounds(offset, 0)?;
        self.check_writable(offset, offset)?;
        if text.is_empty() {
            return Ok(());
        }

        self.rope.insert(offset, text);
        let inserted = text.chars().count();
        self.shift_protected(offset, 0, inserted);
        self.undo_redo.push(RecordedEdit {
            offset,
            deleted_text: String::new(),
            inserted_text: text.to_string(),
        });
        Ok(())
    }

    fn begin_group(&mut self) {
        self.undo_redo.begin_group();
    }

    fn end_group(&mut self) {
        self.undo_redo.end_group();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_delete() {
        let mut buffer = RopeBuffer::new("Hello World");

        buffer.insert(6, "Beautiful ").unwrap();
        assert_eq!(buffer.text(), "Hello Beautiful World");

        buffer.delete(6, 10).unwrap();
        assert_eq!(buffer.text(), "Hello World");
    }

    #[test]
    fn test_out_of_bounds() {
        let mut buffer = RopeBuffer::new("abc");
        assert_eq!(
            buffer.delete(2, 5),
            Err(BufferError::OutOfBounds {
                offset: 2,
                length: 5,
                len: 3
            })
        );
        assert!(buffer.insert(4, "x").is_err());
        assert_eq!(buffer.text_range(1, 2).as_deref(), Some("bc"));
        assert_eq!(buffer.text_range(2, 2), None);
    }

    #[test]
    fn test_read_only_region() {
        let mut buffer = RopeBuffer::new("aaa\nbbb\nccc\n");
        buffer.protect(4..8);

        assert!(matches!(
            buffer.delete(5, 1),
            Err(BufferError::ReadOnly { .. })
        ));
        assert!(buffer.insert(6, "x").is_err());
        // The boundaries of a protected region stay writable for insertion.
        buffer.insert(4, "new\n").unwrap();
        assert_eq!(buffer.text(), "aaa\nnew\nbbb\nccc\n");
        // The region moved with the insertion before it.
        assert!(buffer.delete(8, 4).is_err());
        buffer.delete(0, 4).unwrap();
        assert_eq!(buffer.text(), "new\nbbb\nccc\n");
    }

    #[test]
    fn test_grouped_undo_redo() {
        let mut buffer = RopeBuffer::new("a\nb\nc\n");

        buffer.begin_group();
        buffer.delete(2, 2).unwrap();
        buffer.insert(2, "B\n").unwrap();
        buffer.insert(0, "top\n").unwrap();
        buffer.end_group();
        assert_eq!(buffer.text(), "top\na\nB\nc\n");
        assert_eq!(buffer.undo_depth(), 3);

        assert!(buffer.undo());
        assert_eq!(buffer.text(), "a\nb\nc\n");
        assert!(!buffer.can_undo());

        assert!(buffer.redo());
        assert_eq!(buffer.text(), "top\na\nB\nc\n");
        assert!(!buffer.can_redo());
    }

    #[test]
    fn test_ungrouped_edits_undo_one_at_a_time() {
        let mut buffer = RopeBuffer::new("");
        buffer.insert(0, "a").unwrap();
        buffer.insert(1, "b").unwrap();

        assert!(buffer.undo());
        assert_eq!(buffer.text(), "a");
        assert!(buffer.undo());
        assert_eq!(buffer.text(), "");
        assert!(!buffer.undo());
    }
}
