//! Record of what a patch batch wrote.
//!
//! A [`TextDelta`] lists the primitive deletes and inserts the patcher issued, in the order it
//! issued them. Hosts that keep incremental state (LSP sync, incremental parsing, decorations)
//! can replay it instead of diffing the buffer again.

/// One primitive mutation issued by the patcher.
///
/// A delete carries the removed text and an empty `inserted_text`; an insert the reverse. The
/// patcher never issues a combined replace, so a change op shows up as two entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDeltaEdit {
    /// Character offset in the buffer as it was just before this mutation.
    pub start: usize,
    /// Text the mutation removed.
    pub deleted_text: String,
    /// Text the mutation wrote.
    pub inserted_text: String,
}

impl TextDeltaEdit {
    /// Characters removed by this mutation.
    pub fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }
}

/// Every mutation one patch batch made, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDelta {
    /// Buffer length in characters when the batch started.
    pub before_char_count: usize,
    /// Buffer length in characters when the batch finished.
    pub after_char_count: usize,
    /// Mutations in the order they hit the buffer; skipped ops contribute nothing.
    pub edits: Vec<TextDeltaEdit>,
}

impl TextDelta {
    /// Returns `true` if the batch wrote nothing.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Replay the batch on `text` (the buffer content it started from).
    pub fn apply_to(&self, text: &str) -> String {
        let mut chars: Vec<char> = text.chars().collect();
        for edit in &self.edits {
            let start = edit.start.min(chars.len());
            let end = (edit.start + edit.deleted_len()).min(chars.len());
            chars.splice(start..end, edit.inserted_text.chars());
        }
        chars.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_delete_then_insert() {
        let delta = TextDelta {
            before_char_count: 6,
            after_char_count: 7,
            edits: vec![
                TextDeltaEdit {
                    start: 2,
                    deleted_text: "b\n".to_string(),
                    inserted_text: String::new(),
                },
                TextDeltaEdit {
                    start: 2,
                    deleted_text: String::new(),
                    inserted_text: "BB\n".to_string(),
                },
            ],
        };
        assert_eq!(delta.apply_to("a\nb\nc\n"), "a\nBB\nc\n");
        assert!(!delta.is_empty());
    }
}
