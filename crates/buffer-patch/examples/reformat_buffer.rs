use buffer_patch::{PatchConfig, PatchStatus, Reformatter, RopeBuffer, TransformError};

/// A toy formatter: trims trailing whitespace and re-indents with four spaces per brace level.
fn format_braces(text: &str) -> Result<String, TransformError> {
    let mut depth: usize = 0;
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('}') {
            depth = depth
                .checked_sub(1)
                .ok_or_else(|| TransformError::new("unbalanced braces"))?;
        }
        if !trimmed.is_empty() {
            out.push_str(&"    ".repeat(depth));
            out.push_str(trimmed);
        }
        out.push('\n');
        if trimmed.ends_with('{') {
            depth += 1;
        }
    }
    Ok(out)
}

fn main() {
    let mut buffer = RopeBuffer::new("fn main() {\nlet a = 1;   \n    let b = 2;\n}\n");
    // Host-owned region, e.g. a snippet placeholder.
    buffer.protect(0..2);

    let reformatter = Reformatter::new(format_braces, PatchConfig::default());
    let report = reformatter.reformat(&mut buffer).unwrap();

    assert_eq!(report.status, PatchStatus::Applied);
    assert_eq!(buffer.text(), "fn main() {\n    let a = 1;\n    let b = 2;\n}\n");
    // Only the second line changed.
    assert_eq!(report.delta.edits.len(), 2);
    assert_eq!(report.delta.edits[0].start, "fn main() {\n".len());

    // Formatter errors leave the buffer alone.
    let mut broken = RopeBuffer::new("}\n");
    assert!(reformatter.reformat(&mut broken).is_err());
    assert_eq!(broken.text(), "}\n");

    buffer.undo();
    assert_eq!(buffer.text(), "fn main() {\nlet a = 1;   \n    let b = 2;\n}\n");
}
