//! Line ending helpers.
//!
//! A text is decomposed into lines using exactly one terminator convention: LF (`'\n'`) or
//! CRLF (`"\r\n"`). A lone `'\r'` is ordinary line content. Only the final line of a text may
//! lack a terminator.

use thiserror::Error;

/// A line terminator convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LineEnding {
    /// Unix-style LF (`'\n'`).
    #[default]
    Lf,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
}

/// Reasons a text cannot be decomposed into lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LineModelError {
    #[error("mixed LF and CRLF terminators (first mismatch on line {line})")]
    /// The text contains both bare LF and CRLF terminators.
    MixedTerminators {
        /// Zero-based line number of the first terminator that disagrees with the first one.
        line: usize,
    },
}

impl LineEnding {
    /// The terminator sequence.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }

    /// Length of the terminator in characters.
    pub fn char_len(self) -> usize {
        match self {
            Self::Lf => 1,
            Self::Crlf => 2,
        }
    }

    /// Detect the convention used by `text`.
    ///
    /// Returns `Ok(None)` for a text without any terminator, and an error if the text mixes
    /// LF and CRLF.
    pub fn detect_in_text(text: &str) -> Result<Option<Self>, LineModelError> {
        let mut detected = None;
        for (line, (index, _)) in text.match_indices('\n').enumerate() {
            let ending = if text[..index].ends_with('\r') {
                Self::Crlf
            } else {
                Self::Lf
            };
            match detected {
                None => detected = Some(ending),
                Some(previous) if previous != ending => {
                    return Err(LineModelError::MixedTerminators { line });
                }
                Some(_) => {}
            }
        }
        Ok(detected)
    }

    /// Rewrite every terminator in `text` to this convention.
    ///
    /// Mixed input is accepted: both LF and CRLF are rewritten.
    pub fn apply_to_text(self, text: &str) -> String {
        let normalized = text.replace("\r\n", "\n");
        match self {
            Self::Lf => normalized,
            Self::Crlf => normalized.replace('\n', "\r\n"),
        }
    }
}

/// One line of a decomposed text, without its terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Line<'a> {
    /// Line content without the terminator.
    pub content: &'a str,
    /// Whether the line is followed by a terminator.
    pub terminated: bool,
}

/// A text split into lines under a single terminator convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLines<'a> {
    /// Convention detected in the text (`None` when the text has no terminator at all).
    pub ending: Option<LineEnding>,
    /// Lines in order. An empty text has no lines; a trailing terminator does not open an
    /// extra empty line.
    pub lines: Vec<Line<'a>>,
}

impl<'a> TextLines<'a> {
    /// Split `text` into lines.
    pub fn parse(text: &'a str) -> Result<Self, LineModelError> {
        let ending = LineEnding::detect_in_text(text)?;
        let terminator = ending.unwrap_or_default().as_str();

        let mut lines = Vec::new();
        let mut rest = text;
        while !rest.is_empty() {
            match rest.find(terminator) {
                Some(index) => {
                    lines.push(Line {
                        content: &rest[..index],
                        terminated: true,
                    });
                    rest = &rest[index + terminator.len()..];
                }
                None => {
                    lines.push(Line {
                        content: rest,
                        terminated: false,
                    });
                    rest = "";
                }
            }
        }

        Ok(Self { ending, lines })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(LineEnding::detect_in_text("abc"), Ok(None));
        assert_eq!(LineEnding::detect_in_text("a\nb\n"), Ok(Some(LineEnding::Lf)));
        assert_eq!(
            LineEnding::detect_in_text("a\r\nb"),
            Ok(Some(LineEnding::Crlf))
        );
        assert_eq!(
            LineEnding::detect_in_text("a\r\nb\nc"),
            Err(LineModelError::MixedTerminators { line: 1 })
        );
    }

    #[test]
    fn test_mixed_terminator_message() {
        let err = LineEnding::detect_in_text("a\nb\r\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "mixed LF and CRLF terminators (first mismatch on line 1)"
        );
    }

    #[test]
    fn test_lone_cr_is_content() {
        let parsed = TextLines::parse("a\rb\nc").unwrap();
        assert_eq!(parsed.ending, Some(LineEnding::Lf));
        assert_eq!(parsed.lines.len(), 2);
        assert_eq!(parsed.lines[0].content, "a\rb");
    }

    #[test]
    fn test_parse_trailing_terminator() {
        let parsed = TextLines::parse("a\nb\n").unwrap();
        assert_eq!(
            parsed.lines,
            vec![
                Line {
                    content: "a",
                    terminated: true
                },
                Line {
                    content: "b",
                    terminated: true
                },
            ]
        );

        let parsed = TextLines::parse("a\n\nb").unwrap();
        assert_eq!(parsed.lines.len(), 3);
        assert_eq!(parsed.lines[1].content, "");
        assert!(!parsed.lines[2].terminated);
    }

    #[test]
    fn test_parse_empty() {
        let parsed = TextLines::parse("").unwrap();
        assert!(parsed.lines.is_empty());
        assert_eq!(parsed.ending, None);
    }

    #[test]
    fn test_parse_crlf() {
        let parsed = TextLines::parse("x\r\ny\r\n").unwrap();
        assert_eq!(parsed.ending, Some(LineEnding::Crlf));
        assert_eq!(parsed.lines[0].content, "x");
        assert_eq!(parsed.lines[1].content, "y");
    }

    #[test]
    fn test_apply_to_text() {
        assert_eq!(LineEnding::Crlf.apply_to_text("a\nb\r\nc"), "a\r\nb\r\nc");
        assert_eq!(LineEnding::Lf.apply_to_text("a\r\nb\r\n"), "a\nb\n");
    }
}
