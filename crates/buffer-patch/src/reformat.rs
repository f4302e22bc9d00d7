//! Entry points.
//!
//! [`Reformatter`] runs an external [`TextTransformer`] (typically a code formatter) over a
//! buffer's content and patches the buffer with the result. [`patch_buffer`] does the same for
//! callers that already hold the new text.

use crate::buffer::TextBuffer;
use crate::config::PatchConfig;
use crate::edit_script::compute_with_deadline;
use crate::error::{PatchError, TransformError};
use crate::line_ending::LineEnding;
use crate::patcher::apply;
use crate::report::{PatchReport, PatchStatus};
use crate::scheduler::schedule;
use std::borrow::Cow;

/// Produces the new version of a text, e.g. a source code formatter.
pub trait TextTransformer {
    /// Transform `text`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] when no output can be produced (for example, the input does
    /// not parse).
    fn transform(&self, text: &str) -> Result<String, TransformError>;
}

impl<F> TextTransformer for F
where
    F: Fn(&str) -> Result<String, TransformError>,
{
    fn transform(&self, text: &str) -> Result<String, TransformError> {
        self(text)
    }
}

/// Reformats buffers in place with minimal edits.
#[derive(Debug, Clone)]
pub struct Reformatter<T> {
    transformer: T,
    config: PatchConfig,
}

impl<T: TextTransformer> Reformatter<T> {
    /// Create a reformatter.
    pub fn new(transformer: T, config: PatchConfig) -> Self {
        Self {
            transformer,
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &PatchConfig {
        &self.config
    }

    /// Transform the buffer's content and patch the buffer with the result.
    ///
    /// # Errors
    ///
    /// Whole-batch failures ([`PatchError`]) leave the buffer unchanged. Failures of single
    /// ops are reported in the returned [`PatchReport`].
    pub fn reformat<B: TextBuffer + ?Sized>(
        &self,
        buffer: &mut B,
    ) -> Result<PatchReport, PatchError> {
        if !self.config.enabled {
            tracing::debug!("reformat disabled; buffer left untouched");
            return Ok(PatchReport::untouched(PatchStatus::Disabled, buffer.char_count()));
        }

        let old_text = buffer.read_all();
        let new_text = self.transformer.transform(&old_text).inspect_err(|error| {
            tracing::warn!(%error, "transformer failed; buffer left untouched");
        })?;
        patch_snapshot(buffer, &old_text, &new_text, &self.config)
    }
}

/// Patch `buffer` so that its content becomes `new_text`.
///
/// # Errors
///
/// See [`Reformatter::reformat`].
pub fn patch_buffer<B: TextBuffer + ?Sized>(
    buffer: &mut B,
    new_text: &str,
    config: &PatchConfig,
) -> Result<PatchReport, PatchError> {
    if !config.enabled {
        return Ok(PatchReport::untouched(PatchStatus::Disabled, buffer.char_count()));
    }
    let old_text = buffer.read_all();
    patch_snapshot(buffer, &old_text, new_text, config)
}

fn patch_snapshot<B: TextBuffer + ?Sized>(
    buffer: &mut B,
    old_text: &str,
    new_text: &str,
    config: &PatchConfig,
) -> Result<PatchReport, PatchError> {
    let new_text = match LineEnding::detect_in_text(old_text) {
        Ok(Some(ending)) if config.normalize_line_endings => {
            Cow::Owned(ending.apply_to_text(new_text))
        }
        _ => Cow::Borrowed(new_text),
    };

    if new_text == old_text {
        return Ok(PatchReport::untouched(
            PatchStatus::Unchanged,
            old_text.chars().count(),
        ));
    }

    let script = compute_with_deadline(
        old_text,
        &new_text,
        config.algorithm,
        config.diff_deadline(),
    )?;
    let schedule = schedule(script, config.order)?;
    apply(buffer, &schedule)
}
