#![warn(missing_docs)]
//! Buffer Patch - Minimal line-level reconciliation of a live buffer with new text
//!
//! # Overview
//!
//! `buffer-patch` takes the output of an external text transformation (usually a source code
//! formatter) and applies it to an open editor buffer as the smallest set of line edits,
//! instead of replacing the whole content. Regions the transformation did not change are never
//! touched, so cursor positions, decorations and undo granularity attached to them survive.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Reformatter / patch_buffer                 │  ← Public entry points
//! ├─────────────────────────────────────────────┤
//! │  BufferPatcher (per-op state machine)       │  ← Mutation
//! ├─────────────────────────────────────────────┤
//! │  Scheduler (ordering, overlap checks)       │  ← Safety
//! ├─────────────────────────────────────────────┤
//! │  EditScript (line diff via `similar`)       │  ← What changed
//! ├─────────────────────────────────────────────┤
//! │  LineIndex (line → char offset)             │  ← Addressing
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use buffer_patch::{PatchConfig, Reformatter, RopeBuffer, TransformError};
//!
//! let mut buffer = RopeBuffer::new("fn main(){\nlet x=1;\n}\n");
//!
//! let formatter = |text: &str| -> Result<String, TransformError> {
//!     Ok(text.replace("main(){", "main() {").replace("let x=1;", "    let x = 1;"))
//! };
//! let report = Reformatter::new(formatter, PatchConfig::default())
//!     .reformat(&mut buffer)
//!     .unwrap();
//!
//! assert_eq!(buffer.text(), "fn main() {\n    let x = 1;\n}\n");
//! assert!(report.is_complete());
//!
//! // The whole pass is one undo step.
//! buffer.undo();
//! assert_eq!(buffer.text(), "fn main(){\nlet x=1;\n}\n");
//! ```
//!
//! # Module Description
//!
//! - [`line_ending`] - terminator conventions and line decomposition
//! - [`line_index`] - line number to character offset mapping
//! - [`edit_script`] - edit ops and script computation
//! - [`scheduler`] - batch ordering and validation
//! - [`patcher`] - applies a schedule to a buffer
//! - [`buffer`] - the host buffer capability
//! - [`rope_buffer`] - in-memory reference buffer with grouped undo
//! - [`reformat`] - entry points
//! - [`config`], [`report`], [`delta`], [`error`] - settings and outcomes

pub mod buffer;
pub mod config;
pub mod delta;
pub mod edit_script;
pub mod error;
pub mod line_ending;
pub mod line_index;
pub mod patcher;
pub mod reformat;
pub mod report;
pub mod rope_buffer;
pub mod scheduler;

pub use buffer::TextBuffer;
pub use config::PatchConfig;
pub use delta::{TextDelta, TextDeltaEdit};
pub use edit_script::{
    DiffAlgorithm, EditKind, EditOp, EditScript, LineRange, compute, compute_with,
    compute_with_deadline,
};
pub use error::{BufferError, OpError, PatchError, TransformError};
pub use line_ending::LineEnding;
pub use line_index::{LineIndex, LineSpan};
pub use patcher::{BufferPatcher, apply};
pub use reformat::{Reformatter, TextTransformer, patch_buffer};
pub use report::{OpFailure, PatchReport, PatchStatus};
pub use rope_buffer::RopeBuffer;
pub use scheduler::{ApplyOrder, Schedule, schedule};
