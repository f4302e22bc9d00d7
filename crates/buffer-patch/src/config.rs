//! Patch configuration.
//!
//! Hosts usually keep these settings per project. [`PatchConfig`] is serde-friendly so it can
//! be read from whatever settings format the host already uses; every field has a default,
//! so partial settings are fine.

use crate::edit_script::DiffAlgorithm;
use crate::scheduler::ApplyOrder;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Settings for one reformat/patch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Whether the buffer should be patched at all.
    pub enabled: bool,
    /// Order in which ops are applied.
    pub order: ApplyOrder,
    /// Line diff algorithm.
    pub algorithm: DiffAlgorithm,
    /// Rewrite the new text's terminators to the buffer's convention before diffing.
    pub normalize_line_endings: bool,
    /// Time budget for the line diff in milliseconds. Once spent, the diff returns coarser
    /// (still exact) hunks. `None` means no limit.
    pub diff_timeout_ms: Option<u64>,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            order: ApplyOrder::Descending,
            algorithm: DiffAlgorithm::Myers,
            normalize_line_endings: true,
            diff_timeout_ms: None,
        }
    }
}

impl PatchConfig {
    /// Deadline for a diff started now, if a time budget is set.
    pub fn diff_deadline(&self) -> Option<Instant> {
        self.diff_timeout_ms.map(|ms| Instant::now() + Duration::from_millis(ms))
    }

    /// A configuration that leaves every buffer alone.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}
