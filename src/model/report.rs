//! Ingest report: non-fatal problems found while reading event rows.
//!
//! Malformed rows are skipped rather than aborting the run. Each one is
//! logged and collected here so callers can inspect what was dropped.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage a warning was raised in
///
/// Row numbers are positions within the input of that stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStage {
    /// Optimizing raw feed rows into events
    Feed,
    /// Decoding zipped event rows
    Decode,
    /// Linking events into the hierarchy
    Link,
}

/// Why a row was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningReason {
    /// A cell could not be read as the expected value
    Malformed { column: String, detail: String },
    UnknownSex { id: u32 },
    UnknownAge { id: u32 },
    UnknownCaseState { id: u32 },
    /// A feed label that has no entry in its dimension table
    UnknownLabel { column: String, label: String },
}

impl fmt::Display for WarningReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningReason::Malformed { column, detail } => {
                write!(f, "malformed '{}': {}", column, detail)
            }
            WarningReason::UnknownSex { id } => write!(f, "unknown sex id {}", id),
            WarningReason::UnknownAge { id } => write!(f, "unknown age group id {}", id),
            WarningReason::UnknownCaseState { id } => write!(f, "unknown case state id {}", id),
            WarningReason::UnknownLabel { column, label } => {
                write!(f, "unknown {} label '{}'", column, label)
            }
        }
    }
}

/// A single skipped row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowWarning {
    pub stage: IngestStage,
    pub row: usize,
    pub reason: WarningReason,
}

/// Counters and warnings gathered across one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Events linked into the hierarchy
    pub linked: usize,

    /// Events dropped because their count was not positive
    pub filtered: usize,

    pub warnings: Vec<RowWarning>,
}

impl IngestReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a skipped row and log it
    pub fn warn(&mut self, stage: IngestStage, row: usize, reason: WarningReason) {
        warn!("Skipping row {} ({:?}): {}", row, stage, reason);
        self.warnings.push(RowWarning { stage, row, reason });
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Fold another stage's report into this one
    pub fn absorb(&mut self, other: IngestReport) {
        self.linked += other.linked;
        self.filtered += other.filtered;
        self.warnings.extend(other.warnings);
    }

    pub fn summary(&self) -> String {
        format!(
            "Linked: {} | Filtered: {} | Warnings: {}",
            self.linked,
            self.filtered,
            self.warnings.len()
        )
    }
}
