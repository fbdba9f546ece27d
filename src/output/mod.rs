//! Snapshot reports and their writers.
//!
//! This module handles:
//! - The versioned JSON report schema
//! - Building a report and a text summary from a snapshot
//! - Writing and reading report files

pub mod json;
pub mod report;
pub mod schema;

// Re-export main functions
pub use json::{read_report, report_to_string, write_report};
pub use report::{render_summary, to_report};
pub use schema::{AreaSummary, DayRange, SnapshotReport};
