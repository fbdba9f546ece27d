//! Output JSON schema for snapshot reports.
//!
//! The report is versioned so readers can reject files written by an
//! incompatible release. State and county tables use the zipped format to
//! keep files small.

use crate::parser::ZippedObjectArray;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level report written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// RFC 3339 timestamp of when the report was built
    pub generated_at: String,

    /// Upstream "data as of" label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    pub days: DayRange,

    pub nation: AreaSummary,

    /// One row per state: id, name, population, area, then a total and a
    /// rate column per case state
    pub states: ZippedObjectArray,

    /// Same columns as `states` plus `stateId`
    pub counties: ZippedObjectArray,

    /// Rows skipped during ingest
    pub warning_count: usize,

    /// Events dropped for a non-positive count
    pub filtered_count: usize,
}

/// First and last day of the snapshot's day list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub first: NaiveDate,
    pub last: NaiveDate,
    pub count: usize,
}

/// Totals and rates of one area, keyed by case-state name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSummary {
    pub id: u32,
    pub name: String,
    pub population: u64,
    pub area: f64,
    pub totals: BTreeMap<String, u64>,
    pub rates: BTreeMap<String, f64>,
}
