//! Decode the event data document.
//!
//! Structural problems (invalid JSON, a missing required column, a bad
//! start date) fail the whole document. Problems confined to a single row
//! skip that row and are recorded in the ingest report.

use super::zipped::ZippedObjectArray;
use crate::model::{IngestReport, IngestStage, RawEvent, WarningReason};
use crate::utils::config::{
    AGE_COLUMN, CASE_STATE_COLUMN, COUNTY_COLUMN, COUNT_COLUMN, DAY_COLUMN, SEX_COLUMN,
};
use crate::utils::error::ParseError;
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Start date as written by the scraper (epoch millis) or as `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StartDate {
    Millis(i64),
    Date(NaiveDate),
}

impl StartDate {
    pub fn to_date(self) -> Result<NaiveDate, ParseError> {
        match self {
            StartDate::Date(date) => Ok(date),
            StartDate::Millis(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| ParseError::InvalidDate(ms.to_string())),
        }
    }
}

/// Data document as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawData {
    pub start_date: StartDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    pub records: ZippedObjectArray,
}

/// Typed contents of a data document
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedData {
    pub start_date: NaiveDate,
    pub last_date: Option<NaiveDate>,
    pub last_updated: Option<String>,
    pub events: Vec<RawEvent>,

    /// Rows skipped while decoding
    pub report: IngestReport,
}

/// Parse a data document from JSON text
///
/// **Public** - entry point for the event input
///
/// # Errors
/// * `ParseError::JsonError` - invalid JSON or document shape
/// * `ParseError::MissingColumn` - a required record column is absent
/// * `ParseError::InvalidDate` - the start date is out of range
pub fn parse_data(input: &str) -> Result<DecodedData, ParseError> {
    let raw: RawData = serde_json::from_str(input)?;
    let start_date = raw.start_date.to_date()?;

    let mut report = IngestReport::new();
    let events = decode_events(&raw.records, &mut report)?;

    Ok(DecodedData {
        start_date,
        last_date: raw.last_date,
        last_updated: raw.last_updated,
        events,
        report,
    })
}

/// Column positions of the event fields
struct EventColumns {
    county: usize,
    day: usize,
    sex: usize,
    age: usize,
    case_state: usize,
    count: usize,
}

impl EventColumns {
    fn resolve(records: &ZippedObjectArray) -> Result<Self, ParseError> {
        let column = |name: &str| {
            records
                .column(name)
                .ok_or_else(|| ParseError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            county: column(COUNTY_COLUMN)?,
            day: column(DAY_COLUMN)?,
            sex: column(SEX_COLUMN)?,
            age: column(AGE_COLUMN)?,
            case_state: column(CASE_STATE_COLUMN)?,
            count: column(COUNT_COLUMN)?,
        })
    }
}

/// Decode zipped event records, skipping malformed rows
///
/// **Public** - also usable on record tables obtained elsewhere
///
/// Non-positive counts are kept here; the linker filters them.
pub fn decode_events(
    records: &ZippedObjectArray,
    report: &mut IngestReport,
) -> Result<Vec<RawEvent>, ParseError> {
    let columns = EventColumns::resolve(records)?;
    let mut events = Vec::with_capacity(records.len());

    for (row_idx, row) in records.values.iter().enumerate() {
        match decode_row(row, &columns) {
            Ok(event) => events.push(event),
            Err(reason) => report.warn(IngestStage::Decode, row_idx, reason),
        }
    }

    debug!(
        "Decoded {} of {} event rows",
        events.len(),
        records.len()
    );

    Ok(events)
}

fn decode_row(row: &[Value], columns: &EventColumns) -> Result<RawEvent, WarningReason> {
    Ok(RawEvent {
        county: id_cell(row, columns.county, COUNTY_COLUMN)?,
        day: id_cell(row, columns.day, DAY_COLUMN)?,
        sex: id_cell(row, columns.sex, SEX_COLUMN)?,
        age: id_cell(row, columns.age, AGE_COLUMN)?,
        case_state: id_cell(row, columns.case_state, CASE_STATE_COLUMN)?,
        count: count_cell(row, columns.count)?,
    })
}

fn malformed(column: &str, detail: impl Into<String>) -> WarningReason {
    WarningReason::Malformed {
        column: column.to_string(),
        detail: detail.into(),
    }
}

/// Non-negative integer cell; numeric strings are accepted
fn id_cell(row: &[Value], idx: usize, column: &str) -> Result<u32, WarningReason> {
    let value = row.get(idx).ok_or_else(|| malformed(column, "missing value"))?;
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed.and_then(|n| u32::try_from(n).ok()).ok_or_else(|| {
        malformed(column, format!("expected a non-negative integer, found {}", value))
    })
}

fn count_cell(row: &[Value], idx: usize) -> Result<i64, WarningReason> {
    let value = row
        .get(idx)
        .ok_or_else(|| malformed(COUNT_COLUMN, "missing value"))?;
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| malformed(COUNT_COLUMN, format!("expected an integer, found {}", value)))
}
