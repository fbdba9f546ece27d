//! Turn parsed feed rows into compact events.
//!
//! Each feed row carries both a case count and a death count for one
//! county/day/sex/age combination. It becomes up to two events, one per
//! case state, and only positive counts are kept. Day indices are relative
//! to the earliest report date in the feed.

use super::events::{RawData, StartDate};
use super::zipped::ZippedObjectArray;
use crate::model::{Dimensions, IngestReport, IngestStage, RawEvent, WarningReason};
use crate::utils::config::{
    AGE_COLUMN, CONFIRMED_CASE_STATE, COUNTY_COLUMN, DEATH_CASE_STATE, EVENT_COLUMNS, SEX_COLUMN,
};
use crate::utils::error::ParseError;
use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// One row of the upstream case feed, dates already parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRow {
    /// County id as published, possibly zero-padded ("01001")
    pub county_id: String,
    pub sex: String,
    pub age_group: String,
    pub cases: i64,
    pub deaths: i64,
    pub report_date: NaiveDate,

    /// Upstream "data as of" label
    #[serde(default)]
    pub data_as_of: Option<String>,
}

/// Events ready to be zipped into a data document
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedFeed {
    pub start_date: NaiveDate,
    pub last_date: NaiveDate,
    pub last_updated: Option<String>,
    pub events: Vec<RawEvent>,
    pub report: IngestReport,
}

impl OptimizedFeed {
    /// Build the data document for these events
    pub fn to_document(&self) -> Result<RawData, ParseError> {
        Ok(RawData {
            start_date: StartDate::Date(self.start_date),
            last_date: Some(self.last_date),
            last_updated: self.last_updated.clone(),
            records: zip_events(&self.events)?,
        })
    }
}

/// Optimize feed rows into events
///
/// **Public** - used when producing a data document from a raw feed
///
/// # Arguments
/// * `rows` - Parsed feed rows, in feed order
/// * `dimensions` - Tables used to map sex and age labels to ids
///
/// # Returns
/// `None` for an empty feed, since there is no start date to anchor day
/// indices to. Rows with unknown labels or an unreadable county id are
/// skipped with a warning.
pub fn optimize_feed(rows: &[FeedRow], dimensions: &Dimensions) -> Option<OptimizedFeed> {
    let start_date = rows.iter().map(|row| row.report_date).min()?;
    let last_date = rows.iter().map(|row| row.report_date).max()?;

    info!(
        "Optimizing {} feed rows ({} to {})",
        rows.len(),
        start_date,
        last_date
    );

    let mut report = IngestReport::new();
    let mut events = Vec::with_capacity(rows.len());

    for (row_idx, row) in rows.iter().enumerate() {
        match optimize_row(row, start_date, dimensions) {
            Ok((confirmed, death)) => {
                for event in [confirmed, death] {
                    if event.count > 0 {
                        events.push(event);
                    } else {
                        report.filtered += 1;
                    }
                }
            }
            Err(reason) => report.warn(IngestStage::Feed, row_idx, reason),
        }
    }

    debug!(
        "Feed produced {} events, {} zero counts dropped",
        events.len(),
        report.filtered
    );

    Some(OptimizedFeed {
        start_date,
        last_date,
        last_updated: rows.first().and_then(|row| row.data_as_of.clone()),
        events,
        report,
    })
}

fn optimize_row(
    row: &FeedRow,
    start_date: NaiveDate,
    dimensions: &Dimensions,
) -> Result<(RawEvent, RawEvent), WarningReason> {
    let county = row
        .county_id
        .trim()
        .parse::<u32>()
        .map_err(|e| WarningReason::Malformed {
            column: COUNTY_COLUMN.to_string(),
            detail: format!("'{}': {}", row.county_id, e),
        })?;

    let sex = dimensions
        .sex
        .id_for_name(&row.sex)
        .ok_or_else(|| WarningReason::UnknownLabel {
            column: SEX_COLUMN.to_string(),
            label: row.sex.clone(),
        })?;

    let age = dimensions
        .ages
        .id_for_name(&row.age_group)
        .ok_or_else(|| WarningReason::UnknownLabel {
            column: AGE_COLUMN.to_string(),
            label: row.age_group.clone(),
        })?;

    // report_date >= start_date, the start is the minimum
    let day = u32::try_from((row.report_date - start_date).num_days()).unwrap_or(0);

    let base = RawEvent {
        county,
        day,
        sex,
        age,
        case_state: CONFIRMED_CASE_STATE,
        count: row.cases,
    };

    Ok((
        base,
        RawEvent {
            case_state: DEATH_CASE_STATE,
            count: row.deaths,
            ..base
        },
    ))
}

/// Zip events using the standard record column order
pub fn zip_events(events: &[RawEvent]) -> Result<ZippedObjectArray, ParseError> {
    let fields: Vec<String> = EVENT_COLUMNS.iter().map(|c| c.to_string()).collect();
    ZippedObjectArray::zip_serialize(events, Some(&fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::events::decode_events;

    fn row(county: &str, sex: &str, age: &str, cases: i64, deaths: i64, day: u32) -> FeedRow {
        FeedRow {
            county_id: county.to_string(),
            sex: sex.to_string(),
            age_group: age.to_string(),
            cases,
            deaths,
            report_date: NaiveDate::from_ymd_opt(2020, 3, day).unwrap(),
            data_as_of: Some("14.04.2020, 00:00 Uhr".to_string()),
        }
    }

    #[test]
    fn test_optimize_splits_cases_and_deaths() {
        let rows = vec![
            row("01001", "M", "A35-A59", 4, 1, 3),
            row("01001", "W", "A80+", 2, 0, 2),
        ];
        let feed = optimize_feed(&rows, &Dimensions::default()).unwrap();

        assert_eq!(feed.start_date, NaiveDate::from_ymd_opt(2020, 3, 2).unwrap());
        assert_eq!(feed.events.len(), 3);
        assert_eq!(feed.report.filtered, 1);

        let death = feed
            .events
            .iter()
            .find(|e| e.case_state == DEATH_CASE_STATE)
            .unwrap();
        assert_eq!(death.county, 1001);
        assert_eq!(death.day, 1);
        assert_eq!(death.sex, 1);
        assert_eq!(death.age, 3);
        assert_eq!(death.count, 1);
    }

    #[test]
    fn test_optimize_skips_unknown_labels() {
        let rows = vec![
            row("1001", "X", "A35-A59", 4, 0, 1),
            row("abc", "M", "A35-A59", 4, 0, 1),
            row("1001", "M", "A99", 4, 0, 1),
        ];
        let feed = optimize_feed(&rows, &Dimensions::default()).unwrap();

        assert!(feed.events.is_empty());
        assert_eq!(feed.report.warning_count(), 3);
        assert!(matches!(
            &feed.report.warnings[0].reason,
            WarningReason::UnknownLabel { column, label } if column == "sex" && label == "X"
        ));
        assert!(matches!(
            &feed.report.warnings[1].reason,
            WarningReason::Malformed { .. }
        ));
    }

    #[test]
    fn test_optimize_empty_feed() {
        assert!(optimize_feed(&[], &Dimensions::default()).is_none());
    }

    #[test]
    fn test_zipped_events_decode_back() {
        let rows = vec![row("1001", "W", "A15-A34", 6, 2, 1)];
        let feed = optimize_feed(&rows, &Dimensions::default()).unwrap();
        let document = feed.to_document().unwrap();

        assert_eq!(document.records.fields, EVENT_COLUMNS);
        assert_eq!(document.last_updated.as_deref(), Some("14.04.2020, 00:00 Uhr"));

        let mut report = IngestReport::new();
        let decoded = decode_events(&document.records, &mut report).unwrap();
        assert_eq!(decoded, feed.events);
        assert!(!report.has_warnings());
    }
}
