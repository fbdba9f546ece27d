//! Link raw events into the staging hierarchy in a single pass.
//!
//! Each event is resolved to its county and then appended to the county,
//! the owning state and the nation, updating all three totals. Linking is
//! strictly sequential: totals are plain read-modify-write counters.

use super::hierarchy::StagedHierarchy;
use super::AggregationContext;
use crate::model::{
    AgeId, CaseStateId, Dimensions, IngestReport, IngestStage, RawEvent, Record, SexId,
    WarningReason,
};
use crate::utils::config::{COUNT_COLUMN, DAY_COLUMN};
use crate::utils::error::{EngineError, ReferenceKind};
use chrono::Days;
use log::debug;

/// Link every event, in order
///
/// **Crate-internal** - second stage of `aggregate`
///
/// # Arguments
/// * `hierarchy` - Staging hierarchy from `build_hierarchy`
/// * `ctx` - Dimension tables, start date and day span rows are checked against
/// * `events` - Full event list
/// * `report` - Receives linked/filtered counters and row warnings
///
/// # Returns
/// Highest day index among linked records, `None` if nothing was linked
///
/// # Errors
/// * `EngineError::MissingReference` - an event names an unknown county.
///   The whole run is aborted; the staging hierarchy must be discarded.
pub(crate) fn link_records(
    hierarchy: &mut StagedHierarchy,
    ctx: &AggregationContext,
    events: &[RawEvent],
    report: &mut IngestReport,
) -> Result<Option<u32>, EngineError> {
    debug!("Linking {} events", events.len());

    let mut max_day: Option<u32> = None;

    for (row, event) in events.iter().enumerate() {
        // Broken county references mean corrupt upstream data, so they are
        // checked before anything that would merely skip the row.
        if !hierarchy.county_index.contains_key(&event.county) {
            return Err(EngineError::missing(
                ReferenceKind::County,
                event.county,
                format!("event row {}", row),
            ));
        }

        if let Some(reason) = check_dimensions(event, &ctx.dimensions) {
            report.warn(IngestStage::Link, row, reason);
            continue;
        }

        if let Some(reason) = check_day(event.day, ctx) {
            report.warn(IngestStage::Link, row, reason);
            continue;
        }

        let count = match u64::try_from(event.count) {
            Ok(count) if count > 0 => count,
            _ => {
                report.filtered += 1;
                continue;
            }
        };

        let case_state = CaseStateId(event.case_state);
        if !hierarchy.has_headroom(case_state, count) {
            report.warn(
                IngestStage::Link,
                row,
                WarningReason::Malformed {
                    column: COUNT_COLUMN.to_string(),
                    detail: format!(
                        "count {} overflows the case state {} total",
                        count, case_state
                    ),
                },
            );
            continue;
        }

        let record = Record {
            day_index: event.day,
            county_id: event.county,
            sex: SexId(event.sex),
            age: AgeId(event.age),
            count,
        };

        hierarchy.link(case_state, record)?;
        report.linked += 1;
        max_day = Some(max_day.map_or(event.day, |d| d.max(event.day)));
    }

    debug!(
        "Linked {} events ({} filtered, {} warnings)",
        report.linked,
        report.filtered,
        report.warning_count()
    );

    Ok(max_day)
}

/// First dimension id of `event` missing from its table, if any
fn check_dimensions(event: &RawEvent, dimensions: &Dimensions) -> Option<WarningReason> {
    if !dimensions.case_states.contains(event.case_state) {
        Some(WarningReason::UnknownCaseState {
            id: event.case_state,
        })
    } else if !dimensions.sex.contains(event.sex) {
        Some(WarningReason::UnknownSex { id: event.sex })
    } else if !dimensions.ages.contains(event.age) {
        Some(WarningReason::UnknownAge { id: event.age })
    } else {
        None
    }
}

/// Day indices past the configured span, or past the last date chrono can
/// represent, would leave records outside the day list
fn check_day(day: u32, ctx: &AggregationContext) -> Option<WarningReason> {
    let detail = if day > ctx.max_day_span {
        format!("day {} exceeds the limit of {}", day, ctx.max_day_span)
    } else if ctx
        .start_date
        .checked_add_days(Days::new(u64::from(day)))
        .is_none()
    {
        format!("day {} lies past the last representable date", day)
    } else {
        return None;
    };

    Some(WarningReason::Malformed {
        column: DAY_COLUMN.to_string(),
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::hierarchy::build_hierarchy;
    use crate::aggregator::AggregationContext;
    use crate::model::{CountyDescriptor, GeoDescriptors, StateDescriptor};
    use chrono::NaiveDate;

    fn staged() -> (AggregationContext, StagedHierarchy) {
        let ctx = AggregationContext::new(NaiveDate::from_ymd_opt(2020, 3, 1).unwrap());
        let geo = GeoDescriptors {
            states: vec![StateDescriptor {
                id: 1,
                name: "State".to_string(),
            }],
            counties: vec![
                CountyDescriptor {
                    id: 11,
                    name: "A".to_string(),
                    state_id: 1,
                    population: 100,
                    geographic_area: 1.0,
                },
                CountyDescriptor {
                    id: 12,
                    name: "B".to_string(),
                    state_id: 1,
                    population: 100,
                    geographic_area: 1.0,
                },
            ],
        };
        let h = build_hierarchy(&ctx, &geo).unwrap();
        (ctx, h)
    }

    fn event(county: u32, day: u32, case_state: u32, count: i64) -> RawEvent {
        RawEvent {
            county,
            day,
            sex: 0,
            age: 2,
            case_state,
            count,
        }
    }

    #[test]
    fn test_link_propagates_to_all_levels() {
        let (ctx, mut h) = staged();
        let mut report = IngestReport::new();
        let events = vec![event(11, 0, 0, 5), event(11, 1, 0, 3), event(12, 0, 0, 2)];

        let max_day = link_records(&mut h, &ctx, &events, &mut report).unwrap();

        let confirmed = CaseStateId(0);
        assert_eq!(max_day, Some(1));
        assert_eq!(report.linked, 3);
        assert_eq!(h.states[0].counties[0].area.totals[&confirmed], 8);
        assert_eq!(h.states[0].counties[1].area.totals[&confirmed], 2);
        assert_eq!(h.states[0].area.totals[&confirmed], 10);
        assert_eq!(h.nation.totals[&confirmed], 10);
        assert_eq!(h.nation.records[&confirmed].len(), 3);
        // stable append order
        assert_eq!(h.states[0].area.records[&confirmed][2].county_id, 12);
    }

    #[test]
    fn test_non_positive_counts_are_filtered() {
        let (ctx, mut h) = staged();
        let mut report = IngestReport::new();
        let events = vec![event(11, 0, 0, 0), event(11, 2, 1, -1), event(12, 0, 1, 4)];

        let max_day = link_records(&mut h, &ctx, &events, &mut report).unwrap();

        assert_eq!(max_day, Some(0));
        assert_eq!(report.filtered, 2);
        assert_eq!(report.linked, 1);
        assert!(!report.has_warnings());
        assert_eq!(h.nation.totals[&CaseStateId(1)], 4);
    }

    #[test]
    fn test_unknown_dimension_ids_are_warnings() {
        let (ctx, mut h) = staged();
        let mut report = IngestReport::new();
        let mut bad_sex = event(11, 0, 0, 1);
        bad_sex.sex = 7;
        let mut bad_age = event(11, 0, 0, 1);
        bad_age.age = 42;
        let events = vec![bad_sex, event(12, 0, 5, 1), bad_age, event(12, 0, 0, 1)];

        link_records(&mut h, &ctx, &events, &mut report).unwrap();

        assert_eq!(report.linked, 1);
        let reasons: Vec<_> = report.warnings.iter().map(|w| (w.row, w.reason.clone())).collect();
        assert_eq!(
            reasons,
            vec![
                (0, WarningReason::UnknownSex { id: 7 }),
                (1, WarningReason::UnknownCaseState { id: 5 }),
                (2, WarningReason::UnknownAge { id: 42 }),
            ]
        );
    }

    #[test]
    fn test_unknown_county_aborts() {
        let (ctx, mut h) = staged();
        let mut report = IngestReport::new();
        let events = vec![event(11, 0, 0, 1), event(99, 0, 0, 1)];

        let err = link_records(&mut h, &ctx, &events, &mut report).unwrap_err();
        assert!(matches!(err, EngineError::MissingReference { id: 99, .. }));
    }

    #[test]
    fn test_empty_event_list() {
        let (ctx, mut h) = staged();
        let mut report = IngestReport::new();
        let max_day = link_records(&mut h, &ctx, &[], &mut report).unwrap();
        assert_eq!(max_day, None);
        assert_eq!(h.nation.totals[&CaseStateId(0)], 0);
    }

    #[test]
    fn test_out_of_range_days_are_warnings() {
        let (ctx, mut h) = staged();
        let ctx = ctx.with_max_day_span(30);
        let mut report = IngestReport::new();
        let events = vec![event(11, 30, 0, 2), event(11, 31, 0, 5), event(12, u32::MAX, 0, 1)];

        let max_day = link_records(&mut h, &ctx, &events, &mut report).unwrap();

        assert_eq!(max_day, Some(30));
        assert_eq!(report.linked, 1);
        assert_eq!(report.warning_count(), 2);
        assert!(report.warnings.iter().all(|w| matches!(
            &w.reason,
            WarningReason::Malformed { column, .. } if column == DAY_COLUMN
        )));
        assert_eq!(h.nation.totals[&CaseStateId(0)], 2);
    }

    #[test]
    fn test_days_past_the_calendar_end_are_warnings() {
        let (_, mut h) = staged();
        let start = NaiveDate::MAX.checked_sub_days(Days::new(2)).unwrap();
        let ctx = AggregationContext::new(start);
        let mut report = IngestReport::new();
        let events = vec![event(11, 2, 0, 1), event(11, 10, 0, 5)];

        let max_day = link_records(&mut h, &ctx, &events, &mut report).unwrap();

        assert_eq!(max_day, Some(2));
        assert_eq!(report.linked, 1);
        assert_eq!(report.warnings[0].row, 1);
        assert_eq!(h.nation.totals[&CaseStateId(0)], 1);
    }

    #[test]
    fn test_overflowing_counts_are_warnings() {
        let (ctx, mut h) = staged();
        let mut report = IngestReport::new();
        let events = vec![
            event(11, 0, 0, i64::MAX),
            event(12, 0, 0, i64::MAX),
            event(11, 1, 0, i64::MAX),
            event(12, 1, 1, 3),
        ];

        link_records(&mut h, &ctx, &events, &mut report).unwrap();

        let confirmed = CaseStateId(0);
        let max = i64::MAX as u64;
        assert_eq!(report.linked, 3);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.warnings[0].row, 2);
        assert!(matches!(
            &report.warnings[0].reason,
            WarningReason::Malformed { column, .. } if column == COUNT_COLUMN
        ));
        assert_eq!(h.states[0].counties[0].area.totals[&confirmed], max);
        assert_eq!(h.states[0].counties[1].area.totals[&confirmed], max);
        assert_eq!(h.states[0].area.totals[&confirmed], 2 * max);
        assert_eq!(h.nation.totals[&confirmed], 2 * max);
        assert_eq!(h.nation.totals[&CaseStateId(1)], 3);
    }
}
