//! Convert the staging hierarchy into a published snapshot.
//!
//! Consumes the staging types by value; once this returns there is no
//! handle left through which areas, records or tables could change.

use super::hierarchy::{StagedArea, StagedHierarchy};
use super::snapshot::Snapshot;
use super::AggregationContext;
use crate::model::{Area, County, DayList, Nation, State};
use log::{debug, warn};

/// Freeze a fully linked, rate-normalized hierarchy
///
/// **Crate-internal** - last stage of `aggregate`
///
/// # Arguments
/// * `hierarchy` - Staging hierarchy, consumed
/// * `ctx` - Context supplying start/last dates, dimensions and labels
/// * `max_day` - Highest linked day index, from the linker
pub(crate) fn freeze(
    hierarchy: StagedHierarchy,
    ctx: &AggregationContext,
    max_day: Option<u32>,
) -> Snapshot {
    let days = build_day_list(ctx, max_day);
    debug!(
        "Freezing snapshot: {} states, {} counties, {} days",
        hierarchy.states.len(),
        hierarchy.county_index.len(),
        days.len()
    );

    let states = hierarchy
        .states
        .into_iter()
        .map(|state| {
            let counties = state
                .counties
                .into_iter()
                .map(|county| County::new(county.id, freeze_area(county.area), county.state_id))
                .collect();
            State::new(state.id, freeze_area(state.area), counties)
        })
        .collect();

    let nation = Nation::new(freeze_area(hierarchy.nation), states);

    Snapshot::new(
        nation,
        hierarchy.state_index,
        hierarchy.county_index,
        days,
        ctx.dimensions.clone(),
        ctx.last_updated.clone(),
    )
}

fn freeze_area(area: StagedArea) -> Area {
    Area::from_parts(
        area.id,
        area.display_name,
        area.geographic_area,
        area.population,
        area.records,
        area.totals,
        area.rates,
    )
}

/// Day list from the start date to the later of the last linked day and
/// the context's explicit last date
///
/// The linker already bounds every linked day; an explicit last date past
/// `max_day_span` is ignored.
fn build_day_list(ctx: &AggregationContext, max_day: Option<u32>) -> DayList {
    let explicit = ctx
        .last_date
        .and_then(|last| u32::try_from((last - ctx.start_date).num_days()).ok())
        .filter(|&offset| {
            let within = offset <= ctx.max_day_span;
            if !within {
                warn!(
                    "Last date lies {} days past the start, beyond the limit of {}; ignored",
                    offset, ctx.max_day_span
                );
            }
            within
        });

    let last_index = match (max_day, explicit) {
        (Some(a), Some(b)) => a.max(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => 0,
    };

    DayList::spanning(ctx.start_date, last_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, d).unwrap()
    }

    #[test]
    fn test_day_list_without_events() {
        let ctx = AggregationContext::new(date(1));
        let days = build_day_list(&ctx, None);
        assert_eq!(days.len(), 1);
        assert_eq!(days.first(), Some(date(1)));
    }

    #[test]
    fn test_day_list_takes_later_end() {
        let ctx = AggregationContext::new(date(1)).with_last_date(date(10));
        assert_eq!(build_day_list(&ctx, Some(3)).last(), Some(date(10)));
        assert_eq!(build_day_list(&ctx, Some(14)).last(), Some(date(15)));
        assert_eq!(build_day_list(&ctx, None).len(), 10);
    }

    #[test]
    fn test_last_date_before_start_is_ignored() {
        let ctx = AggregationContext::new(date(5)).with_last_date(date(1));
        assert_eq!(build_day_list(&ctx, Some(2)).len(), 3);
    }

    #[test]
    fn test_far_last_date_is_ignored() {
        let ctx = AggregationContext::new(date(1))
            .with_last_date(NaiveDate::from_ymd_opt(9999, 12, 31).unwrap())
            .with_max_day_span(366);
        let days = build_day_list(&ctx, Some(4));
        assert_eq!(days.len(), 5);
        assert_eq!(days.last(), Some(date(5)));
    }
}
