//! Cumulative per-day series, computed lazily and memoized per filter.
//!
//! A data row covers every day of the snapshot's day list, including days
//! without matching records, and carries both the daily count and the
//! running total. Rows are cached by a structured key and handed out as
//! shared `Arc`s: asking twice returns the very same row.

use crate::model::{AgeId, AreaId, CaseStateId, DayList, Record, SexId};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Cache key for one data row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub area: AreaId,
    pub case_state: CaseStateId,
    pub sex: Option<SexId>,
    pub age: Option<AgeId>,
}

/// One day of a data row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataPoint {
    pub day: NaiveDate,

    /// Matching count reported on this day
    pub daily: u64,

    /// Running total up to and including this day
    pub cumulative: u64,
}

/// Day-ordered series for one area and filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DataRow {
    points: Vec<DataPoint>,
}

impl DataRow {
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&DataPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&DataPoint> {
        self.points.last()
    }

    /// Point for `day`, if covered
    pub fn get(&self, day: NaiveDate) -> Option<&DataPoint> {
        self.points
            .binary_search_by_key(&day, |p| p.day)
            .ok()
            .and_then(|idx| self.points.get(idx))
    }

    /// Cumulative total on the last day
    pub fn total(&self) -> u64 {
        self.last().map_or(0, |p| p.cumulative)
    }

    pub fn daily_counts(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.daily).collect()
    }
}

/// Compute a data row from an area's records for one case state
///
/// **Public** - the uncached computation behind `Snapshot::data_row`
///
/// # Algorithm
/// 1. Keep records matching the sex/age filter (exact match, `None` = any)
/// 2. Bucket their counts by day index
/// 3. Walk the full day list with a running total, so days without
///    records carry the total forward
pub fn compute_data_row(
    records: &[Record],
    days: &DayList,
    sex: Option<SexId>,
    age: Option<AgeId>,
) -> DataRow {
    let mut buckets = vec![0u64; days.len()];

    for record in records.iter().filter(|r| r.matches(sex, age)) {
        match buckets.get_mut(record.day_index as usize) {
            Some(bucket) => *bucket = bucket.saturating_add(record.count),
            None => debug!(
                "Record for county {} on day {} lies outside the day list",
                record.county_id, record.day_index
            ),
        }
    }

    let mut running = 0u64;
    let points = days
        .iter()
        .zip(buckets)
        .map(|(day, daily)| {
            running = running.saturating_add(daily);
            DataPoint {
                day,
                daily,
                cumulative: running,
            }
        })
        .collect();

    DataRow { points }
}

type Slot = Arc<OnceLock<Arc<DataRow>>>;

/// Memoizing store of data rows
///
/// Each key gets its own `OnceLock`, so concurrent requests for the same
/// key compute the row once and all receive the same `Arc`. The map lock is
/// held only long enough to fetch or insert the slot.
#[derive(Debug, Default)]
pub struct TimeSeriesCache {
    slots: Mutex<HashMap<SeriesKey, Slot>>,
}

impl TimeSeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached row for `key`, computing it with `compute` on first request
    pub fn get_or_compute<F>(&self, key: SeriesKey, compute: F) -> Arc<DataRow>
    where
        F: FnOnce() -> DataRow,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key).or_default())
        };

        let row = slot.get_or_init(|| {
            debug!("Computing series {:?}", key);
            Arc::new(compute())
        });
        Arc::clone(row)
    }

    /// Cached row for `key` without computing it
    pub fn get(&self, key: &SeriesKey) -> Option<Arc<DataRow>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).and_then(|slot| slot.get().cloned())
    }

    /// Number of rows computed so far
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()
    }

    fn record(day_index: u32, sex: u32, age: u32, count: u64) -> Record {
        Record {
            day_index,
            county_id: 1,
            sex: SexId(sex),
            age: AgeId(age),
            count,
        }
    }

    fn key(sex: Option<u32>) -> SeriesKey {
        SeriesKey {
            area: AreaId::State(1),
            case_state: CaseStateId(0),
            sex: sex.map(SexId),
            age: None,
        }
    }

    #[test]
    fn test_fills_gaps_with_running_total() {
        let days = DayList::spanning(start(), 4);
        let records = vec![record(0, 0, 0, 2), record(3, 0, 0, 5), record(0, 1, 0, 1)];

        let row = compute_data_row(&records, &days, None, None);

        assert_eq!(row.len(), 5);
        assert_eq!(row.daily_counts(), vec![3, 0, 0, 5, 0]);
        let cumulative: Vec<u64> = row.iter().map(|p| p.cumulative).collect();
        assert_eq!(cumulative, vec![3, 3, 3, 8, 8]);
        assert_eq!(row.total(), 8);
    }

    #[test]
    fn test_filters_are_exact_conjunctions() {
        let days = DayList::spanning(start(), 1);
        let records = vec![
            record(0, 0, 1, 2),
            record(0, 0, 2, 3),
            record(1, 1, 1, 7),
        ];

        assert_eq!(compute_data_row(&records, &days, Some(SexId(0)), None).total(), 5);
        assert_eq!(compute_data_row(&records, &days, None, Some(AgeId(1))).total(), 9);
        assert_eq!(
            compute_data_row(&records, &days, Some(SexId(0)), Some(AgeId(1))).total(),
            2
        );
        assert_eq!(
            compute_data_row(&records, &days, Some(SexId(2)), None).total(),
            0
        );
    }

    #[test]
    fn test_get_by_day() {
        let days = DayList::spanning(start(), 2);
        let row = compute_data_row(&[record(1, 0, 0, 4)], &days, None, None);
        let point = row.get(NaiveDate::from_ymd_opt(2020, 3, 2).unwrap()).unwrap();
        assert_eq!((point.daily, point.cumulative), (4, 4));
        assert!(row.get(NaiveDate::from_ymd_opt(2020, 3, 9).unwrap()).is_none());
    }

    #[test]
    fn test_cache_returns_same_arc() {
        let cache = TimeSeriesCache::new();
        let days = DayList::spanning(start(), 0);
        let calls = AtomicUsize::new(0);

        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            compute_data_row(&[], &days, None, None)
        };

        let first = cache.get_or_compute(key(None), compute);
        let second = cache.get_or_compute(key(None), || {
            calls.fetch_add(1, Ordering::SeqCst);
            compute_data_row(&[], &days, None, None)
        });

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);

        assert!(cache.get(&key(Some(1))).is_none());
        cache.get_or_compute(key(Some(1)), || compute_data_row(&[], &days, None, None));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_concurrent_requests_compute_once() {
        let cache = TimeSeriesCache::new();
        let days = DayList::spanning(start(), 10);
        let calls = AtomicUsize::new(0);

        let rows: Vec<Arc<DataRow>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        cache.get_or_compute(key(None), || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            compute_data_row(&[record(3, 0, 0, 1)], &days, None, None)
                        })
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(rows.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }
}
