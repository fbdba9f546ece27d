//! The gapless list of calendar days a snapshot covers.

use chrono::NaiveDate;

/// Consecutive calendar days from the first report date to the last
///
/// Never empty: a run without events still covers its start date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayList {
    days: Vec<NaiveDate>,
}

impl DayList {
    /// Day list running from `start` through `start + last_index` days
    pub fn spanning(start: NaiveDate, last_index: u32) -> Self {
        let days = std::iter::successors(Some(start), |day| day.succ_opt())
            .take(last_index as usize + 1)
            .collect();
        Self { days }
    }

    /// Day list from `first` to `last` inclusive; a `last` before `first`
    /// collapses to the single day `first`
    pub fn between(first: NaiveDate, last: NaiveDate) -> Self {
        let offset = (last - first).num_days().max(0);
        Self::spanning(first, u32::try_from(offset).unwrap_or(u32::MAX))
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.days.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.days.last().copied()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NaiveDate> {
        self.days.get(index).copied()
    }

    /// Day index of `day`, if the list covers it
    pub fn index_of(&self, day: NaiveDate) -> Option<usize> {
        let first = self.first()?;
        let offset = usize::try_from((day - first).num_days()).ok()?;
        (offset < self.days.len()).then_some(offset)
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.iter().copied()
    }

    pub fn as_slice(&self) -> &[NaiveDate] {
        &self.days
    }
}
