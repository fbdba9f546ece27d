//! The immutable result of an aggregation run.
//!
//! A snapshot owns the frozen hierarchy, the day list and the dimension
//! tables. Nothing in its public API mutates published data; the only
//! interior state is the series cache, which only ever gains entries.
//! `Snapshot` is `Send + Sync` and can be shared across threads as is.

use super::series::{compute_data_row, DataRow, SeriesKey, TimeSeriesCache};
use crate::model::{
    AgeId, Area, AreaId, CaseStateId, County, DayList, Dimensions, Nation, SexId, State,
};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
pub struct Snapshot {
    nation: Nation,
    state_index: HashMap<u32, usize>,
    county_index: HashMap<u32, (usize, usize)>,
    days: DayList,
    dimensions: Dimensions,
    last_updated: Option<String>,
    series: TimeSeriesCache,
}

impl Snapshot {
    pub(crate) fn new(
        nation: Nation,
        state_index: HashMap<u32, usize>,
        county_index: HashMap<u32, (usize, usize)>,
        days: DayList,
        dimensions: Dimensions,
        last_updated: Option<String>,
    ) -> Self {
        Self {
            nation,
            state_index,
            county_index,
            days,
            dimensions,
            last_updated,
            series: TimeSeriesCache::new(),
        }
    }

    pub fn nation(&self) -> &Nation {
        &self.nation
    }

    pub fn states(&self) -> &[State] {
        self.nation.states()
    }

    pub fn state(&self, id: u32) -> Option<&State> {
        let idx = *self.state_index.get(&id)?;
        self.nation.states().get(idx)
    }

    pub fn county(&self, id: u32) -> Option<&County> {
        let (state_idx, county_idx) = *self.county_index.get(&id)?;
        self.nation.states().get(state_idx)?.counties().get(county_idx)
    }

    /// All counties, grouped by state
    pub fn counties(&self) -> impl Iterator<Item = &County> {
        self.nation.states().iter().flat_map(|s| s.counties().iter())
    }

    /// The state owning `county`
    pub fn state_of(&self, county: &County) -> Option<&State> {
        self.state(county.state_id())
    }

    /// Any area by id
    pub fn area(&self, id: AreaId) -> Option<&Area> {
        match id {
            AreaId::Nation => Some(self.nation.area()),
            AreaId::State(id) => self.state(id).map(State::area),
            AreaId::County(id) => self.county(id).map(County::area),
        }
    }

    pub fn days(&self) -> &DayList {
        &self.days
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Upstream "data as of" label, when the input carried one
    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    /// Daily and cumulative counts for `area`, optionally filtered by sex
    /// and/or age group
    ///
    /// The first call for a given `(area, case_state, sex, age)` computes
    /// the row; later calls return the same `Arc`. An area from another
    /// snapshot is computed against this day list but never cached.
    pub fn data_row(
        &self,
        area: &Area,
        case_state: CaseStateId,
        sex: Option<SexId>,
        age: Option<AgeId>,
    ) -> Arc<DataRow> {
        if !self.owns(area) {
            debug!("Area {} is not part of this snapshot, row left uncached", area.id());
            return Arc::new(compute_data_row(area.records(case_state), &self.days, sex, age));
        }

        let key = SeriesKey {
            area: area.id(),
            case_state,
            sex,
            age,
        };
        self.series.get_or_compute(key, || {
            compute_data_row(area.records(case_state), &self.days, sex, age)
        })
    }

    /// Same as `data_row`, looking the area up by id
    pub fn data_row_for(
        &self,
        id: AreaId,
        case_state: CaseStateId,
        sex: Option<SexId>,
        age: Option<AgeId>,
    ) -> Option<Arc<DataRow>> {
        let area = self.area(id)?;
        Some(self.data_row(area, case_state, sex, age))
    }

    /// Whether `area` is the instance this snapshot holds under its id
    fn owns(&self, area: &Area) -> bool {
        self.area(area.id()).is_some_and(|own| std::ptr::eq(own, area))
    }

    /// Number of data rows computed so far
    pub fn cached_series(&self) -> usize {
        self.series.len()
    }
}
