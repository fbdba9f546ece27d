//! Build the mutable staging hierarchy from geographic descriptors.
//!
//! The staging types live only for the duration of one aggregation run:
//! the linker fills them, the rate normalizer annotates them and the
//! freezer turns them into the public, read-only snapshot.

use super::AggregationContext;
use crate::model::{AreaId, CaseStateId, CountyDescriptor, GeoDescriptors, Record, StateDescriptor};
use crate::utils::error::{EngineError, ReferenceKind};
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// Area under construction
#[derive(Debug, Clone)]
pub(crate) struct StagedArea {
    pub(crate) id: AreaId,
    pub(crate) display_name: String,
    pub(crate) geographic_area: f64,
    pub(crate) population: u64,
    pub(crate) records: BTreeMap<CaseStateId, Vec<Record>>,
    pub(crate) totals: BTreeMap<CaseStateId, u64>,
    pub(crate) rates: BTreeMap<CaseStateId, f64>,
}

impl StagedArea {
    /// Zeroed totals and empty record lists for every case state
    fn new(id: AreaId, display_name: impl Into<String>, case_states: &[CaseStateId]) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            geographic_area: 0.0,
            population: 0,
            records: case_states.iter().map(|c| (*c, Vec::new())).collect(),
            totals: case_states.iter().map(|c| (*c, 0)).collect(),
            rates: BTreeMap::new(),
        }
    }

    /// Running total for `case_state`, zero if it has none
    pub(crate) fn total(&self, case_state: CaseStateId) -> u64 {
        self.totals.get(&case_state).copied().unwrap_or(0)
    }

    /// Append a record and add its count to the running total
    ///
    /// The caller checks headroom first; saturating keeps a missed check
    /// from wrapping.
    pub(crate) fn push(&mut self, case_state: CaseStateId, record: Record) {
        let total = self.totals.entry(case_state).or_insert(0);
        *total = total.saturating_add(record.count);
        self.records.entry(case_state).or_default().push(record);
    }
}

#[derive(Debug, Clone)]
pub(crate) struct StagedCounty {
    pub(crate) id: u32,
    pub(crate) state_id: u32,
    pub(crate) area: StagedArea,
}

#[derive(Debug, Clone)]
pub(crate) struct StagedState {
    pub(crate) id: u32,
    pub(crate) area: StagedArea,
    pub(crate) counties: Vec<StagedCounty>,
}

/// Position of a county: (state index, county index within that state)
pub(crate) type CountySlot = (usize, usize);

#[derive(Debug, Clone)]
pub(crate) struct StagedHierarchy {
    pub(crate) nation: StagedArea,
    pub(crate) states: Vec<StagedState>,
    pub(crate) state_index: HashMap<u32, usize>,
    pub(crate) county_index: HashMap<u32, CountySlot>,
}

impl StagedHierarchy {
    /// Whether `count` can be added under `case_state` without overflowing
    ///
    /// The nation total bounds every state and county total, so checking it
    /// covers all three levels.
    pub(crate) fn has_headroom(&self, case_state: CaseStateId, count: u64) -> bool {
        self.nation.total(case_state).checked_add(count).is_some()
    }

    /// Add `record` to its county, the owning state and the nation
    ///
    /// Resolution goes through the index captured at build time, so each
    /// call is constant time.
    pub(crate) fn link(
        &mut self,
        case_state: CaseStateId,
        record: Record,
    ) -> Result<(), EngineError> {
        let missing = || {
            EngineError::missing(
                ReferenceKind::County,
                record.county_id,
                format!("record for day {}", record.day_index),
            )
        };

        let (state_idx, county_idx) = *self
            .county_index
            .get(&record.county_id)
            .ok_or_else(missing)?;
        let state = self.states.get_mut(state_idx).ok_or_else(missing)?;
        let county = state.counties.get_mut(county_idx).ok_or_else(missing)?;

        county.area.push(case_state, record);
        state.area.push(case_state, record);
        self.nation.push(case_state, record);

        Ok(())
    }

    /// Every staged area, nation first
    pub(crate) fn areas_mut(&mut self) -> impl Iterator<Item = &mut StagedArea> {
        std::iter::once(&mut self.nation).chain(self.states.iter_mut().flat_map(|state| {
            std::iter::once(&mut state.area).chain(state.counties.iter_mut().map(|c| &mut c.area))
        }))
    }
}

/// Build the staging hierarchy
///
/// **Crate-internal** - first stage of `aggregate`
///
/// # Arguments
/// * `ctx` - Aggregation context (dimension tables, root label)
/// * `geo` - State and county descriptors, any order
///
/// # Returns
/// Hierarchy with states ordered by id, counties ordered by id within their
/// state, populations and areas summed bottom-up and totals zeroed
///
/// # Errors
/// * `EngineError::MissingReference` - a county names an unknown state
/// * `EngineError::DuplicateId` - two states or two counties share an id
pub(crate) fn build_hierarchy(
    ctx: &AggregationContext,
    geo: &GeoDescriptors,
) -> Result<StagedHierarchy, EngineError> {
    debug!(
        "Building hierarchy from {} states and {} counties",
        geo.states.len(),
        geo.counties.len()
    );

    let case_states: Vec<CaseStateId> = ctx.dimensions.case_state_ids().collect();

    let mut states_sorted: Vec<&StateDescriptor> = geo.states.iter().collect();
    states_sorted.sort_by_key(|s| s.id);

    let mut state_index = HashMap::with_capacity(states_sorted.len());
    let mut states = Vec::with_capacity(states_sorted.len());
    for descriptor in states_sorted {
        if state_index.insert(descriptor.id, states.len()).is_some() {
            return Err(EngineError::DuplicateId {
                kind: ReferenceKind::State,
                id: descriptor.id,
            });
        }
        states.push(StagedState {
            id: descriptor.id,
            area: StagedArea::new(AreaId::State(descriptor.id), &descriptor.name, &case_states),
            counties: Vec::new(),
        });
    }

    let mut counties_sorted: Vec<&CountyDescriptor> = geo.counties.iter().collect();
    counties_sorted.sort_by_key(|c| c.id);

    let mut county_index = HashMap::with_capacity(counties_sorted.len());
    for descriptor in counties_sorted {
        let missing_state = || {
            EngineError::missing(
                ReferenceKind::State,
                descriptor.state_id,
                format!("county {}", descriptor.id),
            )
        };
        let state_idx = *state_index.get(&descriptor.state_id).ok_or_else(missing_state)?;
        let state = states.get_mut(state_idx).ok_or_else(missing_state)?;

        if county_index
            .insert(descriptor.id, (state_idx, state.counties.len()))
            .is_some()
        {
            return Err(EngineError::DuplicateId {
                kind: ReferenceKind::County,
                id: descriptor.id,
            });
        }

        let mut area = StagedArea::new(
            AreaId::County(descriptor.id),
            &descriptor.name,
            &case_states,
        );
        area.population = descriptor.population;
        area.geographic_area = descriptor.geographic_area;

        state.counties.push(StagedCounty {
            id: descriptor.id,
            state_id: descriptor.state_id,
            area,
        });
    }

    // County values are authoritative; everything above is a derived sum
    let mut nation = StagedArea::new(AreaId::Nation, &ctx.root_label, &case_states);
    for state in &mut states {
        state.area.population = state.counties.iter().map(|c| c.area.population).sum();
        state.area.geographic_area = state.counties.iter().map(|c| c.area.geographic_area).sum();
        nation.population += state.area.population;
        nation.geographic_area += state.area.geographic_area;
    }

    debug!(
        "Hierarchy built: population {}, area {:.2} km²",
        nation.population, nation.geographic_area
    );

    Ok(StagedHierarchy {
        nation,
        states,
        state_index,
        county_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ctx() -> AggregationContext {
        AggregationContext::new(NaiveDate::from_ymd_opt(2020, 3, 1).unwrap())
    }

    fn state(id: u32, name: &str) -> StateDescriptor {
        StateDescriptor {
            id,
            name: name.to_string(),
        }
    }

    fn county(id: u32, state_id: u32, population: u64, area: f64) -> CountyDescriptor {
        CountyDescriptor {
            id,
            name: format!("County {}", id),
            state_id,
            population,
            geographic_area: area,
        }
    }

    #[test]
    fn test_build_orders_and_sums() {
        let geo = GeoDescriptors {
            states: vec![state(2, "Hamburg"), state(1, "Schleswig-Holstein")],
            counties: vec![
                county(1002, 1, 250, 10.5),
                county(2000, 2, 1800, 755.0),
                county(1001, 1, 90, 56.4),
            ],
        };

        let h = build_hierarchy(&ctx(), &geo).unwrap();

        assert_eq!(h.states.len(), 2);
        assert_eq!(h.states[0].id, 1);
        assert_eq!(h.states[0].counties[0].id, 1001);
        assert_eq!(h.states[0].counties[1].id, 1002);
        assert_eq!(h.states[0].area.population, 340);
        assert!((h.states[0].area.geographic_area - 66.9).abs() < 1e-9);
        assert_eq!(h.nation.population, 2140);
        assert_eq!(h.nation.display_name, "Deutschland");
        assert_eq!(h.county_index[&2000], (1, 0));
    }

    #[test]
    fn test_totals_seeded_for_every_case_state() {
        let geo = GeoDescriptors {
            states: vec![state(1, "A")],
            counties: vec![county(10, 1, 5, 1.0)],
        };
        let h = build_hierarchy(&ctx(), &geo).unwrap();
        let county = &h.states[0].counties[0].area;
        assert_eq!(county.totals.len(), 2);
        assert!(county.totals.values().all(|t| *t == 0));
        assert!(county.records.values().all(Vec::is_empty));
    }

    #[test]
    fn test_unknown_state_is_fatal() {
        let geo = GeoDescriptors {
            states: vec![state(1, "A")],
            counties: vec![county(10, 1, 5, 1.0), county(20, 7, 5, 1.0)],
        };
        let err = build_hierarchy(&ctx(), &geo).unwrap_err();
        assert!(matches!(
            err,
            EngineError::MissingReference {
                kind: ReferenceKind::State,
                id: 7,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_ids_are_fatal() {
        let geo = GeoDescriptors {
            states: vec![state(1, "A"), state(1, "B")],
            counties: vec![],
        };
        assert_eq!(
            build_hierarchy(&ctx(), &geo).unwrap_err(),
            EngineError::DuplicateId {
                kind: ReferenceKind::State,
                id: 1
            }
        );

        let geo = GeoDescriptors {
            states: vec![state(1, "A")],
            counties: vec![county(10, 1, 5, 1.0), county(10, 1, 5, 1.0)],
        };
        assert!(matches!(
            build_hierarchy(&ctx(), &geo),
            Err(EngineError::DuplicateId {
                kind: ReferenceKind::County,
                ..
            })
        ));
    }

    #[test]
    fn test_state_without_counties() {
        let geo = GeoDescriptors {
            states: vec![state(1, "Empty")],
            counties: vec![],
        };
        let h = build_hierarchy(&ctx(), &geo).unwrap();
        assert_eq!(h.states[0].area.population, 0);
        assert_eq!(h.nation.geographic_area, 0.0);
    }
}
