//! Frozen area nodes: nation, states and counties.
//!
//! These types expose read accessors only. They are produced by the
//! snapshot freezer and never change afterwards.

use super::dimension::CaseStateId;
use super::record::Record;
use crate::utils::error::ParseError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Identifies an area across all three levels
///
/// State and county ids live in separate namespaces, so the level is part
/// of the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AreaId {
    Nation,
    State(u32),
    County(u32),
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaId::Nation => write!(f, "nation"),
            AreaId::State(id) => write!(f, "state:{}", id),
            AreaId::County(id) => write!(f, "county:{}", id),
        }
    }
}

impl FromStr for AreaId {
    type Err = ParseError;

    /// Parses `nation`, `state:<id>` or `county:<id>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("nation") {
            return Ok(AreaId::Nation);
        }

        let (level, id) = s
            .split_once(':')
            .ok_or_else(|| ParseError::InvalidFormat(format!("Invalid area id: {}", s)))?;
        let id: u32 = id
            .parse()
            .map_err(|e| ParseError::InvalidFormat(format!("Invalid area id '{}': {}", s, e)))?;

        match level.to_ascii_lowercase().as_str() {
            "state" => Ok(AreaId::State(id)),
            "county" => Ok(AreaId::County(id)),
            other => Err(ParseError::InvalidFormat(format!(
                "Unknown area level: {}",
                other
            ))),
        }
    }
}

/// Data shared by every area level
#[derive(Debug, Clone)]
pub struct Area {
    id: AreaId,
    display_name: String,
    geographic_area: f64,
    population: u64,
    records_by_case_state: BTreeMap<CaseStateId, Vec<Record>>,
    total_by_case_state: BTreeMap<CaseStateId, u64>,
    rate_by_case_state: BTreeMap<CaseStateId, f64>,
}

impl Area {
    pub(crate) fn from_parts(
        id: AreaId,
        display_name: String,
        geographic_area: f64,
        population: u64,
        records_by_case_state: BTreeMap<CaseStateId, Vec<Record>>,
        total_by_case_state: BTreeMap<CaseStateId, u64>,
        rate_by_case_state: BTreeMap<CaseStateId, f64>,
    ) -> Self {
        Self {
            id,
            display_name,
            geographic_area,
            population,
            records_by_case_state,
            total_by_case_state,
            rate_by_case_state,
        }
    }

    pub fn id(&self) -> AreaId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Surface area in square kilometres
    pub fn geographic_area(&self) -> f64 {
        self.geographic_area
    }

    pub fn population(&self) -> u64 {
        self.population
    }

    /// Records linked under `case_state`, in input order
    pub fn records(&self, case_state: CaseStateId) -> &[Record] {
        self.records_by_case_state
            .get(&case_state)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sum of all linked counts for `case_state`; zero for unknown states
    pub fn total(&self, case_state: CaseStateId) -> u64 {
        self.total_by_case_state
            .get(&case_state)
            .copied()
            .unwrap_or(0)
    }

    /// Cases per 100 000 inhabitants; zero when population is zero
    pub fn rate(&self, case_state: CaseStateId) -> f64 {
        self.rate_by_case_state
            .get(&case_state)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn totals(&self) -> &BTreeMap<CaseStateId, u64> {
        &self.total_by_case_state
    }

    pub fn rates(&self) -> &BTreeMap<CaseStateId, f64> {
        &self.rate_by_case_state
    }
}

/// A county and the id of its owning state
#[derive(Debug, Clone)]
pub struct County {
    id: u32,
    area: Area,
    state_id: u32,
}

impl County {
    pub(crate) fn new(id: u32, area: Area, state_id: u32) -> Self {
        Self { id, area, state_id }
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Resolve through `Snapshot::state_of`
    pub fn state_id(&self) -> u32 {
        self.state_id
    }
}

/// A state and its counties, ordered by county id
#[derive(Debug, Clone)]
pub struct State {
    id: u32,
    area: Area,
    counties: Vec<County>,
}

impl State {
    pub(crate) fn new(id: u32, area: Area, counties: Vec<County>) -> Self {
        Self { id, area, counties }
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn counties(&self) -> &[County] {
        &self.counties
    }
}

/// The single root of a snapshot
#[derive(Debug, Clone)]
pub struct Nation {
    area: Area,
    states: Vec<State>,
}

impl Nation {
    pub(crate) fn new(area: Area, states: Vec<State>) -> Self {
        Self { area, states }
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_id_round_trip_display() {
        for id in [AreaId::Nation, AreaId::State(5), AreaId::County(1001)] {
            let parsed: AreaId = id.to_string().parse().unwrap();
            assert_eq!(parsed, id);
        }
    }

    #[test]
    fn test_area_id_parse_errors() {
        assert!("state".parse::<AreaId>().is_err());
        assert!("state:x".parse::<AreaId>().is_err());
        assert!("district:4".parse::<AreaId>().is_err());
        assert_eq!("County:12".parse::<AreaId>().unwrap(), AreaId::County(12));
    }

    #[test]
    fn test_area_defaults_for_unknown_case_state() {
        let area = Area::from_parts(
            AreaId::Nation,
            "Root".to_string(),
            0.0,
            0,
            BTreeMap::new(),
            BTreeMap::new(),
            BTreeMap::new(),
        );
        assert_eq!(area.total(CaseStateId(9)), 0);
        assert_eq!(area.rate(CaseStateId(9)), 0.0);
        assert!(area.records(CaseStateId(9)).is_empty());
    }
}
