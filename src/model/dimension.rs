//! Dimension tables: sex, age group and case state.
//!
//! Each table is a small ordered list of `{id, name}` entries loaded once
//! per run. Everything else refers to entries by id only, through the typed
//! id wrappers below so a sex id can never be passed where an age id is
//! expected.

use crate::utils::config::{AGE_GROUPS, CASE_STATES, SEX};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! dimension_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }
    };
}

dimension_id!(
    /// Id of an entry in the sex table
    SexId
);
dimension_id!(
    /// Id of an entry in the age group table
    AgeId
);
dimension_id!(
    /// Id of an entry in the case state table
    CaseStateId
);

/// One `{id, name}` row of a dimension table
///
/// Older documents label the name field `de`; both spellings decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionEntry {
    pub id: u32,
    #[serde(alias = "de")]
    pub name: String,
}

impl DimensionEntry {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Ordered, immutable set of dimension entries
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionTable {
    entries: Vec<DimensionEntry>,
}

impl DimensionTable {
    pub fn new(entries: Vec<DimensionEntry>) -> Self {
        Self { entries }
    }

    pub fn from_pairs(pairs: &[(u32, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(id, name)| DimensionEntry::new(*id, *name))
                .collect(),
        )
    }

    pub fn entries(&self) -> &[DimensionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.name.as_str())
    }

    /// Look up the id carrying exactly this name
    pub fn id_for_name(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.id)
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }
}

/// The three dimension tables an aggregation run works against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimensions {
    pub sex: DimensionTable,
    pub ages: DimensionTable,
    pub case_states: DimensionTable,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            sex: DimensionTable::from_pairs(SEX),
            ages: DimensionTable::from_pairs(AGE_GROUPS),
            case_states: DimensionTable::from_pairs(CASE_STATES),
        }
    }
}

impl Dimensions {
    pub fn sex_ids(&self) -> impl Iterator<Item = SexId> + '_ {
        self.sex.ids().map(SexId)
    }

    pub fn age_ids(&self) -> impl Iterator<Item = AgeId> + '_ {
        self.ages.ids().map(AgeId)
    }

    pub fn case_state_ids(&self) -> impl Iterator<Item = CaseStateId> + '_ {
        self.case_states.ids().map(CaseStateId)
    }

    pub fn sex_id(&self, name: &str) -> Option<SexId> {
        self.sex.id_for_name(name).map(SexId)
    }

    pub fn age_id(&self, name: &str) -> Option<AgeId> {
        self.ages.id_for_name(name).map(AgeId)
    }

    pub fn case_state_id(&self, name: &str) -> Option<CaseStateId> {
        self.case_states.id_for_name(name).map(CaseStateId)
    }

    pub fn case_state_name(&self, id: CaseStateId) -> Option<&str> {
        self.case_states.name_of(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables() {
        let dims = Dimensions::default();
        assert_eq!(dims.case_states.len(), 2);
        assert_eq!(dims.ages.len(), 7);
        assert_eq!(dims.sex.len(), 3);
        assert_eq!(dims.case_state_id("death"), Some(CaseStateId(1)));
        assert_eq!(dims.age_id("A80+"), Some(AgeId(5)));
        assert_eq!(dims.sex_id("unbekannt"), Some(SexId(2)));
    }

    #[test]
    fn test_id_for_name_is_exact() {
        let table = DimensionTable::from_pairs(&[(0, "A00-A04"), (1, "A05-A14")]);
        assert_eq!(table.id_for_name("A00"), None);
        assert_eq!(table.id_for_name("a00-a04"), None);
        assert_eq!(table.id_for_name("A05-A14"), Some(1));
    }

    #[test]
    fn test_entry_accepts_legacy_label() {
        let entry: DimensionEntry = serde_json::from_str(r#"{"id": 3, "de": "A35-A59"}"#).unwrap();
        assert_eq!(entry, DimensionEntry::new(3, "A35-A59"));

        let table: DimensionTable =
            serde_json::from_str(r#"[{"id": 0, "name": "W"}, {"id": 1, "de": "M"}]"#).unwrap();
        assert_eq!(table.name_of(1), Some("M"));
        assert!(!table.contains(2));
    }
}
