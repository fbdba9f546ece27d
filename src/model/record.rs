//! Raw input events and the linked records built from them.

use super::dimension::{AgeId, SexId};
use serde::{Deserialize, Serialize};

/// One event row as it arrives in the data document
///
/// Field names match the zipped record columns. `count` is signed because
/// upstream data may carry corrections; only positive counts are linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub county: u32,
    pub day: u32,
    pub sex: u32,
    pub age: u32,
    pub case_state: u32,
    pub count: i64,
}

/// A linked event, stored under its case state on county, state and nation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    /// Offset in whole days from the first day of the day list
    pub day_index: u32,
    pub county_id: u32,
    pub sex: SexId,
    pub age: AgeId,
    /// Always greater than zero
    pub count: u64,
}

impl Record {
    /// Exact-match filter; `None` means "any"
    pub fn matches(&self, sex: Option<SexId>, age: Option<AgeId>) -> bool {
        sex.map_or(true, |s| self.sex == s) && age.map_or(true, |a| self.age == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sex: u32, age: u32) -> Record {
        Record {
            day_index: 0,
            county_id: 1001,
            sex: SexId(sex),
            age: AgeId(age),
            count: 1,
        }
    }

    #[test]
    fn test_matches_filters() {
        let r = record(1, 3);
        assert!(r.matches(None, None));
        assert!(r.matches(Some(SexId(1)), None));
        assert!(r.matches(None, Some(AgeId(3))));
        assert!(r.matches(Some(SexId(1)), Some(AgeId(3))));
        assert!(!r.matches(Some(SexId(0)), Some(AgeId(3))));
        assert!(!r.matches(Some(SexId(1)), Some(AgeId(2))));
    }

    #[test]
    fn test_raw_event_column_names() {
        let event = RawEvent {
            county: 1001,
            day: 2,
            sex: 0,
            age: 4,
            case_state: 1,
            count: 3,
        };
        let value = serde_json::to_value(event).unwrap();
        assert_eq!(value["caseState"], 1);
        assert_eq!(value["county"], 1001);
    }
}
