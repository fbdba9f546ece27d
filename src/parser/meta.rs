//! Decode the geographic meta document.
//!
//! The document carries zipped state and county tables plus, optionally,
//! the three dimension tables. Missing dimension tables fall back to the
//! built-in defaults.

use super::zipped::ZippedObjectArray;
use crate::model::{
    CountyDescriptor, DimensionEntry, DimensionTable, Dimensions, GeoDescriptors, StateDescriptor,
};
use crate::utils::error::ParseError;
use log::debug;
use serde::{Deserialize, Serialize};

/// Meta document as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMeta {
    pub states: ZippedObjectArray,
    pub counties: ZippedObjectArray,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Vec<DimensionEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ages: Option<Vec<DimensionEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_states: Option<Vec<DimensionEntry>>,
}

/// Typed contents of a meta document
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMeta {
    pub geo: GeoDescriptors,
    pub dimensions: Dimensions,
}

/// Parse a meta document from JSON text
///
/// **Public** - entry point for the meta input
///
/// # Errors
/// * `ParseError::JsonError` - invalid JSON, or a descriptor row that does
///   not match the expected shape
/// * `ParseError::RowWidth` - a zipped row with the wrong number of values
pub fn parse_meta(input: &str) -> Result<DecodedMeta, ParseError> {
    let raw: RawMeta = serde_json::from_str(input)?;
    decode_meta(raw)
}

/// Decode an already deserialized meta document
pub fn decode_meta(raw: RawMeta) -> Result<DecodedMeta, ParseError> {
    let states: Vec<StateDescriptor> = raw.states.unzip_deserialize()?;
    let counties: Vec<CountyDescriptor> = raw.counties.unzip_deserialize()?;

    debug!(
        "Decoded meta: {} states, {} counties",
        states.len(),
        counties.len()
    );

    let defaults = Dimensions::default();
    let dimensions = Dimensions {
        sex: raw.sex.map(DimensionTable::new).unwrap_or(defaults.sex),
        ages: raw.ages.map(DimensionTable::new).unwrap_or(defaults.ages),
        case_states: raw
            .case_states
            .map(DimensionTable::new)
            .unwrap_or(defaults.case_states),
    };

    Ok(DecodedMeta {
        geo: GeoDescriptors { states, counties },
        dimensions,
    })
}
