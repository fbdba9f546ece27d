//! Raw geographic descriptors the hierarchy is built from.

use serde::{Deserialize, Serialize};

/// A state as listed in the meta document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDescriptor {
    pub id: u32,
    #[serde(alias = "de")]
    pub name: String,
}

/// A county as listed in the meta document
///
/// Population and area are authoritative here; state and nation values are
/// always derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyDescriptor {
    pub id: u32,
    #[serde(alias = "de")]
    pub name: String,
    #[serde(rename = "stateId")]
    pub state_id: u32,
    pub population: u64,
    #[serde(rename = "area", alias = "geographicArea")]
    pub geographic_area: f64,
}

/// All descriptors for one run, in no particular order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoDescriptors {
    pub states: Vec<StateDescriptor>,
    pub counties: Vec<CountyDescriptor>,
}
