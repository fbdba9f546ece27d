//! Domain types shared by the parser, the aggregation pipeline and output.
//!
//! - Dimension tables and their typed ids
//! - Geographic descriptors (raw input) and frozen area nodes (output)
//! - Raw events and linked records
//! - The day list and the ingest report

pub mod area;
pub mod days;
pub mod descriptor;
pub mod dimension;
pub mod record;
pub mod report;

// Re-export main types
pub use area::{Area, AreaId, County, Nation, State};
pub use days::DayList;
pub use descriptor::{CountyDescriptor, GeoDescriptors, StateDescriptor};
pub use dimension::{AgeId, CaseStateId, DimensionEntry, DimensionTable, Dimensions, SexId};
pub use record::{RawEvent, Record};
pub use report::{IngestReport, IngestStage, RowWarning, WarningReason};
