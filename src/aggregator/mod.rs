//! Aggregation of raw events into an immutable area snapshot.
//!
//! This module transforms descriptors and events into:
//! - A nation → state → county hierarchy with per-case-state totals
//! - Population-normalized rates
//! - A frozen `Snapshot` with memoized cumulative day series
//!
//! # Example
//! ```ignore
//! use outbreak_atlas::aggregator::{aggregate, AggregationContext};
//!
//! let ctx = AggregationContext::new(start_date).with_dimensions(dimensions);
//! let outcome = aggregate(&ctx, &geo, &events)?;
//! let nation = outcome.snapshot.nation().area();
//! let row = outcome.snapshot.data_row(nation, confirmed, None, None);
//! ```

mod freezer;
mod hierarchy;
mod linker;
pub mod rates;
pub mod series;
pub mod snapshot;

// Re-export main types and functions
pub use rates::rate_per_100k;
pub use series::{compute_data_row, DataPoint, DataRow, SeriesKey, TimeSeriesCache};
pub use snapshot::Snapshot;

use crate::model::{Dimensions, GeoDescriptors, IngestReport, RawEvent};
use crate::utils::config::{DEFAULT_ROOT_LABEL, MAX_DAY_SPAN};
use crate::utils::error::EngineError;
use chrono::NaiveDate;
use log::info;

/// Everything an aggregation run needs besides the raw inputs
///
/// Passed explicitly into each stage; nothing is read from global state.
#[derive(Debug, Clone)]
pub struct AggregationContext {
    /// Sex, age group and case state tables
    pub dimensions: Dimensions,

    /// Display name of the nation
    pub root_label: String,

    /// Day index 0
    pub start_date: NaiveDate,

    /// Extends the day list past the last linked record, if later
    pub last_date: Option<NaiveDate>,

    /// Upstream "data as of" label, carried through to the snapshot
    pub last_updated: Option<String>,

    /// Highest day index accepted from events or `last_date`
    pub max_day_span: u32,
}

impl AggregationContext {
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            dimensions: Dimensions::default(),
            root_label: DEFAULT_ROOT_LABEL.to_string(),
            start_date,
            last_date: None,
            last_updated: None,
            max_day_span: MAX_DAY_SPAN,
        }
    }

    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = label.into();
        self
    }

    pub fn with_last_date(mut self, last_date: NaiveDate) -> Self {
        self.last_date = Some(last_date);
        self
    }

    pub fn with_last_updated(mut self, last_updated: impl Into<String>) -> Self {
        self.last_updated = Some(last_updated.into());
        self
    }

    pub fn with_max_day_span(mut self, max_day_span: u32) -> Self {
        self.max_day_span = max_day_span;
        self
    }
}

/// Result of a successful run: the snapshot plus what was skipped on the way
#[derive(Debug)]
pub struct Aggregation {
    pub snapshot: Snapshot,
    pub report: IngestReport,
}

/// Run the full pipeline
///
/// **Public** - main entry point for aggregation
///
/// # Arguments
/// * `ctx` - Dimension tables, dates and labels for this run
/// * `geo` - State and county descriptors
/// * `events` - Complete, materialized event list
///
/// # Returns
/// The frozen snapshot and an ingest report listing skipped rows
///
/// # Errors
/// * `EngineError::MissingReference` - a county names an unknown state, or
///   an event names an unknown county
/// * `EngineError::DuplicateId` - descriptors repeat a state or county id
///
/// On error nothing is returned: a partially linked hierarchy is never
/// published.
pub fn aggregate(
    ctx: &AggregationContext,
    geo: &GeoDescriptors,
    events: &[RawEvent],
) -> Result<Aggregation, EngineError> {
    info!("Step 1/4: Building area hierarchy...");
    let mut staged = hierarchy::build_hierarchy(ctx, geo)?;

    info!("Step 2/4: Linking {} events...", events.len());
    let mut report = IngestReport::new();
    let max_day = linker::link_records(&mut staged, ctx, events, &mut report)?;
    info!("Ingest: {}", report.summary());

    info!("Step 3/4: Normalizing rates...");
    rates::normalize_rates(&mut staged);

    info!("Step 4/4: Freezing snapshot...");
    let snapshot = freezer::freeze(staged, ctx, max_day);

    Ok(Aggregation { snapshot, report })
}
