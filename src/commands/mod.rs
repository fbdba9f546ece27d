//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod aggregate;
pub mod models;
pub mod series;
pub mod utils;

// Re-export main command functions
pub use aggregate::{execute_aggregate, run_aggregation, validate_args, validate_inputs};
pub use models::{AggregateArgs, InputPaths, SeriesArgs};
pub use series::{execute_series, resolve_filter, SeriesFilter};
pub use utils::{display_schema, display_version, validate_report_file};
