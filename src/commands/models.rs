use crate::model::AreaId;
use crate::utils::config::{DEFAULT_SERIES_CASE_STATE, DEFAULT_TOP_STATES};
use std::path::PathBuf;

/// Input documents shared by every command that aggregates
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct InputPaths {
    /// Meta document (states, counties, dimension tables)
    pub meta: PathBuf,

    /// Data document (start date and zipped event records)
    pub data: PathBuf,
}

/// Arguments for the aggregate command
#[derive(Debug, Clone)]
pub struct AggregateArgs {
    pub inputs: InputPaths,

    /// Output path for the JSON report; printed to stdout when absent
    pub output: Option<PathBuf>,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// States listed in the summary
    pub top_states: usize,
}

impl Default for AggregateArgs {
    fn default() -> Self {
        Self {
            inputs: InputPaths::default(),
            output: None,
            print_summary: false,
            top_states: DEFAULT_TOP_STATES,
        }
    }
}

/// Arguments for the series command
#[derive(Debug, Clone)]
pub struct SeriesArgs {
    pub inputs: InputPaths,

    pub area: AreaId,

    /// Case state name, e.g. "confirmed"
    pub case_state: String,

    /// Sex label filter
    pub sex: Option<String>,

    /// Age group label filter
    pub age: Option<String>,

    /// Print the row as JSON instead of a table
    pub json: bool,
}

impl Default for SeriesArgs {
    fn default() -> Self {
        Self {
            inputs: InputPaths::default(),
            area: AreaId::Nation,
            case_state: DEFAULT_SERIES_CASE_STATE.to_string(),
            sex: None,
            age: None,
            json: false,
        }
    }
}
