//! Configuration and constants for the engine and CLI.

/// Current output report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Rates are expressed per this many inhabitants
pub const RATE_SCALE: f64 = 100_000.0;

/// Synthetic id used for the nation when it is written out
pub const NATION_ID: u32 = 0;

/// Display name of the root area unless the context overrides it
pub const DEFAULT_ROOT_LABEL: &str = "Deutschland";

/// Highest day index a run accepts, about a century past the start date
pub const MAX_DAY_SPAN: u32 = 36_600;

// Case state ids the feed splits every source row into
pub const CONFIRMED_CASE_STATE: u32 = 0;
pub const DEATH_CASE_STATE: u32 = 1;

// Default dimension tables (id, label)
pub const CASE_STATES: &[(u32, &str)] = &[
    (CONFIRMED_CASE_STATE, "confirmed"),
    (DEATH_CASE_STATE, "death"),
];

pub const AGE_GROUPS: &[(u32, &str)] = &[
    (0, "A00-A04"),
    (1, "A05-A14"),
    (2, "A15-A34"),
    (3, "A35-A59"),
    (4, "A60-A79"),
    (5, "A80+"),
    (6, "unbekannt"),
];

pub const SEX: &[(u32, &str)] = &[(0, "W"), (1, "M"), (2, "unbekannt")];

// Column names of the zipped event records
pub const COUNTY_COLUMN: &str = "county";
pub const DAY_COLUMN: &str = "day";
pub const SEX_COLUMN: &str = "sex";
pub const AGE_COLUMN: &str = "age";
pub const CASE_STATE_COLUMN: &str = "caseState";
pub const COUNT_COLUMN: &str = "count";

pub const EVENT_COLUMNS: &[&str] = &[
    COUNTY_COLUMN,
    DAY_COLUMN,
    SEX_COLUMN,
    AGE_COLUMN,
    CASE_STATE_COLUMN,
    COUNT_COLUMN,
];

/// Environment variables the CLI reads input paths from
pub const META_PATH_ENV: &str = "OUTBREAK_META";
pub const DATA_PATH_ENV: &str = "OUTBREAK_DATA";

/// States listed in the text summary unless overridden
pub const DEFAULT_TOP_STATES: usize = 10;

/// Case state a series is drawn for when none is named
pub const DEFAULT_SERIES_CASE_STATE: &str = "confirmed";
