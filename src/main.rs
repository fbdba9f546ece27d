//! Outbreak Atlas CLI
//!
//! Aggregates county-level case and death events into nation, state and
//! county totals, rates and cumulative day series.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use outbreak_atlas::commands::{
    display_schema, display_version, execute_aggregate, execute_series, validate_args,
    validate_inputs, validate_report_file, AggregateArgs, InputPaths, SeriesArgs,
};
use outbreak_atlas::model::AreaId;
use outbreak_atlas::utils::config::{
    DATA_PATH_ENV, DEFAULT_SERIES_CASE_STATE, DEFAULT_TOP_STATES, META_PATH_ENV,
};

/// Outbreak Atlas - epidemiological aggregation by area
#[derive(Parser, Debug)]
#[command(name = "outbreak-atlas")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Input document paths
#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Meta document (states, counties, dimension tables)
    #[arg(short, long, env = META_PATH_ENV)]
    meta: PathBuf,

    /// Data document (start date and zipped event records)
    #[arg(short, long, env = DATA_PATH_ENV)]
    data: PathBuf,
}

impl From<InputArgs> for InputPaths {
    fn from(args: InputArgs) -> Self {
        Self {
            meta: args.meta,
            data: args.data,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Aggregate inputs into a snapshot report
    Aggregate {
        #[command(flatten)]
        inputs: InputArgs,

        /// Output path for the JSON report (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Number of states listed in the summary
        #[arg(long, default_value_t = DEFAULT_TOP_STATES)]
        top_states: usize,
    },

    /// Print the daily and cumulative series of one area
    Series {
        #[command(flatten)]
        inputs: InputArgs,

        /// Area: nation, state:ID or county:ID
        #[arg(short, long, default_value = "nation")]
        area: AreaId,

        /// Case state name
        #[arg(long, default_value = DEFAULT_SERIES_CASE_STATE)]
        case_state: String,

        /// Sex label filter
        #[arg(long)]
        sex: Option<String>,

        /// Age group label filter
        #[arg(long)]
        age: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Aggregate {
            inputs,
            output,
            summary,
            top_states,
        } => {
            let args = AggregateArgs {
                inputs: inputs.into(),
                output,
                print_summary: summary,
                top_states,
            };

            validate_args(&args)?;
            execute_aggregate(args)?;
        }

        Commands::Series {
            inputs,
            area,
            case_state,
            sex,
            age,
            json,
        } => {
            let args = SeriesArgs {
                inputs: inputs.into(),
                area,
                case_state,
                sex,
                age,
                json,
            };

            validate_inputs(&args.inputs)?;
            execute_series(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(&file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
