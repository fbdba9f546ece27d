//! Aggregate command implementation.
//!
//! The aggregate command:
//! 1. Loads the meta and data documents
//! 2. Runs the aggregation pipeline
//! 3. Builds the snapshot report
//! 4. Writes the report and optionally prints a summary

use super::models::{AggregateArgs, InputPaths};
use crate::aggregator::{aggregate, Aggregation, AggregationContext};
use crate::output::{render_summary, report_to_string, to_report, write_report};
use crate::parser::{parse_data, parse_meta, DecodedData, DecodedMeta};
use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use std::path::Path;
use std::time::Instant;

/// Execute the aggregate command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Unreadable or structurally invalid input documents
/// * Dangling or duplicate references between descriptors and events
/// * File write errors
pub fn execute_aggregate(args: AggregateArgs) -> Result<()> {
    let start_time = Instant::now();

    let outcome = run_aggregation(&args.inputs)?;

    let report = to_report(&outcome.snapshot, &outcome.report)
        .context("Failed to build snapshot report")?;

    match &args.output {
        Some(path) => {
            write_report(&report, path).context("Failed to write snapshot report")?;
            info!("✓ Report written to: {}", path.display());
        }
        None if !args.print_summary => {
            println!("{}", report_to_string(&report)?);
        }
        None => {}
    }

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("SNAPSHOT SUMMARY");
        println!("{}", "=".repeat(80));
        println!(
            "{}",
            render_summary(&outcome.snapshot, &outcome.report, args.top_states)
        );
        println!("{}", "=".repeat(80));
    }

    info!(
        "Aggregation completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Load both input documents and aggregate them
///
/// **Public** - shared by the aggregate and series commands
///
/// Decode warnings are merged ahead of link warnings in the returned
/// report.
pub fn run_aggregation(inputs: &InputPaths) -> Result<Aggregation> {
    let (meta, data) = load_inputs(&inputs.meta, &inputs.data)?;

    let mut ctx = AggregationContext::new(data.start_date).with_dimensions(meta.dimensions);
    if let Some(last_date) = data.last_date {
        ctx = ctx.with_last_date(last_date);
    }
    if let Some(last_updated) = data.last_updated {
        ctx = ctx.with_last_updated(last_updated);
    }

    let outcome = aggregate(&ctx, &meta.geo, &data.events).context("Aggregation failed")?;

    let mut report = data.report;
    report.absorb(outcome.report);

    Ok(Aggregation {
        snapshot: outcome.snapshot,
        report,
    })
}

/// Read and decode both documents on separate threads
fn load_inputs(meta_path: &Path, data_path: &Path) -> Result<(DecodedMeta, DecodedData)> {
    info!(
        "Loading inputs: meta {}, data {}",
        meta_path.display(),
        data_path.display()
    );

    let (meta, data) = std::thread::scope(|scope| {
        let meta = scope.spawn(|| load_meta(meta_path));
        let data = scope.spawn(|| load_data(data_path));
        (meta.join(), data.join())
    });

    let meta = meta.map_err(|_| anyhow!("Meta loader thread panicked"))??;
    let data = data.map_err(|_| anyhow!("Data loader thread panicked"))??;

    debug!(
        "Loaded {} states, {} counties, {} events",
        meta.geo.states.len(),
        meta.geo.counties.len(),
        data.events.len()
    );

    Ok((meta, data))
}

fn load_meta(path: &Path) -> Result<DecodedMeta> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read meta document {}", path.display()))?;
    parse_meta(&text).with_context(|| format!("Failed to parse meta document {}", path.display()))
}

fn load_data(path: &Path) -> Result<DecodedData> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data document {}", path.display()))?;
    parse_data(&text).with_context(|| format!("Failed to parse data document {}", path.display()))
}

/// Validate input paths
///
/// **Public** - can be called before any command that reads inputs
pub fn validate_inputs(inputs: &InputPaths) -> Result<()> {
    for (label, path) in [("Meta", &inputs.meta), ("Data", &inputs.data)] {
        if path.as_os_str().is_empty() {
            anyhow::bail!("{} document path cannot be empty", label);
        }
        if !path.is_file() {
            anyhow::bail!("{} document not found: {}", label, path.display());
        }
    }
    Ok(())
}

/// Validate aggregate arguments
///
/// **Public** - can be called before execute_aggregate for early validation
pub fn validate_args(args: &AggregateArgs) -> Result<()> {
    validate_inputs(&args.inputs)?;

    if let Some(output) = &args.output {
        if output.is_dir() {
            anyhow::bail!("Output path is a directory: {}", output.display());
        }
    }

    if args.top_states == 0 {
        anyhow::bail!("top_states must be greater than 0");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CaseStateId;
    use std::path::PathBuf;

    fn write_inputs(dir: &Path) -> InputPaths {
        let meta = dir.join("meta.json");
        let data = dir.join("data.json");
        std::fs::write(
            &meta,
            r#"{
                "states": {"fields": ["id", "name"], "values": [[1, "Nord"]]},
                "counties": {
                    "fields": ["id", "name", "stateId", "population", "area"],
                    "values": [[1001, "A", 1, 100, 10.0], [1002, "B", 1, 100, 12.5]]
                }
            }"#,
        )
        .unwrap();
        std::fs::write(
            &data,
            r#"{
                "startDate": "2020-03-01",
                "records": {
                    "fields": ["county", "day", "sex", "age", "caseState", "count"],
                    "values": [[1001, 0, 0, 0, 0, 5], [1001, 1, 0, 0, 0, 3], [1002, 0, 1, 0, 0, 2],
                               [1002, 0, 1, 0, 0, "x"]]
                }
            }"#,
        )
        .unwrap();
        InputPaths { meta, data }
    }

    #[test]
    fn test_run_aggregation_merges_reports() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_inputs(dir.path());

        let outcome = run_aggregation(&inputs).unwrap();
        let nation = outcome.snapshot.nation().area();

        assert_eq!(nation.total(CaseStateId(0)), 10);
        assert_eq!(outcome.report.linked, 3);
        assert_eq!(outcome.report.warning_count(), 1);
    }

    #[test]
    fn test_execute_aggregate_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out/snapshot.json");
        let args = AggregateArgs {
            inputs: write_inputs(dir.path()),
            output: Some(output.clone()),
            ..Default::default()
        };

        validate_args(&args).unwrap();
        execute_aggregate(args).unwrap();

        assert!(output.exists());
    }

    #[test]
    fn test_validate_args_missing_inputs() {
        let args = AggregateArgs {
            inputs: InputPaths {
                meta: PathBuf::from("/nonexistent/meta.json"),
                data: PathBuf::from("/nonexistent/data.json"),
            },
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_empty_path() {
        assert!(validate_args(&AggregateArgs::default()).is_err());
    }

    #[test]
    fn test_validate_args_top_states_zero() {
        let dir = tempfile::tempdir().unwrap();
        let args = AggregateArgs {
            inputs: write_inputs(dir.path()),
            top_states: 0,
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_output_is_directory() {
        let dir = tempfile::tempdir().unwrap();
        let args = AggregateArgs {
            inputs: write_inputs(dir.path()),
            output: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_missing_county_fails() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_inputs(dir.path());
        std::fs::write(
            &inputs.data,
            r#"{
                "startDate": "2020-03-01",
                "records": {
                    "fields": ["county", "day", "sex", "age", "caseState", "count"],
                    "values": [[9999, 0, 0, 0, 0, 1]]
                }
            }"#,
        )
        .unwrap();

        assert!(run_aggregation(&inputs).is_err());
    }
}
