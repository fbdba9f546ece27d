//! Series command: print the cumulative day series of one area.

use super::aggregate::run_aggregation;
use super::models::SeriesArgs;
use crate::aggregator::DataRow;
use crate::model::{AgeId, CaseStateId, Dimensions, SexId};
use anyhow::{anyhow, Context, Result};
use log::info;
use std::sync::Arc;

/// Execute the series command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Any aggregation error
/// * Unknown area id or dimension label
pub fn execute_series(args: SeriesArgs) -> Result<()> {
    let outcome = run_aggregation(&args.inputs)?;
    let snapshot = &outcome.snapshot;

    let filter = resolve_filter(snapshot.dimensions(), &args)?;

    let area = snapshot
        .area(args.area)
        .ok_or_else(|| anyhow!("Unknown area: {}", args.area))?;

    info!(
        "Computing {} series for {}",
        args.case_state,
        area.display_name()
    );

    let row = snapshot.data_row(area, filter.case_state, filter.sex, filter.age);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(row.as_ref()).context("Failed to serialize series")?
        );
    } else {
        println!("{} ({})", area.display_name(), args.area);
        println!("{}", render_row(&row));
    }

    Ok(())
}

/// Typed filter resolved from dimension labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesFilter {
    pub case_state: CaseStateId,
    pub sex: Option<SexId>,
    pub age: Option<AgeId>,
}

/// Map the label arguments onto dimension ids
pub fn resolve_filter(dimensions: &Dimensions, args: &SeriesArgs) -> Result<SeriesFilter> {
    let case_state = dimensions
        .case_state_id(&args.case_state)
        .ok_or_else(|| anyhow!("Unknown case state: {}", args.case_state))?;

    let sex = args
        .sex
        .as_deref()
        .map(|name| {
            dimensions
                .sex_id(name)
                .ok_or_else(|| anyhow!("Unknown sex: {}", name))
        })
        .transpose()?;

    let age = args
        .age
        .as_deref()
        .map(|name| {
            dimensions
                .age_id(name)
                .ok_or_else(|| anyhow!("Unknown age group: {}", name))
        })
        .transpose()?;

    Ok(SeriesFilter {
        case_state,
        sex,
        age,
    })
}

fn render_row(row: &Arc<DataRow>) -> String {
    let mut lines = vec![format!("  {:<12} {:>10} {:>12}", "day", "daily", "cumulative")];
    lines.extend(row.iter().map(|point| {
        format!(
            "  {:<12} {:>10} {:>12}",
            point.day.to_string(),
            point.daily,
            point.cumulative
        )
    }));
    lines.join("\n")
}
