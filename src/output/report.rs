//! Build reports and text summaries from a snapshot.

use super::schema::{AreaSummary, DayRange, SnapshotReport};
use crate::aggregator::Snapshot;
use crate::model::{Area, CaseStateId, IngestReport};
use crate::parser::{Row, ZippedObjectArray};
use crate::utils::config::{NATION_ID, SCHEMA_VERSION};
use crate::utils::error::ParseError;
use chrono::Utc;
use serde_json::{json, Value};

/// Build the serializable report for a snapshot
///
/// **Public** - main entry point for report output
///
/// # Arguments
/// * `snapshot` - Frozen aggregation result
/// * `ingest` - Report returned alongside the snapshot
///
/// # Errors
/// * `ParseError` - zipping the state or county table failed
pub fn to_report(snapshot: &Snapshot, ingest: &IngestReport) -> Result<SnapshotReport, ParseError> {
    let case_states = case_state_labels(snapshot);

    let state_rows: Vec<Row> = snapshot
        .states()
        .iter()
        .map(|state| area_row(state.id(), state.area(), None, &case_states))
        .collect();

    let county_rows: Vec<Row> = snapshot
        .counties()
        .map(|county| {
            area_row(
                county.id(),
                county.area(),
                Some(county.state_id()),
                &case_states,
            )
        })
        .collect();

    let days = snapshot.days();
    let first = days.first().unwrap_or_default();

    Ok(SnapshotReport {
        version: SCHEMA_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        last_updated: snapshot.last_updated().map(str::to_string),
        days: DayRange {
            first,
            last: days.last().unwrap_or(first),
            count: days.len(),
        },
        nation: summarize(NATION_ID, snapshot.nation().area(), &case_states),
        states: ZippedObjectArray::zip(&state_rows, None)?,
        counties: ZippedObjectArray::zip(&county_rows, None)?,
        warning_count: ingest.warning_count(),
        filtered_count: ingest.filtered,
    })
}

/// (id, label) of every case state; unnamed ids fall back to the number
fn case_state_labels(snapshot: &Snapshot) -> Vec<(CaseStateId, String)> {
    let dimensions = snapshot.dimensions();
    dimensions
        .case_state_ids()
        .map(|id| {
            let label = dimensions
                .case_state_name(id)
                .map(str::to_string)
                .unwrap_or_else(|| id.to_string());
            (id, label)
        })
        .collect()
}

fn summarize(id: u32, area: &Area, case_states: &[(CaseStateId, String)]) -> AreaSummary {
    AreaSummary {
        id,
        name: area.display_name().to_string(),
        population: area.population(),
        area: area.geographic_area(),
        totals: case_states
            .iter()
            .map(|(cs, label)| (label.clone(), area.total(*cs)))
            .collect(),
        rates: case_states
            .iter()
            .map(|(cs, label)| (label.clone(), area.rate(*cs)))
            .collect(),
    }
}

fn area_row(
    id: u32,
    area: &Area,
    state_id: Option<u32>,
    case_states: &[(CaseStateId, String)],
) -> Row {
    let mut row = Row::new();
    row.insert("id".to_string(), json!(id));
    row.insert("name".to_string(), json!(area.display_name()));
    if let Some(state_id) = state_id {
        row.insert("stateId".to_string(), json!(state_id));
    }
    row.insert("population".to_string(), json!(area.population()));
    row.insert("area".to_string(), json!(area.geographic_area()));

    for (cs, label) in case_states {
        row.insert(label.clone(), json!(area.total(*cs)));
        row.insert(format!("{}Rate", label), rate_value(area.rate(*cs)));
    }
    row
}

/// Rates are finite by construction; anything else is written as null
fn rate_value(rate: f64) -> Value {
    serde_json::Number::from_f64(rate)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Render a plain-text summary of the snapshot
///
/// **Public** - used by the CLI `--summary` flag
///
/// # Arguments
/// * `snapshot` - Frozen aggregation result
/// * `ingest` - Report returned alongside the snapshot
/// * `top_states` - How many states to list, ranked by the first case state
pub fn render_summary(snapshot: &Snapshot, ingest: &IngestReport, top_states: usize) -> String {
    let case_states = case_state_labels(snapshot);
    let nation = snapshot.nation().area();
    let mut lines = Vec::new();

    let days = snapshot.days();
    let span = match (days.first(), days.last()) {
        (Some(first), Some(last)) => format!("{} .. {} ({} days)", first, last, days.len()),
        _ => "no days".to_string(),
    };

    lines.push(format!("  {} | population {}", nation.display_name(), nation.population()));
    lines.push(format!("  Days: {}", span));
    if let Some(updated) = snapshot.last_updated() {
        lines.push(format!("  Data as of: {}", updated));
    }
    for (cs, label) in &case_states {
        lines.push(format!(
            "  {:<12} {:>10}   {:>10.1} per 100k",
            label,
            nation.total(*cs),
            nation.rate(*cs)
        ));
    }

    if let Some((rank_by, rank_label)) = case_states.first() {
        let mut states: Vec<_> = snapshot.states().iter().collect();
        states.sort_by(|a, b| b.area().total(*rank_by).cmp(&a.area().total(*rank_by)));

        lines.push(String::new());
        lines.push(format!("  Top states by {}:", rank_label));
        for state in states.iter().take(top_states) {
            let area = state.area();
            lines.push(format!(
                "  {:<32} {:>10} {:>10.1}",
                area.display_name(),
                area.total(*rank_by),
                area.rate(*rank_by)
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!("  Ingest: {}", ingest.summary()));

    lines.join("\n")
}
