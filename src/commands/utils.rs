use crate::output::read_report;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Validate a report JSON file
///
/// Reads the report and checks that its day range is consistent.
pub fn validate_report_file(file_path: &Path) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(file_path)
        .with_context(|| format!("Failed to read report {}", file_path.display()))?;

    let span = (report.days.last - report.days.first).num_days() + 1;
    if usize::try_from(span).ok() != Some(report.days.count) {
        bail!(
            "Day range {} .. {} spans {} days but the report claims {}",
            report.days.first,
            report.days.last,
            span,
            report.days.count
        );
    }

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!(
        "  Days: {} .. {} ({})",
        report.days.first, report.days.last, report.days.count
    );
    println!("  States: {}", report.states.len());
    println!("  Counties: {}", report.counties.len());
    println!("  Skipped rows: {}", report.warning_count);

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Outbreak Atlas Snapshot Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  generatedAt: string      - RFC 3339 timestamp");
        println!("  lastUpdated: string?     - Upstream data-as-of label");
        println!("  days: object             - Day list range");
        println!("    first: string          - First day (YYYY-MM-DD)");
        println!("    last: string           - Last day (YYYY-MM-DD)");
        println!("    count: number          - Number of days");
        println!("  nation: object           - Nation summary");
        println!("    id, name, population, area");
        println!("    totals: object         - Total per case state name");
        println!("    rates: object          - Per 100k inhabitants per case state name");
        println!("  states: zipped           - {{fields, values}} with id, name, population,");
        println!("                             area, <caseState>, <caseState>Rate");
        println!("  counties: zipped         - Same as states plus stateId");
        println!("  warningCount: number     - Input rows skipped");
        println!("  filteredCount: number    - Events with a non-positive count");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Outbreak Atlas v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Aggregates county case and death events into nation, state and county totals,");
    println!("rates and cumulative day series.");
}
