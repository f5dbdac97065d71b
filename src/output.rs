//! Output formatting and persistence for batch results and equity reports.
//!
//! Supports pretty-printing, JSON serialization, and CSV export.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::coordinate::CoordinateBatchRow;
use crate::equity::utility::round_to;
use crate::equity::{EquityReport, GiniBasis};

pub const SUMMARY_FILE: &str = "summary.csv";
pub const LORENZ_FILE: &str = "lorenz.csv";
pub const REPORT_FILE: &str = "report.json";

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes converted batch rows to a CSV file, replacing any existing file.
///
/// Unavailable corrected coordinates are written as empty cells.
pub fn write_batch(path: impl AsRef<Path>, rows: &[CoordinateBatchRow]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = WriterBuilder::new().from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = rows.len(), "Wrote coordinate batch");
    Ok(())
}

#[derive(Serialize)]
struct SummaryRecord {
    id: usize,
    service_level: u32,
    population: f64,
    weighted_population: f64,
    population_share: f64,
    weighted_share: f64,
    advantage_ratio: f64,
}

#[derive(Serialize)]
struct LorenzRecord {
    rank: usize,
    id: usize,
    service_level: u32,
    population: f64,
    weighted_population: f64,
    advantage_ratio: f64,
    cumulative_population_share: f64,
    cumulative_weighted_share: f64,
    contribution: f64,
}

/// JSON envelope written as `report.json`.
#[derive(Serialize)]
pub struct ReportFile<'a> {
    pub generated_at: DateTime<Utc>,
    pub basis: GiniBasis,
    pub report: &'a EquityReport,
}

/// Paths written by [`write_report`].
#[derive(Debug)]
pub struct ReportPaths {
    pub summary: PathBuf,
    pub lorenz: PathBuf,
    pub report: PathBuf,
}

/// Writes the summary table, Lorenz curve table and full JSON report into
/// `dir`. Table values are rounded to `precision` decimal places; the JSON
/// keeps full precision.
pub fn write_report(
    dir: impl AsRef<Path>,
    report: &EquityReport,
    basis: GiniBasis,
    precision: u32,
) -> Result<ReportPaths> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let paths = ReportPaths {
        summary: dir.join(SUMMARY_FILE),
        lorenz: dir.join(LORENZ_FILE),
        report: dir.join(REPORT_FILE),
    };
    let round = |v: f64| round_to(v, precision);

    let mut writer = WriterBuilder::new().from_path(&paths.summary)?;
    for row in &report.summary {
        writer.serialize(SummaryRecord {
            id: row.id,
            service_level: row.service_level,
            population: round(row.population),
            weighted_population: round(row.weighted_population),
            population_share: round(row.population_share),
            weighted_share: round(row.weighted_share),
            advantage_ratio: round(row.advantage_ratio),
        })?;
    }
    writer.flush()?;

    let gini = &report.gini;
    let mut writer = WriterBuilder::new().from_path(&paths.lorenz)?;
    for (i, row) in gini.sorted_rows.iter().enumerate() {
        writer.serialize(LorenzRecord {
            rank: i + 1,
            id: row.id,
            service_level: row.service_level,
            population: round(row.population),
            weighted_population: round(row.weighted_population),
            advantage_ratio: round(row.advantage_ratio),
            cumulative_population_share: round(gini.cumulative_population_share[i + 1]),
            cumulative_weighted_share: round(gini.cumulative_weighted_share[i + 1]),
            contribution: round(gini.contributions[i]),
        })?;
    }
    writer.flush()?;

    let envelope = ReportFile {
        generated_at: Utc::now(),
        basis,
        report,
    };
    let file = File::create(&paths.report)?;
    serde_json::to_writer_pretty(file, &envelope)?;

    info!(dir = %dir.display(), "Equity report written");
    Ok(paths)
}
