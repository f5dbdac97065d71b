//! CLI entry point for the transit equity tool.
//!
//! Provides subcommands for correcting GCJ-02 stop coordinates in bulk,
//! correcting a single point, and computing the service equity report.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use transit_equity::{
    config::StudyConfig,
    coordinate::{
        GeoPoint, SourceDatum, convert_batch, convert_batch_concurrent, convert_point, validate,
    },
    equity::{GiniBasis, report_with},
    input::{read_points, read_units},
    output::{print_json, print_pretty, write_batch, write_report},
};

#[derive(Parser)]
#[command(name = "transit_equity")]
#[command(about = "Transit accessibility equity toolkit", long_about = None)]
struct Cli {
    /// JSON study config (falls back to $TRANSIT_EQUITY_CONFIG, then defaults)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Correct a CSV of GCJ-02 points to WGS84
    Convert {
        /// CSV file with name, longitude and latitude columns
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output CSV (defaults to <INPUT stem>_wgs84.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Datum of the input coordinates
        #[arg(long)]
        source_crs: Option<String>,

        /// Longitude column name
        #[arg(long)]
        lng_col: Option<String>,

        /// Latitude column name
        #[arg(long)]
        lat_col: Option<String>,

        /// Name column name
        #[arg(long)]
        name_col: Option<String>,

        /// Worker tasks for large batches (1 = convert inline)
        #[arg(short, long, default_value_t = 1)]
        concurrency: usize,
    },
    /// Correct a single GCJ-02 point
    Point {
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Datum of the input coordinates
        #[arg(long)]
        source_crs: Option<String>,
    },
    /// Compute coverage statistics and the service Gini coefficient
    Gini {
        /// CSV of analysis units
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Directory for summary.csv, lorenz.csv and report.json
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Population the coefficient is computed over: served | whole
        #[arg(long)]
        basis: Option<GiniBasis>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/transit_equity.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("transit_equity.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = StudyConfig::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert {
            input,
            output,
            source_crs,
            lng_col,
            lat_col,
            name_col,
            concurrency,
        } => {
            let datum = resolve_datum(source_crs.as_deref(), &config)?;

            let mut columns = config.columns.clone();
            if let Some(c) = lng_col {
                columns.longitude = c;
            }
            if let Some(c) = lat_col {
                columns.latitude = c;
            }
            if let Some(c) = name_col {
                columns.name = c;
            }

            let output = output.unwrap_or_else(|| default_output_path(&input));
            let records = read_points(&input, &columns)?;

            info!(
                input = %input.display(),
                output = %output.display(),
                %datum,
                rows = records.len(),
                "Starting coordinate conversion"
            );

            let outcome = if concurrency > 1 {
                let chunk_size = records.len().div_ceil(concurrency);
                convert_batch_concurrent(records, datum, chunk_size).await?
            } else {
                convert_batch(&records, datum)
            };

            write_batch(&output, &outcome.rows)?;

            if outcome.failed() > 0 {
                warn!(failed = outcome.failed(), "Some rows could not be converted");
            }
            info!(
                converted = outcome.converted,
                total = outcome.total(),
                output = %output.display(),
                "Conversion complete"
            );
        }
        Commands::Point {
            lng,
            lat,
            source_crs,
        } => {
            let datum = resolve_datum(source_crs.as_deref(), &config)?;
            let corrected = convert_point(GeoPoint::new(lng, lat), datum);

            info!(
                longitude = corrected.longitude,
                latitude = corrected.latitude,
                valid = validate(&corrected),
                "Corrected point"
            );
        }
        Commands::Gini {
            input,
            output_dir,
            basis,
        } => {
            let basis = basis.unwrap_or(config.gini_basis);
            let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());

            gini(&input, &output_dir, basis, config.output_precision)?;
        }
    }

    Ok(())
}

/// Picks the datum from the CLI flag, falling back to the config.
fn resolve_datum(flag: Option<&str>, config: &StudyConfig) -> Result<SourceDatum> {
    match flag {
        Some(s) => Ok(s.parse::<SourceDatum>()?),
        None => Ok(config.source_datum),
    }
}

/// `stops.csv` becomes `stops_wgs84.csv` next to the input.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("points");
    input.with_file_name(format!("{stem}_wgs84.csv"))
}

/// Reads analysis units, builds the equity report and writes it to `output_dir`.
#[tracing::instrument(
    skip(input, output_dir),
    fields(input = %input.display(), output_dir = %output_dir.display())
)]
fn gini(input: &Path, output_dir: &Path, basis: GiniBasis, precision: u32) -> Result<()> {
    let units = read_units(input)?;
    let report = report_with(&units, basis);

    print_json(&report.stats)?;
    print_pretty(&report.summary);
    let paths = write_report(output_dir, &report, basis, precision)?;

    info!(
        coefficient = report.coefficient,
        groups = report.summary.len(),
        report = %paths.report.display(),
        "Gini analysis complete"
    );
    Ok(())
}
