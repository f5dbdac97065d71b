use tracing::{debug, info, warn};

use super::gcj02::convert_point;
use super::types::{BatchOutcome, CoordinateBatchRow, GeoPoint, PointRecord, SourceDatum};
use crate::error::{Result, StudyError};

/// Parses a coordinate cell into a finite float.
fn parse_coordinate(row: usize, field: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| StudyError::MalformedRow {
        row,
        reason: format!("{field} {raw:?} is not a number"),
    })?;

    if !value.is_finite() {
        return Err(StudyError::MalformedRow {
            row,
            reason: format!("{field} {raw:?} is not finite"),
        });
    }

    Ok(value)
}

fn convert_record(row: usize, record: &PointRecord, datum: SourceDatum) -> Result<GeoPoint> {
    let longitude = parse_coordinate(row, "longitude", &record.longitude)?;
    let latitude = parse_coordinate(row, "latitude", &record.latitude)?;
    Ok(convert_point(GeoPoint::new(longitude, latitude), datum))
}

/// Converts `records`, numbering rows from `first_row` for log messages.
fn convert_rows(records: &[PointRecord], datum: SourceDatum, first_row: usize) -> BatchOutcome {
    let mut outcome = BatchOutcome {
        rows: Vec::with_capacity(records.len()),
        converted: 0,
    };

    for (offset, record) in records.iter().enumerate() {
        let row = first_row + offset;
        let corrected = match convert_record(row, record, datum) {
            Ok(point) => {
                outcome.converted += 1;
                Some(point)
            }
            Err(e) => {
                warn!(row, name = %record.name, error = %e, "Coordinate conversion failed");
                None
            }
        };

        outcome.rows.push(CoordinateBatchRow {
            name: record.name.clone(),
            longitude: record.longitude.clone(),
            latitude: record.latitude.clone(),
            longitude_corrected: corrected.map(|p| p.longitude),
            latitude_corrected: corrected.map(|p| p.latitude),
        });
    }

    outcome
}

/// Converts every row of a batch, isolating malformed rows.
///
/// Rows whose coordinates cannot be read as finite numbers are kept in place
/// with empty corrected fields; the rest of the batch is still converted.
pub fn convert_batch(records: &[PointRecord], datum: SourceDatum) -> BatchOutcome {
    let outcome = convert_rows(records, datum, 1);

    info!(
        %datum,
        converted = outcome.converted,
        total = outcome.total(),
        "Coordinate batch converted"
    );

    outcome
}

/// Converts a batch on blocking worker threads, `chunk_size` rows per task.
///
/// Chunks may finish in any order; results are reassembled in input order.
pub async fn convert_batch_concurrent(
    records: Vec<PointRecord>,
    datum: SourceDatum,
    chunk_size: usize,
) -> Result<BatchOutcome> {
    let chunk_size = chunk_size.max(1);
    let total = records.len();

    let mut tasks = Vec::new();
    let mut first_row = 1;

    for chunk in records.chunks(chunk_size) {
        let chunk = chunk.to_vec();
        let start = first_row;
        first_row += chunk.len();

        tasks.push(tokio::task::spawn_blocking(move || {
            convert_rows(&chunk, datum, start)
        }));
    }

    debug!(tasks = tasks.len(), chunk_size, total, "Spawned conversion tasks");

    let mut outcome = BatchOutcome {
        rows: Vec::with_capacity(total),
        converted: 0,
    };

    for task in tasks {
        let part = task.await?;
        outcome.converted += part.converted;
        outcome.rows.extend(part.rows);
    }

    info!(
        %datum,
        converted = outcome.converted,
        total = outcome.total(),
        "Coordinate batch converted"
    );

    Ok(outcome)
}
