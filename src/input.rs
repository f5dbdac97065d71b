//! Tabular readers for analysis units and point batches.
//!
//! Malformed equity rows are rejected here so the equity functions only
//! ever see valid units. Point coordinates are kept as text; the batch
//! converter decides per row whether they are usable.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::config::PointColumns;
use crate::coordinate::PointRecord;
use crate::equity::AnalysisUnit;
use crate::error::{Result, StudyError};

fn check_unit(unit: &AnalysisUnit) -> std::result::Result<(), String> {
    if !unit.population.is_finite() {
        return Err(format!("population {} is not finite", unit.population));
    }
    if unit.population < 0.0 {
        return Err(format!("population {} is negative", unit.population));
    }
    Ok(())
}

/// Reads analysis units from CSV data with a header row.
pub fn units_from_reader<R: Read>(reader: R) -> Result<Vec<AnalysisUnit>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut units = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let unit: AnalysisUnit =
            record
                .deserialize(Some(&headers))
                .map_err(|e| StudyError::InvalidUnit {
                    line,
                    reason: e.to_string(),
                })?;
        check_unit(&unit).map_err(|reason| StudyError::InvalidUnit { line, reason })?;

        units.push(unit);
    }

    Ok(units)
}

/// Reads analysis units from a CSV file.
pub fn read_units(path: impl AsRef<Path>) -> Result<Vec<AnalysisUnit>> {
    let file = std::fs::File::open(path.as_ref())?;
    let units = units_from_reader(file)?;
    debug!(path = %path.as_ref().display(), count = units.len(), "Read analysis units");
    Ok(units)
}

fn column_index(headers: &StringRecord, column: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| StudyError::MissingColumn(column.to_string()))
}

/// Reads named points from CSV data with a header row.
pub fn points_from_reader<R: Read>(reader: R, columns: &PointColumns) -> Result<Vec<PointRecord>> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::Headers)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let name = column_index(&headers, &columns.name)?;
    let longitude = column_index(&headers, &columns.longitude)?;
    let latitude = column_index(&headers, &columns.latitude)?;

    let mut points = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let cell = |i: usize| record.get(i).unwrap_or_default().to_string();

        points.push(PointRecord {
            name: cell(name),
            longitude: cell(longitude),
            latitude: cell(latitude),
        });
    }

    Ok(points)
}

/// Reads named points from a CSV file.
pub fn read_points(path: impl AsRef<Path>, columns: &PointColumns) -> Result<Vec<PointRecord>> {
    let file = std::fs::File::open(path.as_ref())?;
    let points = points_from_reader(file, columns)?;
    debug!(path = %path.as_ref().display(), count = points.len(), "Read point batch");
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNITS_CSV: &str = "\
fid,pointid,population,bus,railway,tram,gather
1,1001,500.0,2,1,0,3
2,1002,300.0,1,0,1,2
3,1003,200.0,0,0,0,0
";

    #[test]
    fn test_units_accept_source_column_names() {
        let units = units_from_reader(UNITS_CSV.as_bytes()).unwrap();

        assert_eq!(units.len(), 3);
        assert_eq!(units[0].unit_id, "1001");
        assert_eq!(units[0].population, 500.0);
        assert_eq!(units[0].bus_count, 2);
        assert_eq!(units[0].rail_count, 1);
        assert_eq!(units[1].tram_count, 1);
        assert_eq!(units[2].service_level, 0);
    }

    #[test]
    fn test_units_accept_canonical_column_names() {
        let data = "unit_id,population,bus_count,rail_count,tram_count,service_level\n\
                    a, 12.5 ,1,0,0,1\n";
        let units = units_from_reader(data.as_bytes()).unwrap();

        assert_eq!(units, vec![AnalysisUnit::new("a", 12.5, 1).with_modes(1, 0, 0)]);
    }

    #[test]
    fn test_negative_population_is_rejected() {
        let data = "population,bus,railway,tram,gather\n100,0,0,0,1\n-5,0,0,0,1\n";
        let err = units_from_reader(data.as_bytes()).unwrap_err();

        assert!(matches!(err, StudyError::InvalidUnit { line: 3, .. }), "{err}");
    }

    #[test]
    fn test_non_integer_count_is_rejected() {
        let data = "population,bus,railway,tram,gather\n100,x,0,0,1\n";
        let err = units_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, StudyError::InvalidUnit { line: 2, .. }));
    }

    #[test]
    fn test_nan_population_is_rejected() {
        let data = "population,bus,railway,tram,gather\nNaN,0,0,0,1\n";
        assert!(units_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_points_with_default_columns() {
        let data = "id,name,longitude,latitude\n1,Hankou,114.255,30.618\n2,Broken,,30.6\n";
        let points = points_from_reader(data.as_bytes(), &PointColumns::default()).unwrap();

        assert_eq!(
            points,
            vec![
                PointRecord::new("Hankou", "114.255", "30.618"),
                PointRecord::new("Broken", "", "30.6"),
            ]
        );
    }

    #[test]
    fn test_points_with_custom_columns() {
        let columns = PointColumns {
            name: "stop".into(),
            longitude: "lng".into(),
            latitude: "lat".into(),
        };
        let data = "lat,lng,stop\n30.6,114.3,Wuchang\n";
        let points = points_from_reader(data.as_bytes(), &columns).unwrap();

        assert_eq!(points, vec![PointRecord::new("Wuchang", "114.3", "30.6")]);
    }

    #[test]
    fn test_points_missing_column() {
        let data = "name,longitude\nA,114.0\n";
        let err = points_from_reader(data.as_bytes(), &PointColumns::default()).unwrap_err();

        assert!(matches!(err, StudyError::MissingColumn(ref c) if c == "latitude"));
    }
}
