//! Data types used by the coordinate correction pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StudyError;

/// A longitude/latitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Datums that can be corrected to WGS84.
///
/// Deserializes through [`FromStr`], so config files accept the same
/// spellings as the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum SourceDatum {
    /// The obfuscated datum published by Chinese map vendors.
    #[default]
    #[serde(rename = "GCJ02")]
    Gcj02,
}

impl FromStr for SourceDatum {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GCJ02" | "GCJ-02" => Ok(SourceDatum::Gcj02),
            _ => Err(StudyError::UnsupportedDatum(s.to_string())),
        }
    }
}

impl TryFrom<String> for SourceDatum {
    type Error = StudyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for SourceDatum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDatum::Gcj02 => f.write_str("GCJ02"),
        }
    }
}

/// A named point as read from a batch file. Coordinates stay as raw text
/// until conversion so that unparseable cells can be isolated per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub name: String,
    pub longitude: String,
    pub latitude: String,
}

impl PointRecord {
    pub fn new(name: &str, longitude: &str, latitude: &str) -> Self {
        Self {
            name: name.to_string(),
            longitude: longitude.to_string(),
            latitude: latitude.to_string(),
        }
    }
}

/// A batch row after conversion. `None` in the corrected fields marks the
/// row as unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateBatchRow {
    pub name: String,
    pub longitude: String,
    pub latitude: String,
    pub longitude_corrected: Option<f64>,
    pub latitude_corrected: Option<f64>,
}

impl CoordinateBatchRow {
    pub fn is_available(&self) -> bool {
        self.longitude_corrected.is_some() && self.latitude_corrected.is_some()
    }
}

/// Result of a batch conversion: every input row, in input order, plus the
/// number that converted successfully.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub rows: Vec<CoordinateBatchRow>,
    pub converted: usize,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.converted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datum_parse_accepts_gcj02_spellings() {
        assert_eq!("GCJ02".parse::<SourceDatum>().unwrap(), SourceDatum::Gcj02);
        assert_eq!("gcj02".parse::<SourceDatum>().unwrap(), SourceDatum::Gcj02);
        assert_eq!(" GCJ-02 ".parse::<SourceDatum>().unwrap(), SourceDatum::Gcj02);
    }

    #[test]
    fn test_datum_parse_rejects_other_datums() {
        let err = "BD09".parse::<SourceDatum>().unwrap_err();
        assert!(matches!(err, StudyError::UnsupportedDatum(ref d) if d == "BD09"));
    }

    #[test]
    fn test_datum_deserializes_like_parse() {
        for text in [r#""GCJ02""#, r#""gcj02""#, r#""GCJ-02""#] {
            let datum: SourceDatum = serde_json::from_str(text).unwrap();
            assert_eq!(datum, SourceDatum::Gcj02);
        }
        assert!(serde_json::from_str::<SourceDatum>(r#""BD09""#).is_err());
        assert_eq!(serde_json::to_string(&SourceDatum::Gcj02).unwrap(), r#""GCJ02""#);
    }

    #[test]
    fn test_datum_display_round_trips() {
        let datum = SourceDatum::Gcj02;
        assert_eq!(datum.to_string().parse::<SourceDatum>().unwrap(), datum);
    }

    #[test]
    fn test_outcome_counts() {
        let outcome = BatchOutcome {
            rows: vec![
                CoordinateBatchRow {
                    name: "a".into(),
                    longitude: "1".into(),
                    latitude: "2".into(),
                    longitude_corrected: Some(1.0),
                    latitude_corrected: Some(2.0),
                },
                CoordinateBatchRow {
                    name: "b".into(),
                    longitude: "x".into(),
                    latitude: "2".into(),
                    longitude_corrected: None,
                    latitude_corrected: None,
                },
            ],
            converted: 1,
        };

        assert_eq!(outcome.total(), 2);
        assert_eq!(outcome.failed(), 1);
        assert!(outcome.rows[0].is_available());
        assert!(!outcome.rows[1].is_available());
    }
}
