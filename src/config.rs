//! Study configuration.
//!
//! Stored as a JSON object on disk; every field is optional:
//! ```json
//! {
//!   "columns": { "name": "stop_name", "longitude": "lng", "latitude": "lat" },
//!   "source_datum": "GCJ02",
//!   "output_precision": 4,
//!   "gini_basis": "served_only",
//!   "buffers": { "bus_stop_m": 500.0, "other_transit_m": 1000.0 },
//!   "output_dir": "output"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::coordinate::SourceDatum;
use crate::equity::GiniBasis;
use crate::error::Result;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "TRANSIT_EQUITY_CONFIG";

/// Header names of the point batch columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointColumns {
    pub name: String,
    pub longitude: String,
    pub latitude: String,
}

impl Default for PointColumns {
    fn default() -> Self {
        Self {
            name: "name".into(),
            longitude: "longitude".into(),
            latitude: "latitude".into(),
        }
    }
}

/// Buffer distances, in meters, around transit stops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferDistances {
    pub bus_stop_m: f64,
    pub other_transit_m: f64,
}

impl Default for BufferDistances {
    fn default() -> Self {
        Self {
            bus_stop_m: 500.0,
            other_transit_m: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub columns: PointColumns,
    pub source_datum: SourceDatum,
    pub output_precision: u32,
    pub gini_basis: GiniBasis,
    pub buffers: BufferDistances,
    pub output_dir: PathBuf,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            columns: PointColumns::default(),
            source_datum: SourceDatum::default(),
            output_precision: 4,
            gini_basis: GiniBasis::default(),
            buffers: BufferDistances::default(),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl StudyConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&content)?;
        debug!(path = %path.as_ref().display(), "Loaded study config");
        Ok(config)
    }

    /// Loads from `path`, falling back to [`CONFIG_ENV`], then to defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => match std::env::var(CONFIG_ENV) {
                Ok(p) if !p.is_empty() => Self::load(p),
                _ => Ok(Self::default()),
            },
        }
    }
}
