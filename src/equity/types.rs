//! Data types used by the equity pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One spatial analysis unit, e.g. a population grid cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisUnit {
    #[serde(default, alias = "pointid")]
    pub unit_id: String,
    pub population: f64,
    #[serde(alias = "bus")]
    pub bus_count: u32,
    #[serde(alias = "railway")]
    pub rail_count: u32,
    #[serde(alias = "tram")]
    pub tram_count: u32,
    /// Composite reachability score; 0 means not served.
    #[serde(alias = "gather")]
    pub service_level: u32,
}

impl AnalysisUnit {
    pub fn new(unit_id: &str, population: f64, service_level: u32) -> Self {
        Self {
            unit_id: unit_id.to_string(),
            population,
            service_level,
            ..Default::default()
        }
    }

    pub fn with_modes(mut self, bus: u32, rail: u32, tram: u32) -> Self {
        self.bus_count = bus;
        self.rail_count = rail;
        self.tram_count = tram;
        self
    }

    pub fn is_served(&self) -> bool {
        self.service_level > 0
    }
}

/// Descriptive coverage statistics, rounded to 4 decimal places.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub total_population: f64,
    pub valid_population: f64,
    pub population_ratio: f64,
    pub service_level_total: u64,
    pub bus_total: u64,
    pub rail_total: u64,
    pub tram_total: u64,
    pub bus_ratio: f64,
    pub rail_ratio: f64,
    pub tram_ratio: f64,
}

/// Population aggregated at one service level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ServiceLevelGroup {
    pub service_level: u32,
    pub total_population: f64,
}

/// One row of the summary table, one per service level group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryRow {
    pub id: usize,
    pub service_level: u32,
    pub population: f64,
    pub weighted_population: f64,
    pub population_share: f64,
    pub weighted_share: f64,
    pub advantage_ratio: f64,
}

/// Intermediate values of the Gini computation, kept for Lorenz-curve export.
///
/// The cumulative share sequences have one more entry than `sorted_rows`
/// and start at 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GiniDetail {
    pub sorted_rows: Vec<SummaryRow>,
    pub cumulative_population_share: Vec<f64>,
    pub cumulative_weighted_share: Vec<f64>,
    pub contributions: Vec<f64>,
    pub cumulative_sum: f64,
    pub pw_product: f64,
}

/// Which population the Gini coefficient is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GiniBasis {
    /// Only units with a positive service level.
    #[default]
    ServedOnly,
    /// All units; unserved population forms a level-0 group with no weight.
    WholePopulation,
}

impl FromStr for GiniBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "served" | "served_only" => Ok(GiniBasis::ServedOnly),
            "whole" | "whole_population" => Ok(GiniBasis::WholePopulation),
            other => Err(format!("unknown gini basis '{other}'")),
        }
    }
}

impl fmt::Display for GiniBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GiniBasis::ServedOnly => f.write_str("served_only"),
            GiniBasis::WholePopulation => f.write_str("whole_population"),
        }
    }
}

/// Complete equity report over a set of analysis units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityReport {
    pub stats: Stats,
    pub summary: Vec<SummaryRow>,
    pub gini: GiniDetail,
    pub coefficient: f64,
}
