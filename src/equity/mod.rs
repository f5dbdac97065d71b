//! Transit service equity metrics.
//!
//! This module turns analysis units (population plus per-mode service
//! counts) into coverage statistics, a per-service-level summary table, and
//! a Gini coefficient describing how service is spread across population.

pub mod gini;
pub mod report;
pub mod stats;
pub mod summary;
pub mod types;
pub mod utility;

pub use gini::gini_coefficient;
pub use report::{report, report_with};
pub use stats::basic_stats;
pub use summary::{build_summary, lorenz_rows, service_level_groups};
pub use types::{
    AnalysisUnit, EquityReport, GiniBasis, GiniDetail, ServiceLevelGroup, Stats, SummaryRow,
};
