use tracing::{debug, info};

use super::gini::gini_coefficient;
use super::stats::basic_stats;
use super::summary::{build_summary, lorenz_rows};
use super::types::{AnalysisUnit, EquityReport, GiniBasis};

/// Builds the full equity report with the default [`GiniBasis`].
pub fn report(units: &[AnalysisUnit]) -> EquityReport {
    report_with(units, GiniBasis::default())
}

/// Builds the full equity report, computing the coefficient over `basis`.
///
/// The returned summary always covers served units only; `basis` decides
/// whether unserved population enters the Lorenz curve.
pub fn report_with(units: &[AnalysisUnit], basis: GiniBasis) -> EquityReport {
    let stats = basic_stats(units);
    let summary = build_summary(units);

    let rows = match basis {
        GiniBasis::ServedOnly => summary.clone(),
        GiniBasis::WholePopulation => lorenz_rows(units, basis),
    };
    debug!(%basis, lorenz_rows = rows.len(), "Computing gini coefficient");

    let (coefficient, gini) = gini_coefficient(&rows);

    info!(
        units = units.len(),
        groups = summary.len(),
        %basis,
        coefficient,
        "Equity report built"
    );

    EquityReport {
        stats,
        summary,
        gini,
        coefficient,
    }
}
