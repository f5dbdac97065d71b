//! Discrete Gini coefficient over service-level groups.
//!
//! Rows are ordered along the Lorenz curve by ascending advantage ratio and
//! the area under the curve is integrated with the trapezoid (Brown)
//! formula on raw magnitudes:
//!
//! ```text
//! G = 1 - Σ (W[i-1] + W[i]) * P[i] / (ΣP * ΣW)
//! ```
//!
//! where `W` is the running sum of weighted population and `P[i]` the
//! population of row `i`.

use std::cmp::Ordering;

use super::types::{GiniDetail, SummaryRow};
use super::utility::ratio;

/// Lorenz ordering: advantage ratio, then service level, then id.
fn lorenz_order(a: &SummaryRow, b: &SummaryRow) -> Ordering {
    a.advantage_ratio
        .total_cmp(&b.advantage_ratio)
        .then(a.service_level.cmp(&b.service_level))
        .then(a.id.cmp(&b.id))
}

/// Computes the Gini coefficient of `rows`.
///
/// The coefficient is 0 when the rows carry no population or no weighted
/// population; the detail is still filled in.
pub fn gini_coefficient(rows: &[SummaryRow]) -> (f64, GiniDetail) {
    let mut sorted_rows = rows.to_vec();
    sorted_rows.sort_by(lorenz_order);

    let total_population: f64 = sorted_rows.iter().map(|r| r.population).sum();
    let total_weighted: f64 = sorted_rows.iter().map(|r| r.weighted_population).sum();
    let pw_product = total_population * total_weighted;

    let mut contributions = Vec::with_capacity(sorted_rows.len());
    let mut cumulative_population_share = vec![0.0];
    let mut cumulative_weighted_share = vec![0.0];

    let mut cumulative_sum = 0.0;
    let mut running_population = 0.0;
    let mut running_weighted = 0.0;

    for row in &sorted_rows {
        let previous_weighted = running_weighted;
        running_weighted += row.weighted_population;
        running_population += row.population;

        let contribution = (previous_weighted + running_weighted) * row.population;
        cumulative_sum += contribution;
        contributions.push(contribution);

        cumulative_population_share.push(ratio(running_population, total_population));
        cumulative_weighted_share.push(ratio(running_weighted, total_weighted));
    }

    let coefficient = if pw_product > 0.0 {
        1.0 - cumulative_sum / pw_product
    } else {
        0.0
    };

    let detail = GiniDetail {
        sorted_rows,
        cumulative_population_share,
        cumulative_weighted_share,
        contributions,
        cumulative_sum,
        pw_product,
    };

    (coefficient, detail)
}
