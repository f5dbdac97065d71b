use std::collections::HashMap;

use super::types::{AnalysisUnit, GiniBasis, ServiceLevelGroup, SummaryRow};
use super::utility::ratio;

/// Sums population per service level, in the order levels are first seen.
fn group_by_level(units: &[AnalysisUnit], include_unserved: bool) -> Vec<ServiceLevelGroup> {
    let mut groups: Vec<ServiceLevelGroup> = Vec::new();
    let mut index: HashMap<u32, usize> = HashMap::new();

    for unit in units {
        if !include_unserved && !unit.is_served() {
            continue;
        }

        match index.get(&unit.service_level) {
            Some(&i) => groups[i].total_population += unit.population,
            None => {
                index.insert(unit.service_level, groups.len());
                groups.push(ServiceLevelGroup {
                    service_level: unit.service_level,
                    total_population: unit.population,
                });
            }
        }
    }

    groups
}

/// Groups served units by service level.
pub fn service_level_groups(units: &[AnalysisUnit]) -> Vec<ServiceLevelGroup> {
    group_by_level(units, false)
}

fn summarize(groups: &[ServiceLevelGroup]) -> Vec<SummaryRow> {
    let total_population: f64 = groups.iter().map(|g| g.total_population).sum();
    let total_weighted: f64 = groups
        .iter()
        .map(|g| g.total_population * f64::from(g.service_level))
        .sum();

    groups
        .iter()
        .enumerate()
        .map(|(i, group)| {
            let weighted_population = group.total_population * f64::from(group.service_level);
            let population_share = ratio(group.total_population, total_population);
            let weighted_share = ratio(weighted_population, total_weighted);

            SummaryRow {
                id: i + 1,
                service_level: group.service_level,
                population: group.total_population,
                weighted_population,
                population_share,
                weighted_share,
                advantage_ratio: ratio(weighted_share, population_share),
            }
        })
        .collect()
}

/// Builds one summary row per distinct positive service level.
///
/// Ids run from 1 in first-encounter order, so identical input order always
/// yields identical ids.
pub fn build_summary(units: &[AnalysisUnit]) -> Vec<SummaryRow> {
    summarize(&service_level_groups(units))
}

/// Builds the rows the Gini coefficient is computed over for `basis`.
///
/// For [`GiniBasis::WholePopulation`] unserved units form a level-0 group,
/// which carries population but no weighted population.
pub fn lorenz_rows(units: &[AnalysisUnit], basis: GiniBasis) -> Vec<SummaryRow> {
    match basis {
        GiniBasis::ServedOnly => build_summary(units),
        GiniBasis::WholePopulation => summarize(&group_by_level(units, true)),
    }
}
