use super::types::{AnalysisUnit, Stats};
use super::utility::{ratio, round_to};

const PRECISION: u32 = 4;

/// Computes coverage statistics over `units`.
///
/// Mode totals only count served units, and the mode ratios are taken
/// against the summed service levels of those units rather than the summed
/// mode counts. Every division is guarded, so this never fails.
pub fn basic_stats(units: &[AnalysisUnit]) -> Stats {
    let mut total_population = 0.0;
    let mut valid_population = 0.0;
    let mut service_level_total = 0u64;
    let mut bus_total = 0u64;
    let mut rail_total = 0u64;
    let mut tram_total = 0u64;

    for unit in units {
        total_population += unit.population;

        if !unit.is_served() {
            continue;
        }

        valid_population += unit.population;
        service_level_total += u64::from(unit.service_level);

        if unit.bus_count != 0 {
            bus_total += u64::from(unit.bus_count);
        }
        if unit.rail_count != 0 {
            rail_total += u64::from(unit.rail_count);
        }
        if unit.tram_count != 0 {
            tram_total += u64::from(unit.tram_count);
        }
    }

    let levels = service_level_total as f64;

    Stats {
        total_population: round_to(total_population, PRECISION),
        valid_population: round_to(valid_population, PRECISION),
        population_ratio: round_to(ratio(valid_population, total_population), PRECISION),
        service_level_total,
        bus_total,
        rail_total,
        tram_total,
        bus_ratio: round_to(ratio(bus_total as f64, levels), PRECISION),
        rail_ratio: round_to(ratio(rail_total as f64, levels), PRECISION),
        tram_ratio: round_to(ratio(tram_total as f64, levels), PRECISION),
    }
}
