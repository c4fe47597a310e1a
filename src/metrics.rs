//! Derived figures over the loaded record set: world totals, top-N ranking,
//! growth rates and chart series. Everything here is pure.

use std::collections::BTreeMap;

use crate::data::{PopulationRecord, Year};

/// Length of the ranking shown in the bar chart
pub const TOP_N: usize = 10;

/// Summed population across all records, per year
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldAggregate {
    pub total_by_year: BTreeMap<Year, u64>,
}

impl WorldAggregate {
    pub fn get(&self, year: Year) -> Option<u64> {
        self.total_by_year.get(&year).copied()
    }
}

/// Sum every record's value for each year. Absent values count as zero.
pub fn compute_world_totals(records: &[PopulationRecord], years: &[Year]) -> WorldAggregate {
    let total_by_year = years
        .iter()
        .map(|&year| {
            let total = records
                .iter()
                .map(|r| r.get(year).unwrap_or(0))
                .fold(0u64, u64::saturating_add);
            (year, total)
        })
        .collect();

    WorldAggregate { total_by_year }
}

/// Highest-population countries for a year, strictly positive values only.
/// Ties keep input order.
pub fn compute_top_n(records: &[PopulationRecord], year: Year, n: usize) -> Vec<(String, u64)> {
    let mut ranked: Vec<(String, u64)> = records
        .iter()
        .filter_map(|r| match r.get(year) {
            Some(v) if v > 0 => Some((r.country.clone(), v)),
            _ => None,
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// Percentage change from `previous` to `current`, rounded to two decimals.
/// A zero on either side counts as missing, as it does for display.
pub fn compute_growth_rate(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let (current, previous) = (current?, previous?);
    if current == 0.0 || previous == 0.0 {
        return None;
    }
    let rate = (current - previous) / previous * 100.0;
    Some((rate * 100.0).round() / 100.0)
}

/// The sampled year immediately before `year`
pub fn previous_year(year: Year, years: &[Year]) -> Option<Year> {
    let idx = years.iter().position(|&y| y == year)?;
    idx.checked_sub(1).map(|i| years[i])
}

/// True when at least one of `years` has a present, positive value
pub fn has_any_data(record: &PopulationRecord, years: &[Year]) -> bool {
    years.iter().any(|&y| record.get(y).is_some_and(|v| v > 0))
}

/// Growth of one country between `year` and the sampled year before it
pub fn country_growth(record: &PopulationRecord, year: Year, years: &[Year]) -> Option<f64> {
    let prev = previous_year(year, years)?;
    compute_growth_rate(
        record.get(year).map(|v| v as f64),
        record.get(prev).map(|v| v as f64),
    )
}

/// Growth of the world total between `year` and the sampled year before it
pub fn world_growth(world: &WorldAggregate, year: Year, years: &[Year]) -> Option<f64> {
    let prev = previous_year(year, years)?;
    compute_growth_rate(
        world.get(year).map(|v| v as f64),
        world.get(prev).map(|v| v as f64),
    )
}

/// Line chart series for one country, in canonical year order
pub fn country_trend(record: &PopulationRecord, years: &[Year]) -> Vec<(Year, u64)> {
    years.iter().map(|&y| (y, record.get(y).unwrap_or(0))).collect()
}

/// Line chart series for the world total, in canonical year order
pub fn world_trend(world: &WorldAggregate, years: &[Year]) -> Vec<(Year, u64)> {
    years.iter().map(|&y| (y, world.get(y).unwrap_or(0))).collect()
}
