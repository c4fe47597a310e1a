pub mod basemap;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Sampled years in the dataset, chronological. Not evenly spaced.
pub const YEARS: [Year; 8] = [
    Year(1970),
    Year(1980),
    Year(1990),
    Year(2000),
    Year(2010),
    Year(2015),
    Year(2020),
    Year(2022),
];

/// A year on the dataset's sampling axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Year(pub u16);

impl Year {
    /// Most recent sampled year, the default selection
    pub fn latest() -> Self {
        YEARS[YEARS.len() - 1]
    }

    /// Position of this year in `YEARS`, if it is a sampled year
    pub fn index(self) -> Option<usize> {
        YEARS.iter().position(|&y| y == self)
    }

    /// Next sampled year, wrapping to the first
    pub fn next(self) -> Self {
        match self.index() {
            Some(i) => YEARS[(i + 1) % YEARS.len()],
            None => Self::latest(),
        }
    }

    /// Previous sampled year, wrapping to the last
    pub fn prev(self) -> Self {
        match self.index() {
            Some(0) | None => Self::latest(),
            Some(i) => YEARS[i - 1],
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Year {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Year)
    }
}

/// One country's population time series.
///
/// A year maps to `None` when the source has no value for it. That is kept
/// distinct from `Some(0)` here; the aggregation and display layers decide
/// how to treat the two.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PopulationRecord {
    pub country: String,
    pub population: BTreeMap<Year, Option<u64>>,
}

impl PopulationRecord {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            population: BTreeMap::new(),
        }
    }

    /// Builder-style setter, mostly for tests and fixtures
    pub fn with(mut self, year: u16, value: u64) -> Self {
        self.population.insert(Year(year), Some(value));
        self
    }

    /// Population for a year, `None` when absent or never sampled
    pub fn get(&self, year: Year) -> Option<u64> {
        self.population.get(&year).copied().flatten()
    }
}
