use crate::foundation::error::{SolarError, SolarResult};

/// One yearly observation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct YearRecord {
    /// Calendar year.
    pub year: i32,
    /// Non-negative radiation measure for that year.
    pub value: f64,
}

impl YearRecord {
    /// Convenience constructor.
    pub fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

/// Validated, immutable sequence of yearly records.
///
/// Invariants: at least two records, strictly increasing years, finite non-negative values.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    records: Vec<YearRecord>,
    min: f64,
    max: f64,
}

impl Dataset {
    /// Validate `records` and build a dataset.
    pub fn new(records: Vec<YearRecord>) -> SolarResult<Self> {
        if records.len() < 2 {
            return Err(SolarError::data(format!(
                "dataset needs at least 2 records, got {}",
                records.len()
            )));
        }
        if let Some(w) = records.windows(2).find(|w| w[0].year >= w[1].year) {
            return Err(SolarError::data(format!(
                "dataset years must be strictly increasing ({} followed by {})",
                w[0].year, w[1].year
            )));
        }
        if let Some(r) = records
            .iter()
            .find(|r| !r.value.is_finite() || r.value < 0.0)
        {
            return Err(SolarError::data(format!(
                "year {} has invalid value {} (must be finite and >= 0)",
                r.year, r.value
            )));
        }

        let (min, max) = records
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                (lo.min(r.value), hi.max(r.value))
            });
        Ok(Self { records, min, max })
    }

    /// Build a dataset from `(year, value)` pairs, e.g. an embedded table.
    pub fn from_pairs(pairs: &[(i32, f64)]) -> SolarResult<Self> {
        Self::new(
            pairs
                .iter()
                .map(|&(year, value)| YearRecord { year, value })
                .collect(),
        )
    }

    /// Number of records (always >= 2).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `idx`, if any.
    pub fn get(&self, idx: usize) -> Option<&YearRecord> {
        self.records.get(idx)
    }

    /// Borrow all records in year order.
    pub fn records(&self) -> &[YearRecord] {
        &self.records
    }

    /// Index following `idx`, wrapping to 0 after the last record.
    pub fn next_index(&self, idx: usize) -> usize {
        (idx + 1) % self.records.len()
    }

    /// Observed `(min, max)` of the values.
    pub fn value_range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// First year in the dataset.
    pub fn first_year(&self) -> i32 {
        self.records[0].year
    }

    /// Last year in the dataset.
    pub fn last_year(&self) -> i32 {
        self.records[self.records.len() - 1].year
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/dataset.rs"]
mod tests;
