//! Species catalog: named growth datasets with their growth rates.
//!
//! The catalog is the front end's bookkeeping. The numerical core never reads
//! or mutates it; callers pull inputs out of it and merge fit results back in.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{FitDataset, FitOptions};
use crate::error::ModelError;
use crate::fit::ExponentialFitter;
use crate::math::hourly_times_for;

/// One species entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub name: String,
    /// Growth rate `k_b` used for biofilm modelling (1/hour).
    pub growth_rate: f64,
    /// Observed planktonic growth.
    pub dataset: FitDataset,
}

/// Insertion-ordered species catalog.
#[derive(Debug, Clone, Default)]
pub struct SpeciesCatalog {
    records: Vec<SpeciesRecord>,
}

impl SpeciesCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog seeded with the built-in laboratory measurements.
    pub fn builtin() -> Self {
        let hours: Vec<f64> = (0..8).map(|h| h as f64).collect();
        let builtin = [
            (
                "P. aeruginosa",
                0.957,
                vec![0.002, 0.019, 0.024, 0.068, 0.085, 0.355, 0.979, 1.496],
            ),
            (
                "L. plantarum",
                0.612,
                vec![0.001, 0.015, 0.02, 0.05, 0.07, 0.15, 0.6, 0.95],
            ),
            (
                "S. aereus",
                0.386,
                vec![0.002, 0.007, 0.015, 0.025, 0.056, 0.09, 0.14, 0.345],
            ),
        ];

        let records = builtin
            .into_iter()
            .filter_map(|(name, growth_rate, densities)| {
                FitDataset::new(hours.clone(), densities)
                    .ok()
                    .map(|dataset| SpeciesRecord {
                        name: name.to_string(),
                        growth_rate,
                        dataset,
                    })
            })
            .collect();

        Self { records }
    }

    pub fn get(&self, name: &str) -> Option<&SpeciesRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Lookup that reports unknown names as an input error.
    pub fn require(&self, name: &str) -> Result<&SpeciesRecord, ModelError> {
        self.get(name).ok_or_else(|| {
            ModelError::invalid(
                "species",
                format!("unknown species '{name}' (known: {})", self.names().join(", ")),
            )
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn records(&self) -> &[SpeciesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert a record, replacing any existing entry with the same name in place.
    pub fn insert(&mut self, record: SpeciesRecord) {
        match self.records.iter_mut().find(|r| r.name == record.name) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Register a new species from hand-entered measurements.
    ///
    /// `data` holds one density per hour from `start` to `end` inclusive. The
    /// growth rate is fitted before anything is stored, so a failed parse or
    /// fit leaves the catalog unchanged.
    pub fn add_species(
        &mut self,
        name: &str,
        start: i64,
        end: i64,
        data: &str,
        options: &FitOptions,
    ) -> Result<&SpeciesRecord, ModelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModelError::invalid("name", "please enter a bacteria name"));
        }

        let densities = parse_densities(data)?;
        let times = hourly_times_for(start, end, densities.len())?;
        let dataset = FitDataset::new(times, densities)?;
        let growth_rate = ExponentialFitter::from_dataset(dataset.clone())
            .with_options(options.clone())
            .fit()?;

        info!(species = name, growth_rate, n = dataset.len(), "species added");
        self.insert(SpeciesRecord {
            name: name.to_string(),
            growth_rate,
            dataset,
        });
        self.require(name)
    }
}

/// Parse hand-entered densities.
///
/// Values may be separated by whitespace (including newlines), commas, or both.
pub fn parse_densities(text: &str) -> Result<Vec<f64>, ModelError> {
    let mut out = Vec::new();
    for token in text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
    {
        let value: f64 = token
            .parse()
            .map_err(|_| ModelError::invalid("data", format!("'{token}' is not a number")))?;
        if !value.is_finite() {
            return Err(ModelError::invalid("data", format!("'{token}' is not a finite number")));
        }
        out.push(value);
    }

    if out.is_empty() {
        return Err(ModelError::InsufficientData {
            found: 0,
            required: crate::domain::MIN_FIT_POINTS,
        });
    }
    Ok(out)
}
