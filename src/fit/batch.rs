//! Refit every species in a catalog.
//!
//! Each dataset is independent, so the fits run in parallel. Results come back
//! in catalog order and a failing species does not abort the others.

use rayon::prelude::*;

use crate::data::SpeciesCatalog;
use crate::domain::{FitOptions, GrowthFit};
use crate::error::ModelError;
use crate::fit::ExponentialFitter;

/// Stored versus freshly fitted growth rate for one species.
#[derive(Debug, Clone)]
pub struct SpeciesRefit {
    pub name: String,
    pub stored_rate: f64,
    pub fit: Result<GrowthFit, ModelError>,
}

pub fn refit_catalog(catalog: &SpeciesCatalog, options: &FitOptions) -> Vec<SpeciesRefit> {
    catalog
        .records()
        .par_iter()
        .map(|record| SpeciesRefit {
            name: record.name.clone(),
            stored_rate: record.growth_rate,
            fit: ExponentialFitter::from_dataset(record.dataset.clone())
                .with_options(options.clone())
                .fit_report(),
        })
        .collect()
}
