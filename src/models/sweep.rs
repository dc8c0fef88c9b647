//! Antibiotic concentration sweeps.
//!
//! Solves one growth model per concentration (all other parameters fixed).
//! The solves are independent and run in parallel; rows keep input order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{GrowthParams, SolverOptions};
use crate::error::ModelError;
use crate::models::GrowthModel;

/// Summary of one solved concentration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub concentration: f64,
    pub final_density: f64,
    pub peak_density: f64,
}

/// Solve `base` at every concentration. The first failing solve aborts the sweep.
pub fn sweep_concentrations(
    base: &GrowthParams,
    concentrations: &[f64],
    options: &SolverOptions,
) -> Result<Vec<SweepRow>, ModelError> {
    if concentrations.is_empty() {
        return Err(ModelError::invalid("concentrations", "need at least one value"));
    }

    concentrations
        .par_iter()
        .map(|&concentration| {
            let params = GrowthParams {
                antibiotic_conc: concentration,
                ..*base
            };
            let traj = GrowthModel::with_options(params, options)?.trajectory();
            Ok(SweepRow {
                concentration,
                final_density: traj.final_density().unwrap_or(f64::NAN),
                peak_density: traj.peak_density().unwrap_or(f64::NAN),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_concentration_means_less_biofilm() {
        let base = GrowthParams {
            antibiotic_mic: 2.0,
            ..GrowthParams::untreated(0.957)
        };
        let rows = sweep_concentrations(&base, &[0.0, 0.5, 1.0, 4.0], &SolverOptions::default()).unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2].concentration, 1.0);
        for w in rows.windows(2) {
            assert!(w[1].final_density < w[0].final_density);
        }
        // Above the MIC the population only shrinks.
        assert!((rows[3].peak_density - base.initial_state).abs() < 1e-12);
    }

    #[test]
    fn invalid_concentration_fails_the_sweep() {
        let base = GrowthParams::untreated(0.957);
        let err = sweep_concentrations(&base, &[0.0, -1.0], &SolverOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InvalidParameter { field: "antibiotic concentration", .. }
        ));
    }

    #[test]
    fn empty_sweep_is_rejected() {
        let base = GrowthParams::untreated(0.957);
        assert!(sweep_concentrations(&base, &[], &SolverOptions::default()).is_err());
    }
}
