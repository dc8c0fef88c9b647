//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - passed between the numerical core and the front end as plain values
//! - exported to JSON/CSV
//! - reloaded later for plotting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// First hour of the biofilm simulation window.
pub const TIME_START: f64 = 0.0;
/// Last hour of the biofilm simulation window.
pub const TIME_END: f64 = 24.0;
/// Number of evaluation points (one per hour, both ends included).
pub const TIME_POINTS: usize = 25;

/// Default biofilm initial state (OD).
pub const DEFAULT_INITIAL_STATE: f64 = 0.002;
/// Default biofilm carrying capacity (OD).
pub const DEFAULT_MAX_CAPACITY: f64 = 1.75;

/// Minimum number of paired observations needed to fit a growth rate.
pub const MIN_FIT_POINTS: usize = 2;

/// Biological and pharmacological inputs of the biofilm growth model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthParams {
    /// Intrinsic growth constant `k_b` (1/hour).
    pub growth_rate: f64,
    /// Biofilm density at `t = 0` (OD).
    pub initial_state: f64,
    /// Carrying capacity `B_max` (OD).
    pub max_capacity: f64,
    /// Minimum inhibitory concentration (µg/ml). `0` disables the inhibition term.
    pub antibiotic_mic: f64,
    /// Applied antibiotic concentration (µg/ml).
    pub antibiotic_conc: f64,
}

impl GrowthParams {
    /// Parameters with the front end's default initial state and capacity and no antibiotic.
    pub fn untreated(growth_rate: f64) -> Self {
        Self {
            growth_rate,
            initial_state: DEFAULT_INITIAL_STATE,
            max_capacity: DEFAULT_MAX_CAPACITY,
            antibiotic_mic: 0.0,
            antibiotic_conc: 0.0,
        }
    }

    /// Check every field before any computation starts.
    pub fn validate(&self) -> Result<(), ModelError> {
        require_finite("growth rate", self.growth_rate)?;
        require_finite("initial state", self.initial_state)?;
        require_finite("max capacity", self.max_capacity)?;
        require_finite("antibiotic MIC", self.antibiotic_mic)?;
        require_finite("antibiotic concentration", self.antibiotic_conc)?;

        if self.max_capacity == 0.0 {
            return Err(ModelError::invalid("max capacity", "must be nonzero"));
        }
        if self.max_capacity < 0.0 {
            return Err(ModelError::invalid(
                "max capacity",
                format!("must be positive, got {}", self.max_capacity),
            ));
        }
        require_non_negative("initial state", self.initial_state)?;
        require_non_negative("antibiotic MIC", self.antibiotic_mic)?;
        require_non_negative("antibiotic concentration", self.antibiotic_conc)?;
        Ok(())
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ModelError::invalid(field, format!("must be a finite number, got {value}")))
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ModelError> {
    if value < 0.0 {
        Err(ModelError::invalid(field, format!("must be >= 0, got {value}")))
    } else {
        Ok(())
    }
}

/// A solved time series, ready for line plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub time_hours: Vec<f64>,
    pub density_od: Vec<f64>,
}

impl Trajectory {
    /// Paired `(t, B(t))` points.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.time_hours
            .iter()
            .zip(self.density_od.iter())
            .map(|(&t, &b)| (t, b))
            .collect()
    }

    pub fn final_density(&self) -> Option<f64> {
        self.density_od.last().copied()
    }

    pub fn peak_density(&self) -> Option<f64> {
        self.density_od
            .iter()
            .copied()
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
    }
}

/// Observed planktonic growth: paired sample times and densities.
///
/// The first density is the fixed amplitude of the exponential fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitDataset {
    times: Vec<f64>,
    densities: Vec<f64>,
}

impl FitDataset {
    /// Build a dataset, checking the pairing invariants.
    ///
    /// Short datasets are accepted here (they can still be plotted); the
    /// point-count requirement is enforced when fitting.
    pub fn new(times: Vec<f64>, densities: Vec<f64>) -> Result<Self, ModelError> {
        if times.len() != densities.len() {
            return Err(ModelError::invalid(
                "data",
                format!(
                    "{} time points but {} density values",
                    times.len(),
                    densities.len()
                ),
            ));
        }
        if let Some(t) = times.iter().find(|t| !t.is_finite()) {
            return Err(ModelError::invalid("time", format!("must be finite, got {t}")));
        }
        if let Some(y) = densities.iter().find(|y| !y.is_finite()) {
            return Err(ModelError::invalid("data", format!("must be finite, got {y}")));
        }
        if let Some(w) = times.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ModelError::invalid(
                "time",
                format!("must be strictly increasing ({} then {})", w[0], w[1]),
            ));
        }
        Ok(Self { times, densities })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn densities(&self) -> &[f64] {
        &self.densities
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Paired `(t, density)` points, unmodified, for scatter plots.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.times
            .iter()
            .zip(self.densities.iter())
            .map(|(&t, &y)| (t, y))
            .collect()
    }
}

/// Adaptive integrator settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    /// Relative error tolerance per step.
    pub rtol: f64,
    /// Absolute error tolerance per step.
    pub atol: f64,
    /// First trial step; estimated from the initial slope when `None`.
    pub initial_step: Option<f64>,
    /// Smallest step before the integrator gives up.
    pub min_step: f64,
    /// Upper bound on attempted steps over the whole horizon.
    pub max_steps: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-6,
            atol: 1e-9,
            initial_step: None,
            min_step: 1e-12,
            max_steps: 100_000,
        }
    }
}

impl SolverOptions {
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.rtol.is_finite() && self.rtol > 0.0) {
            return Err(ModelError::invalid("rtol", format!("must be > 0, got {}", self.rtol)));
        }
        if !(self.atol.is_finite() && self.atol > 0.0) {
            return Err(ModelError::invalid("atol", format!("must be > 0, got {}", self.atol)));
        }
        if let Some(h) = self.initial_step {
            if !(h.is_finite() && h > 0.0) {
                return Err(ModelError::invalid("initial step", format!("must be > 0, got {h}")));
            }
        }
        if !(self.min_step.is_finite() && self.min_step > 0.0) {
            return Err(ModelError::invalid("min step", format!("must be > 0, got {}", self.min_step)));
        }
        if self.max_steps == 0 {
            return Err(ModelError::invalid("max steps", "must be > 0"));
        }
        Ok(())
    }
}

/// Levenberg–Marquardt settings for the growth-rate fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    /// Starting value of `k_b`.
    pub initial_rate: f64,
    pub max_iterations: usize,
    /// Relative step size below which the fit is considered converged.
    pub xtol: f64,
    /// Gradient norm below which the fit is considered converged.
    pub gtol: f64,
    /// Starting Marquardt damping factor.
    pub initial_damping: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            initial_rate: 1.0,
            max_iterations: 200,
            xtol: 1e-10,
            gtol: 1e-12,
            initial_damping: 1e-3,
        }
    }
}

/// Result of an exponential growth fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthFit {
    /// Fitted `k_b` (1/hour).
    pub growth_rate: f64,
    /// Fixed amplitude `b_0` (the first observation).
    pub amplitude: f64,
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
    pub iterations: usize,
}

impl GrowthFit {
    /// Evaluate the fitted curve `b_0 e^(k_b t)`.
    pub fn predict(&self, t: f64) -> f64 {
        self.amplitude * (self.growth_rate * t).exp()
    }
}

/// A saved trajectory file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub params: GrowthParams,
    #[serde(flatten)]
    pub trajectory: Trajectory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        let params = GrowthParams {
            max_capacity: 0.0,
            ..GrowthParams::untreated(0.957)
        };
        match params.validate() {
            Err(ModelError::InvalidParameter { field, .. }) => assert_eq!(field, "max capacity"),
            other => panic!("expected invalid max capacity, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_inputs_are_rejected() {
        let params = GrowthParams {
            antibiotic_conc: f64::NAN,
            ..GrowthParams::untreated(0.957)
        };
        assert!(matches!(
            params.validate(),
            Err(ModelError::InvalidParameter { field: "antibiotic concentration", .. })
        ));
    }

    #[test]
    fn dataset_requires_matching_lengths() {
        let err = FitDataset::new(vec![0.0, 1.0, 2.0], vec![0.1, 0.2]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter { field: "data", .. }));
    }

    #[test]
    fn dataset_requires_increasing_times() {
        let err = FitDataset::new(vec![0.0, 2.0, 1.0], vec![0.1, 0.2, 0.3]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter { field: "time", .. }));
    }

    #[test]
    fn trajectory_peak_and_final() {
        let traj = Trajectory {
            time_hours: vec![0.0, 1.0, 2.0],
            density_od: vec![0.1, 0.5, 0.3],
        };
        assert_eq!(traj.peak_density(), Some(0.5));
        assert_eq!(traj.final_density(), Some(0.3));
        assert_eq!(traj.points()[1], (1.0, 0.5));
    }

    #[test]
    fn solver_min_step_must_be_positive() {
        assert!(SolverOptions::default().validate().is_ok());
        for min_step in [0.0, -1e-12, f64::NAN, f64::INFINITY] {
            let opts = SolverOptions {
                min_step,
                ..SolverOptions::default()
            };
            assert!(matches!(
                opts.validate(),
                Err(ModelError::InvalidParameter { field: "min step", .. })
            ));
        }
    }
}
