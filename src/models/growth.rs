//! Logistic biofilm growth with antibiotic inhibition.
//!
//! Biofilm density `B(t)` (OD) follows
//!
//! ```text
//! dB/dt = k_b B (1 - B/B_max) - θ C B
//! θ     = k_b / MIC   (θ = 0 when MIC = 0)
//! ```
//!
//! The first term is logistic growth limited by nutrients and space; the second
//! is mass-action killing proportional to both biofilm and antibiotic
//! concentration `C`, normalised by the minimum inhibitory concentration.
//! (Verotta, Haagensen, Spormann & Yang, "Mathematical Modeling of Biofilm
//! Structures Using COMSTAT Data", Comput. Math. Methods Med. 2017.)
//!
//! The model is solved once, at construction, on the hourly grid `0..=24`.

use tracing::debug;

use crate::domain::{GrowthParams, SolverOptions, TIME_END, TIME_POINTS, TIME_START, Trajectory};
use crate::error::ModelError;
use crate::math::{integrate, linspace};

/// Antibiotic interaction constant `θ`.
///
/// `MIC = 0` means "no antibiotic effect" rather than an infinite one.
pub fn inhibition_coefficient(params: &GrowthParams) -> f64 {
    if params.antibiotic_mic == 0.0 {
        0.0
    } else {
        params.growth_rate / params.antibiotic_mic
    }
}

/// Right-hand side `dB/dt` at density `b`.
///
/// The model is autonomous; integrators may call this at any intermediate time.
pub fn logistic_growth(params: &GrowthParams, b: f64) -> f64 {
    let theta = inhibition_coefficient(params);
    params.growth_rate * b * (1.0 - b / params.max_capacity) - theta * params.antibiotic_conc * b
}

/// A solved biofilm growth curve.
#[derive(Debug, Clone)]
pub struct GrowthModel {
    params: GrowthParams,
    times: Vec<f64>,
    solution: Vec<f64>,
}

impl GrowthModel {
    /// Validate `params` and solve with default integrator settings.
    pub fn new(params: GrowthParams) -> Result<Self, ModelError> {
        Self::with_options(params, &SolverOptions::default())
    }

    /// Validate `params` and solve with explicit integrator settings.
    pub fn with_options(params: GrowthParams, options: &SolverOptions) -> Result<Self, ModelError> {
        params.validate()?;

        let times = linspace(TIME_START, TIME_END, TIME_POINTS)?;
        let rhs = |_t: f64, b: f64| logistic_growth(&params, b);
        let (solution, stats) = integrate(rhs, &times, params.initial_state, options)?;

        if let Some(v) = solution.iter().find(|v| !v.is_finite()) {
            return Err(ModelError::invalid(
                "solution",
                format!("non-finite density {v} for the given parameters"),
            ));
        }

        debug!(
            growth_rate = params.growth_rate,
            theta = inhibition_coefficient(&params),
            steps = stats.accepted,
            final_density = solution[solution.len() - 1],
            "biofilm model solved"
        );

        Ok(Self {
            params,
            times,
            solution,
        })
    }

    pub fn params(&self) -> &GrowthParams {
        &self.params
    }

    /// Evaluation times (hours).
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// `B(t)` at each evaluation time.
    pub fn solution(&self) -> &[f64] {
        &self.solution
    }

    /// Owned copy of the solved curve for plotting/export.
    pub fn trajectory(&self) -> Trajectory {
        Trajectory {
            time_hours: self.times.clone(),
            density_od: self.solution.clone(),
        }
    }
}
