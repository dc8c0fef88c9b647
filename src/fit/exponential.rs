//! Exponential growth-rate fit for planktonic bacteria.
//!
//! Given observations `(t_i, y_i)` we fit
//!
//! ```text
//! b(t) = b_0 e^(k_b t)
//! ```
//!
//! where `b_0 = y_0` is fixed to the first observation and `k_b` is the only
//! free parameter, by minimising `Σ (b_0 e^(k_b t_i) - y_i)²` with
//! Levenberg–Marquardt from a fixed starting rate.
//!
//! Anchoring `b_0` keeps the problem one-dimensional; it also means a noisy
//! first observation biases the fitted rate.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use crate::domain::{FitDataset, FitOptions, GrowthFit, MIN_FIT_POINTS};
use crate::error::ModelError;
use crate::math::{LmSettings, levenberg_marquardt};

/// Evaluate `b_0 e^(k_b t)`.
pub fn exponential_growth(amplitude: f64, rate: f64, t: f64) -> f64 {
    amplitude * (rate * t).exp()
}

/// Fits `k_b` to one dataset.
#[derive(Debug, Clone)]
pub struct ExponentialFitter {
    dataset: FitDataset,
    options: FitOptions,
}

impl ExponentialFitter {
    /// Pair up `times` and `densities`.
    pub fn new(times: Vec<f64>, densities: Vec<f64>) -> Result<Self, ModelError> {
        Ok(Self::from_dataset(FitDataset::new(times, densities)?))
    }

    pub fn from_dataset(dataset: FitDataset) -> Self {
        Self {
            dataset,
            options: FitOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FitOptions) -> Self {
        self.options = options;
        self
    }

    /// The raw observations, unmodified.
    pub fn dataset(&self) -> &FitDataset {
        &self.dataset
    }

    /// Fitted growth rate `k_b`.
    pub fn fit(&self) -> Result<f64, ModelError> {
        self.fit_report().map(|fit| fit.growth_rate)
    }

    /// Fitted growth rate plus fit diagnostics.
    pub fn fit_report(&self) -> Result<GrowthFit, ModelError> {
        let n = self.dataset.len();
        if n < MIN_FIT_POINTS {
            return Err(ModelError::InsufficientData {
                found: n,
                required: MIN_FIT_POINTS,
            });
        }
        validate_options(&self.options)?;

        let times = self.dataset.times();
        let densities = self.dataset.densities();
        let amplitude = densities[0];
        if amplitude == 0.0 {
            // b(t) ≡ 0 for every k_b: the rate is unidentifiable.
            return Err(ModelError::invalid(
                "data",
                "first density must be nonzero (it fixes the curve amplitude)",
            ));
        }

        let residuals = |p: &DVector<f64>| {
            DVector::from_iterator(
                n,
                times
                    .iter()
                    .zip(densities)
                    .map(|(&t, &y)| exponential_growth(amplitude, p[0], t) - y),
            )
        };
        let jacobian = |p: &DVector<f64>| {
            DMatrix::from_fn(n, 1, |i, _| times[i] * exponential_growth(amplitude, p[0], times[i]))
        };

        let settings = LmSettings {
            max_iterations: self.options.max_iterations,
            xtol: self.options.xtol,
            gtol: self.options.gtol,
            initial_damping: self.options.initial_damping,
        };
        let start = DVector::from_element(1, self.options.initial_rate);

        let solution = levenberg_marquardt(residuals, jacobian, start, &settings).inspect_err(|e| {
            warn!(n, error = %e, "exponential fit failed");
        })?;

        let growth_rate = solution.params[0];
        if !(growth_rate.is_finite() && solution.sse.is_finite()) {
            return Err(ModelError::ConvergenceFailure(format!(
                "fit ended at a non-finite rate ({growth_rate})"
            )));
        }

        debug!(
            n,
            growth_rate,
            sse = solution.sse,
            iterations = solution.iterations,
            "exponential fit converged"
        );

        Ok(GrowthFit {
            growth_rate,
            amplitude,
            sse: solution.sse,
            rmse: (solution.sse / n as f64).sqrt(),
            n,
            iterations: solution.iterations,
        })
    }
}

fn validate_options(options: &FitOptions) -> Result<(), ModelError> {
    if !options.initial_rate.is_finite() {
        return Err(ModelError::invalid(
            "initial rate",
            format!("must be finite, got {}", options.initial_rate),
        ));
    }
    if options.max_iterations == 0 {
        return Err(ModelError::invalid("max iterations", "must be > 0"));
    }
    if !(options.initial_damping.is_finite() && options.initial_damping > 0.0) {
        return Err(ModelError::invalid(
            "initial damping",
            format!("must be > 0, got {}", options.initial_damping),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic(amplitude: f64, rate: f64, hours: usize) -> (Vec<f64>, Vec<f64>) {
        let times: Vec<f64> = (0..hours).map(|h| h as f64).collect();
        let densities = times.iter().map(|&t| exponential_growth(amplitude, rate, t)).collect();
        (times, densities)
    }

    #[test]
    fn recovers_rate_from_exact_data() {
        let (times, densities) = synthetic(0.5, 1.2, 8);
        let fitter = ExponentialFitter::new(times, densities).unwrap();

        let rate = fitter.fit().unwrap();
        assert!((rate - 1.2).abs() < 1e-3, "fitted {rate}");
    }

    #[test]
    fn recovers_decay_rate() {
        let (times, densities) = synthetic(3.0, -0.4, 10);
        let rate = ExponentialFitter::new(times, densities).unwrap().fit().unwrap();
        assert!((rate + 0.4).abs() < 1e-6, "fitted {rate}");
    }

    #[test]
    fn single_point_is_insufficient() {
        let fitter = ExponentialFitter::new(vec![0.0], vec![0.002]).unwrap();
        assert_eq!(
            fitter.fit(),
            Err(ModelError::InsufficientData { found: 1, required: 2 })
        );
    }

    #[test]
    fn empty_dataset_is_insufficient() {
        let fitter = ExponentialFitter::new(Vec::new(), Vec::new()).unwrap();
        assert!(matches!(fitter.fit(), Err(ModelError::InsufficientData { found: 0, .. })));
    }

    #[test]
    fn zero_amplitude_is_invalid() {
        let fitter = ExponentialFitter::new(vec![0.0, 1.0, 2.0], vec![0.0, 0.1, 0.2]).unwrap();
        assert!(matches!(fitter.fit(), Err(ModelError::InvalidParameter { field: "data", .. })));
    }

    #[test]
    fn amplitude_is_pinned_to_first_observation() {
        let times = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let densities = vec![0.002, 0.019, 0.024, 0.068, 0.085, 0.355, 0.979, 1.496];
        let fit = ExponentialFitter::new(times.clone(), densities.clone())
            .unwrap()
            .fit_report()
            .unwrap();

        assert_eq!(fit.amplitude, 0.002);
        assert_eq!(fit.n, 8);
        // Late points dominate the squared error; the curve is steep.
        assert!(fit.growth_rate > 0.8 && fit.growth_rate < 1.1, "fitted {}", fit.growth_rate);
        assert!(fit.rmse.is_finite());
    }

    #[test]
    fn fitted_rate_is_a_local_minimum() {
        let times = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let densities = vec![0.002, 0.007, 0.015, 0.025, 0.056, 0.09, 0.14, 0.345];
        let fit = ExponentialFitter::new(times.clone(), densities.clone())
            .unwrap()
            .fit_report()
            .unwrap();

        let sse_at = |k: f64| -> f64 {
            times
                .iter()
                .zip(&densities)
                .map(|(&t, &y)| (exponential_growth(fit.amplitude, k, t) - y).powi(2))
                .sum()
        };
        assert!((sse_at(fit.growth_rate) - fit.sse).abs() < 1e-12);
        assert!(sse_at(fit.growth_rate + 1e-3) >= fit.sse);
        assert!(sse_at(fit.growth_rate - 1e-3) >= fit.sse);
    }

    #[test]
    fn raw_data_is_kept_for_plotting() {
        let fitter = ExponentialFitter::new(vec![0.0, 1.0], vec![0.1, 0.3]).unwrap();
        let _ = fitter.fit().unwrap();
        assert_eq!(fitter.dataset().points(), vec![(0.0, 0.1), (1.0, 0.3)]);
    }

    #[test]
    fn zero_iteration_budget_is_rejected() {
        let (times, densities) = synthetic(0.5, 1.2, 8);
        let fitter = ExponentialFitter::new(times, densities).unwrap().with_options(FitOptions {
            max_iterations: 0,
            ..FitOptions::default()
        });
        assert!(matches!(fitter.fit(), Err(ModelError::InvalidParameter { .. })));
    }

    #[test]
    fn tiny_iteration_budget_reports_convergence_failure() {
        let (times, densities) = synthetic(0.5, 1.2, 8);
        let fitter = ExponentialFitter::new(times, densities).unwrap().with_options(FitOptions {
            max_iterations: 1,
            ..FitOptions::default()
        });
        assert!(matches!(fitter.fit(), Err(ModelError::ConvergenceFailure(_))));
    }

    #[test]
    fn steep_growth_over_a_day_reaches_the_true_rate() {
        // From the default start the first steps overshoot enormously; the fit
        // must keep going until the rate is right rather than stop early.
        let (times, densities) = synthetic(0.002, 2.0, 25);
        let fit = ExponentialFitter::new(times, densities).unwrap().fit_report().unwrap();
        assert!((fit.growth_rate - 2.0).abs() < 1e-6, "fitted {}", fit.growth_rate);
    }
}
