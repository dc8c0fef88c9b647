//! Adaptive Dormand–Prince 5(4) integrator for scalar initial value problems.
//!
//! We solve
//!
//! ```text
//! dy/dt = f(t, y),  y(t_0) = y_0
//! ```
//!
//! and report `y` at a caller-supplied, increasing list of output times.
//!
//! Implementation notes:
//! - Embedded 5th/4th order pair; the 5th order solution is propagated
//!   (local extrapolation) and the difference drives step-size control.
//! - Steps are clipped so the integrator lands exactly on each output time.
//!   The unclipped step proposal is carried over to the next interval so a
//!   dense output grid does not throttle the step size.
//! - The last stage equals the first stage of the next step (FSAL), so an
//!   accepted step costs six right-hand-side evaluations.

use tracing::debug;

use crate::domain::SolverOptions;
use crate::error::ModelError;

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th order weights (also the last stage row).
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Error weights: 5th order minus 4th order.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

/// Integration counters (for logging/diagnostics).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OdeStats {
    pub accepted: usize,
    pub rejected: usize,
    pub evaluations: usize,
}

/// Integrate `f` from `t_eval[0]` and return `y` at every entry of `t_eval`.
///
/// `t_eval` must be non-empty and strictly increasing; the first entry is the
/// initial time and the first output is exactly `y0`.
pub fn integrate<F>(
    f: F,
    t_eval: &[f64],
    y0: f64,
    opts: &SolverOptions,
) -> Result<(Vec<f64>, OdeStats), ModelError>
where
    F: Fn(f64, f64) -> f64,
{
    opts.validate()?;
    let Some(&t0) = t_eval.first() else {
        return Err(ModelError::invalid("time grid", "must contain at least one point"));
    };
    if t_eval.iter().any(|t| !t.is_finite()) || t_eval.windows(2).any(|w| w[1] <= w[0]) {
        return Err(ModelError::invalid("time grid", "must be finite and strictly increasing"));
    }
    if !y0.is_finite() {
        return Err(ModelError::invalid("initial state", format!("must be finite, got {y0}")));
    }

    let mut stats = OdeStats::default();
    let mut out = Vec::with_capacity(t_eval.len());
    out.push(y0);

    let mut t = t0;
    let mut y = y0;
    let mut k1 = f(t, y);
    stats.evaluations += 1;

    let span = t_eval[t_eval.len() - 1] - t0;
    let mut h = match opts.initial_step {
        Some(h) => h,
        None => initial_step(y0, k1, span, opts),
    };

    for &target in &t_eval[1..] {
        while t < target {
            if stats.accepted + stats.rejected >= opts.max_steps {
                return Err(ModelError::ConvergenceFailure(format!(
                    "integrator exceeded {} steps before t={target}",
                    opts.max_steps
                )));
            }

            let remaining = target - t;
            let clipped = h >= remaining;
            let step = if clipped { remaining } else { h };

            let k2 = f(t + C2 * step, y + step * A21 * k1);
            let k3 = f(t + C3 * step, y + step * (A31 * k1 + A32 * k2));
            let k4 = f(t + C4 * step, y + step * (A41 * k1 + A42 * k2 + A43 * k3));
            let k5 = f(
                t + C5 * step,
                y + step * (A51 * k1 + A52 * k2 + A53 * k3 + A54 * k4),
            );
            let k6 = f(
                t + step,
                y + step * (A61 * k1 + A62 * k2 + A63 * k3 + A64 * k4 + A65 * k5),
            );
            let y_new = y + step * (B1 * k1 + B3 * k3 + B4 * k4 + B5 * k5 + B6 * k6);
            let k7 = f(t + step, y_new);
            stats.evaluations += 6;

            let err_abs = step * (E1 * k1 + E3 * k3 + E4 * k4 + E5 * k5 + E6 * k6 + E7 * k7);
            let scale = opts.atol + opts.rtol * y.abs().max(y_new.abs());
            let err = (err_abs / scale).abs();

            if !(y_new.is_finite() && err.is_finite()) {
                return Err(ModelError::invalid(
                    "solution",
                    format!("integration produced a non-finite value near t={t}"),
                ));
            }

            let factor = if err == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
            };

            if err <= 1.0 {
                stats.accepted += 1;
                t = if clipped { target } else { t + step };
                y = y_new;
                k1 = k7;
                // A clipped step says nothing about how large the next one may be.
                if !clipped {
                    h = step * factor;
                } else {
                    h = h.max(step * factor);
                }
            } else {
                stats.rejected += 1;
                h = step * factor.min(1.0);
                if h < opts.min_step {
                    return Err(ModelError::ConvergenceFailure(format!(
                        "integrator step size underflow at t={t} (h={h:e})"
                    )));
                }
            }
        }
        out.push(y);
    }

    debug!(
        accepted = stats.accepted,
        rejected = stats.rejected,
        evaluations = stats.evaluations,
        "ode integration finished"
    );
    Ok((out, stats))
}

/// Starting step from the initial slope.
///
/// Picks `h` so that the first-order change `h * |f(t0, y0)|` is a small
/// fraction of the tolerance-scaled state, capped by the horizon.
fn initial_step(y0: f64, f0: f64, span: f64, opts: &SolverOptions) -> f64 {
    let scale = opts.atol + opts.rtol * y0.abs();
    let d0 = y0.abs() / scale;
    let d1 = f0.abs() / scale;
    let h = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    };
    h.min(span.abs()).max(opts.min_step)
}
