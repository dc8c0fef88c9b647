//! Levenberg–Marquardt for small nonlinear least-squares problems.
//!
//! Minimises `½‖r(p)‖²` where the caller supplies residuals `r(p)` (model minus
//! observation) and the Jacobian `J = ∂r/∂p`.
//!
//! Each iteration solves the damped system
//!
//! ```text
//! [ J        ]       [ -r ]
//! [ √λ · D   ] δ  ≈  [  0 ]
//! ```
//!
//! with `D = diag(‖J_j‖)` (Marquardt scaling) using the SVD least-squares
//! solver. Accepted steps shrink `λ` by 10, rejected steps grow it by 10.
//! The run converges when the undamped Gauss–Newton step at the current
//! point is negligible (in size or in predicted SSE reduction). There is no
//! restart logic: one run from the given start either converges or fails.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::ModelError;
use crate::math::solve_least_squares;

const DAMPING_UP: f64 = 10.0;
const DAMPING_DOWN: f64 = 10.0;
const MAX_DAMPING: f64 = 1e16;
/// Relative SSE reduction below which a further step is lost in rounding.
const SSE_FLOOR: f64 = 1e-14;

/// Stopping rules.
#[derive(Debug, Clone, Copy)]
pub struct LmSettings {
    pub max_iterations: usize,
    pub xtol: f64,
    pub gtol: f64,
    pub initial_damping: f64,
}

/// Converged solution.
#[derive(Debug, Clone)]
pub struct LmSolution {
    pub params: DVector<f64>,
    /// `Σ r_i²` at `params`.
    pub sse: f64,
    pub iterations: usize,
}

/// Run Levenberg–Marquardt from `start`.
///
/// `residuals(p)` must return a vector of fixed length; `jacobian(p)` a matrix
/// of shape `(residuals, params)`.
pub fn levenberg_marquardt<R, J>(
    residuals: R,
    jacobian: J,
    start: DVector<f64>,
    settings: &LmSettings,
) -> Result<LmSolution, ModelError>
where
    R: Fn(&DVector<f64>) -> DVector<f64>,
    J: Fn(&DVector<f64>) -> DMatrix<f64>,
{
    let n_params = start.len();
    let mut p = start;
    let mut r = residuals(&p);
    let mut sse = r.norm_squared();
    if !sse.is_finite() {
        return Err(ModelError::ConvergenceFailure(
            "residuals are not finite at the initial guess".to_string(),
        ));
    }

    let mut lambda = settings.initial_damping;

    for iter in 1..=settings.max_iterations {
        if sse == 0.0 {
            return Ok(LmSolution { params: p, sse, iterations: iter - 1 });
        }

        let jac = jacobian(&p);
        let gradient = jac.transpose() * &r;
        if gradient.amax() <= settings.gtol {
            debug!(iter, sse, "levenberg-marquardt: gradient below tolerance");
            return Ok(LmSolution { params: p, sse, iterations: iter - 1 });
        }

        // Convergence is judged on the undamped Gauss-Newton step, never on a
        // step that damping has shrunk.
        let Some(gauss_newton) = solve_least_squares(&jac, &(-&r)) else {
            return Err(ModelError::ConvergenceFailure("jacobian is singular".to_string()));
        };
        let predicted = (&jac * &gauss_newton).norm_squared();
        if gauss_newton.norm() <= settings.xtol * (p.norm() + settings.xtol) || predicted <= SSE_FLOOR * sse {
            debug!(iter, sse, "levenberg-marquardt: gauss-newton step negligible");
            return Ok(LmSolution { params: p, sse, iterations: iter - 1 });
        }

        let scale: Vec<f64> = (0..n_params)
            .map(|j| jac.column(j).norm().max(f64::MIN_POSITIVE.sqrt()))
            .collect();

        // Inner loop: raise damping until a step lowers the cost.
        loop {
            let n_rows = jac.nrows();
            let mut a = DMatrix::<f64>::zeros(n_rows + n_params, n_params);
            a.view_mut((0, 0), (n_rows, n_params)).copy_from(&jac);
            let mut b = DVector::<f64>::zeros(n_rows + n_params);
            b.rows_mut(0, n_rows).copy_from(&(-&r));
            let root = lambda.sqrt();
            for j in 0..n_params {
                a[(n_rows + j, j)] = root * scale[j];
            }

            let Some(delta) = solve_least_squares(&a, &b) else {
                return Err(ModelError::ConvergenceFailure(
                    "damped normal equations are singular".to_string(),
                ));
            };

            let candidate = &p + &delta;
            let r_new = residuals(&candidate);
            let sse_new = r_new.norm_squared();

            if sse_new.is_finite() && sse_new < sse {
                debug!(iter, lambda, sse = sse_new, "levenberg-marquardt: step accepted");
                p = candidate;
                r = r_new;
                sse = sse_new;
                lambda = (lambda / DAMPING_DOWN).max(f64::EPSILON);
                break;
            }

            lambda *= DAMPING_UP;
            if lambda > MAX_DAMPING {
                return Err(ModelError::ConvergenceFailure(format!(
                    "damping exceeded {MAX_DAMPING:e} after {iter} iterations without reducing the residual"
                )));
            }
        }
    }

    Err(ModelError::ConvergenceFailure(format!(
        "no convergence within {} iterations",
        settings.max_iterations
    )))
}
