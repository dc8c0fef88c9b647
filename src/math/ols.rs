//! Linear least squares via SVD.
//!
//! Every Levenberg–Marquardt iteration solves a small linear problem
//!
//! ```text
//! minimize ‖A δ - b‖²
//! ```
//!
//! where `A` stacks the Jacobian on top of the damping rows. `A` is tall
//! (observations + parameters rows, parameters columns), so we use SVD rather
//! than a square solver. (Nalgebra's `QR::solve` is intended for square
//! systems and will panic for non-square matrices.)

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Singular values below `tol` times the largest one are treated as zero, so
/// the cutoff follows the scale of `x`. Returns `None` if `x` is zero or the
/// system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);
    let largest = svd.singular_values.max();
    if !(largest.is_finite() && largest > 0.0) {
        return None;
    }

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol * largest) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
