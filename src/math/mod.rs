//! Numerical building blocks: grids, linear least squares, Levenberg–Marquardt
//! and the adaptive ODE integrator.

pub mod grid;
pub mod lm;
pub mod ode;
pub mod ols;

pub use grid::*;
pub use lm::*;
pub use ode::*;
pub use ols::*;
