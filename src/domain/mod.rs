//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - model inputs (`GrowthParams`) and the fixed evaluation grid
//! - observed datasets (`FitDataset`)
//! - solver/fitter configuration (`SolverOptions`, `FitOptions`)
//! - outputs (`Trajectory`, `GrowthFit`, `TrajectoryFile`)

pub mod types;

pub use types::*;
