//! Curve fitting.
//!
//! Responsibilities:
//!
//! - fit the planktonic growth rate `k_b` to observed densities (`exponential`)
//! - batch refits over the species catalog (`batch`)

pub mod batch;
pub mod exponential;

pub use batch::*;
pub use exponential::*;
