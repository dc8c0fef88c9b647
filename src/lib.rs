//! `biofilm-growth` library crate.
//!
//! The binary (`biofilm`) is a thin wrapper around this library so that:
//!
//! - the model and the fitter are testable without spawning processes
//! - front ends only handle parsing and printing

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
