//! Input data for the front end: the species catalog, hand-entered
//! measurements, and synthetic growth series.

pub mod catalog;
pub mod synthetic;

pub use catalog::*;
pub use synthetic::*;
