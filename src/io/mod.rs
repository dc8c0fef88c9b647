//! Input/output helpers.
//!
//! - trajectory CSV export (`export`)
//! - trajectory JSON read/write (`trajectory`)

pub mod export;
pub mod trajectory;

pub use export::*;
pub use trajectory::*;
